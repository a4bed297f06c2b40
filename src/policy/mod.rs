pub mod bounded;

pub use bounded::BoundedCache;
