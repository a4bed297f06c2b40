#![no_main]

use libfuzzer_sys::fuzz_target;
use slotlru::policy::BoundedCache;

// Fuzz find/set/peek/clear sequences on BoundedCache, checking capacity, the
// set return contract and index/list consistency after every step.
fuzz_target!(|data: &[u8]| {
    let mut cache: BoundedCache<u8, u8, 8> = BoundedCache::new();

    for chunk in data.chunks_exact(3) {
        let op = chunk[0] % 8;
        let key = chunk[1] % 32;
        let value = chunk[2] % 4;

        match op {
            0..=3 => {
                // set
                let previous = cache.peek(&key).copied();
                let unchanged = cache.set(key, value);
                assert_eq!(unchanged, previous == Some(value));
                assert_eq!(cache.peek_mru(), Some((&key, &value)));
            },
            4 | 5 => {
                // find
                let peeked = cache.peek(&key).copied();
                assert_eq!(cache.find(&key).copied(), peeked);
                if peeked.is_some() {
                    assert_eq!(cache.peek_mru().map(|(k, _)| *k), Some(key));
                }
            },
            6 => {
                // contains
                assert_eq!(cache.contains(&key), cache.peek(&key).is_some());
            },
            _ => {
                // clear
                if key == 0 {
                    cache.clear();
                    assert!(cache.is_empty());
                }
            },
        }

        assert!(cache.len() <= 8);
        assert_eq!(cache.iter().count(), cache.len());
        assert!(cache.check_invariants().is_ok());
    }
});
