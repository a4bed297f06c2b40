#![no_main]

use std::collections::HashMap;

use libfuzzer_sys::fuzz_target;
use slotlru::ds::SlotTable;

// Fuzz arbitrary operation sequences on a capacity-16 SlotTable against an
// unbounded HashMap restricted to the same operations.
fuzz_target!(|data: &[u8]| {
    let mut table: SlotTable<u8, u8, 16> = SlotTable::new();
    let mut reference: HashMap<u8, u8> = HashMap::new();

    for chunk in data.chunks_exact(3) {
        let op = chunk[0] % 4;
        let key = chunk[1] % 64;
        let value = chunk[2];

        match op {
            0 => {
                // try_emplace
                let (_, inserted) = table.try_emplace(key, value);
                if inserted {
                    assert!(reference.insert(key, value).is_none());
                } else {
                    assert!(reference.contains_key(&key) || reference.len() == 16);
                }
            },
            1 => {
                // insert_or_assign
                let (handle, inserted) = table.insert_or_assign(key, value);
                if inserted || reference.contains_key(&key) {
                    reference.insert(key, value);
                    assert_eq!(table.entry_at(handle), Some((&key, &value)));
                } else {
                    assert_eq!(handle, table.end());
                }
            },
            2 => {
                // erase
                if let Some(handle) = table.find(&key) {
                    table.erase(handle);
                }
                reference.remove(&key);
                assert!(!table.contains_key(&key));
            },
            _ => {
                // find
                assert_eq!(table.get(&key), reference.get(&key));
            },
        }

        assert_eq!(table.len(), reference.len());
        assert!(table.check_invariants().is_ok());
    }

    assert_eq!(table.iter().count(), reference.len());
    for (key, value) in &table {
        assert_eq!(reference.get(key), Some(value));
    }
});
