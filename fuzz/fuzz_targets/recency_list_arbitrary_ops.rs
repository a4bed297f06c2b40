#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use slotlru::ds::{NodeId, RecencyList};

// Fuzz add/touch/clear sequences on RecencyList against a deque of
// (id, value) pairs ordered MRU first.
fuzz_target!(|data: &[u8]| {
    let mut list: RecencyList<u8, 8> = RecencyList::new();
    let mut model: VecDeque<(NodeId, u8)> = VecDeque::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 5;
        let arg = pair[1];

        match op {
            0 | 1 => {
                // add
                let mut evicted = None;
                let id = list.add(arg, |old| evicted = Some(*old));
                if model.len() == 8 {
                    let (old_id, old_value) = model.pop_back().unwrap();
                    assert_eq!(evicted, Some(old_value));
                    assert_eq!(id, old_id);
                } else {
                    assert_eq!(evicted, None);
                }
                model.push_front((id, arg));
            },
            2 | 3 => {
                // touch
                if !model.is_empty() {
                    let pos = usize::from(arg) % model.len();
                    let entry = model.remove(pos).unwrap();
                    list.touch(entry.0);
                    model.push_front(entry);
                }
            },
            _ => {
                // clear
                list.clear();
                model.clear();
            },
        }

        assert_eq!(list.len(), model.len());
        assert!(list.check_invariants().is_ok());
        assert_eq!(list.front(), model.front().map(|(_, v)| v));
        assert_eq!(list.back(), model.back().map(|(_, v)| v));
    }

    assert!(list.iter().copied().eq(model.iter().map(|(_, v)| *v)));
});
