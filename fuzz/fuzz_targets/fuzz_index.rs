#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use gramdex::{MatchMode, NGramIndex};

#[derive(Arbitrary, Debug)]
enum Op<'a> {
    Add(&'a str),
    Remove(&'a str),
    Contains(&'a str),
    Search(&'a str, u8),
    Clear,
    Trim,
}

fuzz_target!(|ops: Vec<Op<'_>>| {
    // Drive an index through arbitrary operation sequences
    // Nothing here may panic, and contains/len must stay consistent
    let mut index = NGramIndex::default();
    let mut expected_len = 0usize;

    for op in ops.iter().take(256) {
        match *op {
            Op::Add(value) => {
                if let Ok(added) = index.add(value) {
                    if added {
                        expected_len += 1;
                    }
                    assert!(index.contains(value));
                }
            }
            Op::Remove(value) => {
                if let Ok(removed) = index.remove(value) {
                    if removed {
                        expected_len -= 1;
                    }
                    assert!(!index.contains(value));
                }
            }
            Op::Contains(value) => {
                let _ = index.contains(value);
            }
            Op::Search(pattern, mode) => {
                let mode = match mode % 4 {
                    0 => MatchMode::Exact,
                    1 => MatchMode::Contains,
                    2 => MatchMode::StartsWith,
                    _ => MatchMode::EndsWith,
                };
                if let Ok(search) = index.search(pattern, mode) {
                    for found in search.take(64) {
                        assert!(index.contains(found));
                    }
                }
            }
            Op::Clear => {
                index.clear();
                expected_len = 0;
            }
            Op::Trim => index.trim_excess(),
        }
        assert_eq!(index.len(), expected_len);
    }

    let stats = index.stats();
    assert_eq!(stats.items, stats.indexed_items + stats.unindexed_items);
});
