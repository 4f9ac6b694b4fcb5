//! Override and coalescence semantics, exercised end-to-end.
//!
//! Each scenario runs against a v4 tree and against a v6 tree fed the same
//! v4 test data (which lands shifted under ::/96 through the auto-mapping).

use warren_core::IpVersion;
use warren_tree::{Tree, TreeConfig};

fn tree(ip_version: IpVersion) -> Tree<String> {
    Tree::new(TreeConfig {
        ip_version,
        ..TreeConfig::default()
    })
    .unwrap()
}

fn octets(addr: u32) -> String {
    let b = addr.to_be_bytes();
    format!("{}.{}.{}.{}", b[0], b[1], b[2], b[3])
}

/// Split an inclusive v4 address range into covering CIDR blocks.
fn range_to_cidrs(start: u32, end: u32) -> Vec<(String, u8)> {
    let mut blocks = Vec::new();
    let mut cursor = start as u64;
    let end = end as u64;
    while cursor <= end {
        let alignment = if cursor == 0 {
            32
        } else {
            cursor.trailing_zeros().min(32)
        };
        let mut size = 1u64 << alignment;
        while cursor + size - 1 > end {
            size >>= 1;
        }
        let mask = 32 - size.trailing_zeros() as u8;
        blocks.push((octets(cursor as u32), mask));
        cursor += size;
    }
    blocks
}

fn insert_range(tree: &mut Tree<String>, start: u32, end: u32, key: &[u8], value: &str) {
    for (text, mask) in range_to_cidrs(start, end) {
        tree.insert_network(&text, mask, key, value.to_string()).unwrap();
    }
}

fn lookup(tree: &Tree<String>, addr: u32) -> Option<String> {
    tree.lookup(&octets(addr)).unwrap().cloned()
}

const BASE: u32 = 0x0101_0100; // 1.1.1.0

#[test]
fn range_splitting_is_exact() {
    // 1.1.1.1 .. 1.1.1.32 covers /32 + /31 + /30 + /29 + /28 + /32.
    let blocks = range_to_cidrs(BASE + 1, BASE + 32);
    assert_eq!(
        blocks,
        vec![
            ("1.1.1.1".to_string(), 32),
            ("1.1.1.2".to_string(), 31),
            ("1.1.1.4".to_string(), 30),
            ("1.1.1.8".to_string(), 29),
            ("1.1.1.16".to_string(), 28),
            ("1.1.1.32".to_string(), 32),
        ]
    );
}

#[test]
fn override_wider_first() {
    for version in [IpVersion::V4, IpVersion::V6] {
        let mut tree = tree(version);
        tree.insert_network("1.1.1.0", 28, b"a", "A".into()).unwrap();
        insert_range(&mut tree, BASE + 1, BASE + 32, b"b", "B");

        assert_eq!(lookup(&tree, BASE), Some("A".into()));
        for offset in 1..=32 {
            assert_eq!(lookup(&tree, BASE + offset), Some("B".into()), "offset {offset}");
        }
        assert_eq!(lookup(&tree, BASE + 33), None);
        assert_eq!(lookup(&tree, BASE + 64), None);
    }
}

#[test]
fn override_narrower_first() {
    for version in [IpVersion::V4, IpVersion::V6] {
        let mut tree = tree(version);
        insert_range(&mut tree, BASE + 1, BASE + 32, b"a", "A");
        tree.insert_network("1.1.1.0", 28, b"b", "B".into()).unwrap();

        for offset in 0..=15 {
            assert_eq!(lookup(&tree, BASE + offset), Some("B".into()), "offset {offset}");
        }
        for offset in 16..=32 {
            assert_eq!(lookup(&tree, BASE + offset), Some("A".into()), "offset {offset}");
        }
        assert_eq!(lookup(&tree, BASE + 33), None);
    }
}

#[test]
fn override_contained_range() {
    for version in [IpVersion::V4, IpVersion::V6] {
        let mut tree = tree(version);
        tree.insert_network("1.1.1.0", 28, b"a", "A".into()).unwrap();
        insert_range(&mut tree, BASE + 1, BASE + 14, b"b", "B");

        assert_eq!(lookup(&tree, BASE), Some("A".into()));
        for offset in 1..=14 {
            assert_eq!(lookup(&tree, BASE + offset), Some("B".into()), "offset {offset}");
        }
        assert_eq!(lookup(&tree, BASE + 15), Some("A".into()));
        assert_eq!(lookup(&tree, BASE + 16), None);
    }
}

#[test]
fn equal_subnets_coalesce_to_root_child() {
    // Splitting 0.0.0.0/1 into equal same-valued subnets collapses back to
    // a single half-space record: the root plus one surviving child.
    for split_mask in [2u8, 3, 4, 9] {
        let mut t = tree(IpVersion::V4);
        let step = 1u64 << (32 - split_mask);
        let mut base = 0u64;
        while base < 1 << 31 {
            t.insert_network(&octets(base as u32), split_mask, b"d", "D".into())
                .unwrap();
            base += step;
        }
        t.finalize();
        assert_eq!(t.node_count(), 2, "split at /{split_mask}");

        for addr in [0u32, 1, 0x0101_0101, 0x3FFF_FFFF, 0x7FFF_FFFF] {
            assert_eq!(lookup(&t, addr), Some("D".into()), "addr {}", octets(addr));
        }
        assert_eq!(lookup(&t, 0x8000_0000), None);
        assert_eq!(lookup(&t, 0xFFFF_FFFF), None);
    }
}

#[test]
fn single_host_zero() {
    for version in [IpVersion::V4, IpVersion::V6] {
        let mut tree = tree(version);
        tree.insert_network("0.0.0.0", 32, b"h", "H".into()).unwrap();

        assert_eq!(lookup(&tree, 0), Some("H".into()));
        assert_eq!(lookup(&tree, 1), None);
        assert_eq!(lookup(&tree, 0x8000_0000), None);
        assert_eq!(lookup(&tree, 0xFFFF_FFFF), None);
    }
}

#[test]
fn containment_respecting_permutations_agree() {
    // "wide before narrow" is the only ordering constraint; incomparable
    // networks may be permuted freely without changing the final map.
    let orders: [&[(&str, u8, &str)]; 3] = [
        &[
            ("10.0.0.0", 8, "A"),
            ("10.1.0.0", 16, "B"),
            ("10.2.0.0", 16, "C"),
            ("10.1.1.0", 24, "D"),
        ],
        &[
            ("10.0.0.0", 8, "A"),
            ("10.2.0.0", 16, "C"),
            ("10.1.0.0", 16, "B"),
            ("10.1.1.0", 24, "D"),
        ],
        &[
            ("10.0.0.0", 8, "A"),
            ("10.2.0.0", 16, "C"),
            ("10.1.1.0", 24, "D"),
            ("10.1.0.0", 16, "B"),
        ],
    ];

    // 10.1.1.0/24 ⊂ 10.1.0.0/16, so the last permutation is NOT
    // containment-respecting for ("10.1.1.0", "10.1.0.0") and must differ;
    // the first two must agree exactly.
    let probe = |t: &Tree<String>| -> Vec<Option<String>> {
        ["10.0.0.1", "10.1.0.1", "10.1.1.1", "10.2.3.4", "10.9.9.9", "11.0.0.1"]
            .iter()
            .map(|a| t.lookup(a).unwrap().cloned())
            .collect()
    };

    let mut results = Vec::new();
    for order in orders {
        let mut t = tree(IpVersion::V4);
        for &(text, mask, value) in order {
            t.insert_network(text, mask, value.as_bytes(), value.into()).unwrap();
        }
        results.push(probe(&t));
    }

    assert_eq!(results[0], results[1]);
    // The violating order overwrote the /24 with the /16.
    assert_eq!(results[2][2], Some("B".into()));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    struct Entry {
        base: u32,
        mask: u8,
    }

    fn arb_entry() -> impl Strategy<Value = Entry> {
        // Confined to 10.0.0.0/16 so trees stay small but overlaps are common.
        (0u32..=0xFFFF, 18u8..=32).prop_map(|(low, mask)| {
            let addr = 0x0A00_0000 | low;
            let base = addr & (u32::MAX << (32 - mask));
            Entry { base, mask }
        })
    }

    proptest! {
        // Lookup returns the value of the last inserted network containing
        // the address.
        #[test]
        fn lookup_matches_last_containing_insert(
            entries in prop::collection::vec(arb_entry(), 1..24),
            probes in prop::collection::vec(0u32..=0xFFFF, 16),
        ) {
            let mut t = tree(IpVersion::V4);
            for (i, e) in entries.iter().enumerate() {
                let key = format!("k{i}");
                t.insert_network(&octets(e.base), e.mask, key.as_bytes(), format!("v{i}"))
                    .unwrap();
            }

            let reference = |addr: u32| -> Option<String> {
                entries
                    .iter()
                    .enumerate()
                    .rev()
                    .find(|(_, e)| {
                        let width = 32 - e.mask as u32;
                        (addr >> width) == (e.base >> width)
                    })
                    .map(|(i, _)| format!("v{i}"))
            };

            for &low in &probes {
                let addr = 0x0A00_0000 | low;
                prop_assert_eq!(lookup(&t, addr), reference(addr), "addr {}", octets(addr));
            }
            // Probe the exact bases and their neighbours too.
            for e in &entries {
                for addr in [e.base, e.base.saturating_add(1)] {
                    prop_assert_eq!(lookup(&t, addr), reference(addr), "addr {}", octets(addr));
                }
            }
        }

        // Finalization counts reachable nodes and numbering is a bijection
        // onto 0..node_count.
        #[test]
        fn finalize_counts_match_traversal(
            entries in prop::collection::vec(arb_entry(), 1..24),
        ) {
            let mut t = tree(IpVersion::V4);
            for (i, e) in entries.iter().enumerate() {
                let key = format!("k{i}");
                t.insert_network(&octets(e.base), e.mask, key.as_bytes(), format!("v{i}"))
                    .unwrap();
            }
            t.finalize();

            let count = t.node_count();
            let mut seen_numbers = std::collections::HashSet::new();
            let mut records = 0u32;

            struct Collect<'a> {
                numbers: &'a mut std::collections::HashSet<u32>,
                records: &'a mut u32,
            }
            impl warren_core::Visitor<String> for Collect<'_> {
                fn on_node_record(
                    &mut self,
                    node_number: u32,
                    _dir: warren_core::Direction,
                    _node_net: &warren_core::Network,
                    _record_net: &warren_core::Network,
                    _target: u32,
                ) {
                    self.numbers.insert(node_number);
                    *self.records += 1;
                }
                fn on_empty_record(
                    &mut self,
                    node_number: u32,
                    _dir: warren_core::Direction,
                    _node_net: &warren_core::Network,
                    _record_net: &warren_core::Network,
                ) {
                    self.numbers.insert(node_number);
                    *self.records += 1;
                }
                fn on_data_record(
                    &mut self,
                    node_number: u32,
                    _dir: warren_core::Direction,
                    _node_net: &warren_core::Network,
                    _record_net: &warren_core::Network,
                    _key: &[u8],
                    _value: &String,
                ) {
                    self.numbers.insert(node_number);
                    *self.records += 1;
                }
            }

            t.iterate(&mut Collect {
                numbers: &mut seen_numbers,
                records: &mut records,
            });

            prop_assert_eq!(records, 2 * count);
            prop_assert_eq!(seen_numbers.len() as u32, count);
            prop_assert!(seen_numbers.iter().all(|&n| n < count));
        }
    }
}
