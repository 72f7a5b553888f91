// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! An uncompressed binary trie keyed on address bits, associating payloads
//! to IP prefixes and answering longest-prefix-match queries.

use crate::key::Uint128;
use crate::prefix::Prefix;
use std::net::IpAddr;

mod display;
mod map;
pub use map::{BatchError, PrefixMap, TrieError};

/// One bit-position of the explored address space: a child per bit value
/// (0 left, 1 right) and an optional payload.
#[derive(Debug, Clone)]
struct TrieNode<T> {
    left: Option<Box<TrieNode<T>>>,
    right: Option<Box<TrieNode<T>>>,
    payload: Option<T>,
}

impl<T> TrieNode<T> {
    fn inheriting(payload: Option<T>) -> Self {
        Self {
            left: None,
            right: None,
            payload,
        }
    }

    fn child(&self, bit: bool) -> Option<&TrieNode<T>> {
        if bit {
            self.right.as_deref()
        } else {
            self.left.as_deref()
        }
    }
}

impl<T: Clone + PartialEq> TrieNode<T> {
    /// Push `value` into the subtree. A descendant whose payload is neither
    /// absent, nor `value`, nor the payload `value` displaced marks a more
    /// specific prefix: it keeps its payload and nothing below it is
    /// touched.
    fn propagate(&mut self, displaced: Option<&T>, value: &T) {
        for child in [&mut self.left, &mut self.right] {
            if let Some(child) = child {
                match child.payload.as_ref() {
                    Some(p) if p != value && Some(p) != displaced => {}
                    _ => {
                        child.payload = Some(value.clone());
                        child.propagate(displaced, value);
                    }
                }
            }
        }
    }
}

/// A binary trie over the 128-bit address key space, one level per address
/// bit, most significant bit first.
///
/// A single trie serves one address family: IPv4 keys are walked over their
/// low 32 bits and IPv6 keys over all 128, so mixing families in one
/// instance produces meaningless matches. This is not detected at runtime;
/// [`PrefixMap`] keeps one trie per family and is what most callers want.
///
/// The expected lifecycle is build-once, query-many: all insertions complete
/// before lookups start, and lookups never mutate the tree.
#[derive(Debug, Clone)]
pub struct PrefixTrie<T> {
    root: TrieNode<T>,
}

impl<T> Default for PrefixTrie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PrefixTrie<T> {
    /// Creates a new, empty [`PrefixTrie`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: TrieNode::inheriting(None),
        }
    }

    /// Tell whether the trie holds no payload at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.payload.is_none() && self.root.left.is_none() && self.root.right.is_none()
    }

    /// Looks up the payload of the most specific prefix containing `addr`,
    /// or `None` if no stored prefix covers it.
    ///
    /// The walk consumes one address bit per level, at most 32 for an IPv4
    /// query and 128 for an IPv6 one, remembering the deepest payload seen,
    /// and stops at the first missing child. Pure query, no allocation.
    #[must_use]
    pub fn lookup(&self, addr: &IpAddr) -> Option<&T> {
        let key = Uint128::from(*addr);
        let width: u32 = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        let mut node = &self.root;
        let mut best = node.payload.as_ref();
        for depth in 0..width {
            match node.child(key.bit(width - 1 - depth)) {
                Some(next) => {
                    node = next;
                    if node.payload.is_some() {
                        best = node.payload.as_ref();
                    }
                }
                None => break,
            }
        }
        best
    }
}

impl<T: Clone + PartialEq> PrefixTrie<T> {
    /// Associate `payload` with `prefix`, overwriting any previous payload
    /// for the exact same prefix.
    ///
    /// The walk consumes one bit of the network address per level, `length`
    /// levels deep, creating missing nodes on the way down; a node created
    /// here starts with the payload of the node it hangs off, so a lookup
    /// ending early on the new path still reports the covering prefix. The
    /// payload is then pushed down the subtree below the prefix node without
    /// disturbing more specific prefixes, which keeps lookups correct for
    /// any insertion order.
    ///
    /// Payloads are compared by value when deciding what "more specific"
    /// means, so nested prefixes should carry distinct payloads: a more
    /// specific prefix whose payload equals the one being displaced here is
    /// repainted along with it.
    pub fn insert(&mut self, prefix: &Prefix, payload: T) {
        let key = Uint128::from(prefix.as_address());
        let width = u32::from(prefix.max_length());
        let mut node = &mut self.root;
        for depth in 0..u32::from(prefix.length()) {
            let inherited = node.payload.clone();
            let slot = if key.bit(width - 1 - depth) {
                &mut node.right
            } else {
                &mut node.left
            };
            node = slot.get_or_insert_with(|| Box::new(TrieNode::inheriting(inherited)));
        }
        let displaced = node.payload.replace(payload.clone());
        node.propagate(displaced.as_ref(), &payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipnet::{Ipv4Net, Ipv6Net};
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn addr(s: &str) -> IpAddr {
        s.parse().expect("Invalid address")
    }

    fn trie_from<T: Clone + PartialEq>(entries: &[(&str, T)]) -> PrefixTrie<T> {
        let mut trie = PrefixTrie::new();
        for (cidr, payload) in entries {
            trie.insert(&Prefix::from(*cidr), payload.clone());
        }
        trie
    }

    fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let mut rest = items.to_vec();
            rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, item.clone());
                out.push(tail);
            }
        }
        out
    }

    #[test]
    fn test_empty_trie_has_no_matches() {
        let trie: PrefixTrie<u32> = PrefixTrie::new();
        assert!(trie.is_empty());
        assert_eq!(trie.lookup(&addr("0.0.0.0")), None);
        assert_eq!(trie.lookup(&addr("255.255.255.255")), None);
        assert_eq!(trie.lookup(&addr("::")), None);
    }

    #[test]
    fn test_insert_lookup_v4() {
        let trie = trie_from(&[("192.168.0.0/16", 123u32)]);
        assert!(!trie.is_empty());
        assert_eq!(trie.lookup(&addr("192.168.0.7")), Some(&123));
        assert_eq!(trie.lookup(&addr("192.168.0.0")), Some(&123));
        assert_eq!(trie.lookup(&addr("192.168.255.255")), Some(&123));
        assert_eq!(trie.lookup(&addr("192.169.0.1")), None);
        assert_eq!(trie.lookup(&addr("10.0.0.1")), None);
    }

    #[test]
    fn test_insert_lookup_v6() {
        let trie = trie_from(&[("2001:db8:1234::/48", 123u32)]);
        assert_eq!(trie.lookup(&addr("2001:db8:1234::7")), Some(&123));
        assert_eq!(
            trie.lookup(&addr("2001:db8:1234:ffff:ffff:ffff:ffff:ffff")),
            Some(&123)
        );
        assert_eq!(trie.lookup(&addr("2001:db8:1235::1")), None);
        assert_eq!(trie.lookup(&addr("2001:db9::1")), None);
    }

    #[test]
    fn test_default_route() {
        let trie = trie_from(&[("0.0.0.0/0", 7u32)]);
        assert_eq!(trie.lookup(&addr("0.0.0.0")), Some(&7));
        assert_eq!(trie.lookup(&addr("255.255.255.255")), Some(&7));
        assert_eq!(trie.lookup(&addr("10.1.2.3")), Some(&7));

        let trie6 = trie_from(&[("::/0", 9u32)]);
        assert_eq!(trie6.lookup(&addr("::")), Some(&9));
        assert_eq!(
            trie6.lookup(&addr("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff")),
            Some(&9)
        );
    }

    #[test]
    fn test_host_prefixes() {
        let trie = trie_from(&[("10.0.0.0/8", 1u32), ("10.0.0.1/32", 2u32)]);
        assert_eq!(trie.lookup(&addr("10.0.0.1")), Some(&2));
        assert_eq!(trie.lookup(&addr("10.0.0.2")), Some(&1));
        assert_eq!(trie.lookup(&addr("10.0.0.0")), Some(&1));

        let trie6 = trie_from(&[("2001:db8::/32", 1u32), ("2001:db8::1/128", 2u32)]);
        assert_eq!(trie6.lookup(&addr("2001:db8::1")), Some(&2));
        assert_eq!(trie6.lookup(&addr("2001:db8::2")), Some(&1));
    }

    #[test]
    fn test_more_specific_wins_either_insertion_order() {
        let inside_narrow = addr("10.1.2.3");
        let inside_wide_only = addr("10.200.0.1");

        let trie = trie_from(&[("10.0.0.0/8", 1u32), ("10.1.0.0/16", 2u32)]);
        assert_eq!(trie.lookup(&inside_narrow), Some(&2));
        assert_eq!(trie.lookup(&inside_wide_only), Some(&1));

        let trie = trie_from(&[("10.1.0.0/16", 2u32), ("10.0.0.0/8", 1u32)]);
        assert_eq!(trie.lookup(&inside_narrow), Some(&2));
        assert_eq!(trie.lookup(&inside_wide_only), Some(&1));
    }

    #[test]
    fn test_broad_insert_after_narrow_nested_in_default() {
        // Insertion order 1, 3, 2: the later, broader /16 must neither
        // clobber the earlier /32 nor leave the path toward it claiming the
        // default payload.
        let mut trie = PrefixTrie::new();
        trie.insert(&Prefix::from("0.0.0.0/0"), 1u32);
        trie.insert(&Prefix::from("255.255.255.255/32"), 3u32);
        trie.insert(&Prefix::from("255.255.0.0/16"), 2u32);

        assert_eq!(trie.lookup(&addr("0.0.0.1")), Some(&1));
        assert_eq!(trie.lookup(&addr("255.255.0.1")), Some(&2));
        assert_eq!(trie.lookup(&addr("255.255.255.255")), Some(&3));
        // addresses sharing a long path with the /32 still belong to the /16
        assert_eq!(trie.lookup(&addr("255.255.255.254")), Some(&2));
        assert_eq!(trie.lookup(&addr("255.255.128.1")), Some(&2));
        // just outside the /16
        assert_eq!(trie.lookup(&addr("255.254.0.1")), Some(&1));
    }

    #[test]
    fn test_insertion_order_independence() {
        let entries = [
            ("0.0.0.0/0", 1u32),
            ("10.0.0.0/8", 2u32),
            ("10.1.0.0/16", 3u32),
            ("10.1.2.0/24", 4u32),
        ];
        let probes = [
            ("192.0.2.1", Some(1u32)),
            ("10.9.0.1", Some(2)),
            ("10.1.9.1", Some(3)),
            ("10.1.2.200", Some(4)),
            ("10.1.2.0", Some(4)),
        ];

        for permutation in permutations(&entries) {
            let trie = trie_from(&permutation);
            for (probe, expected) in &probes {
                assert_eq!(
                    trie.lookup(&addr(probe)),
                    expected.as_ref(),
                    "probe {probe} with insertion order {permutation:?}"
                );
            }
        }
    }

    #[test]
    fn test_reinsert_same_prefix_replaces_payload() {
        let mut trie = trie_from(&[("10.0.0.0/8", 1u32), ("10.0.0.0/16", 2u32)]);
        trie.insert(&Prefix::from("10.0.0.0/8"), 5u32);
        assert_eq!(trie.lookup(&addr("10.200.0.1")), Some(&5));
        assert_eq!(trie.lookup(&addr("10.0.1.1")), Some(&2));
    }

    #[test]
    fn test_lookup_stops_at_divergence() {
        let trie = trie_from(&[("10.0.0.0/8", 1u32), ("10.0.0.0/16", 2u32)]);
        // diverges from the /16 path right after depth 8
        assert_eq!(trie.lookup(&addr("10.128.0.1")), Some(&1));
        assert_eq!(trie.lookup(&addr("10.0.200.1")), Some(&2));
    }

    #[test]
    fn test_lookup_matches_linear_scan_v4() {
        bolero::check!()
            .with_type::<Vec<(u32, u8)>>()
            .for_each(|raw| {
                let nets: Vec<Ipv4Net> = raw
                    .iter()
                    .map(|&(bits, len)| {
                        Ipv4Net::new(Ipv4Addr::from_bits(bits), len % 33)
                            .expect("Invalid net")
                            .trunc()
                    })
                    .collect();
                // payload is the canonical prefix string: duplicates of a
                // prefix agree on it and distinct prefixes never collide
                let mut trie = PrefixTrie::new();
                for net in &nets {
                    trie.insert(&Prefix::from(*net), net.to_string());
                }
                let probes = nets
                    .iter()
                    .flat_map(|net| [net.network(), net.broadcast()])
                    .chain([Ipv4Addr::new(0, 0, 0, 0), Ipv4Addr::new(255, 255, 255, 255)]);
                for probe in probes {
                    let expected = nets
                        .iter()
                        .filter(|net| net.contains(&probe))
                        .max_by_key(|net| net.prefix_len())
                        .map(ToString::to_string);
                    assert_eq!(
                        trie.lookup(&IpAddr::V4(probe)).cloned(),
                        expected,
                        "probe {probe}"
                    );
                }
            });
    }

    #[test]
    fn test_lookup_matches_linear_scan_v6() {
        bolero::check!()
            .with_type::<Vec<(u128, u8)>>()
            .for_each(|raw| {
                let nets: Vec<Ipv6Net> = raw
                    .iter()
                    .map(|&(bits, len)| {
                        Ipv6Net::new(Ipv6Addr::from_bits(bits), len % 129)
                            .expect("Invalid net")
                            .trunc()
                    })
                    .collect();
                let mut trie = PrefixTrie::new();
                for net in &nets {
                    trie.insert(&Prefix::from(*net), net.to_string());
                }
                let probes = nets
                    .iter()
                    .flat_map(|net| [net.network(), net.broadcast()]);
                for probe in probes {
                    let expected = nets
                        .iter()
                        .filter(|net| net.contains(&probe))
                        .max_by_key(|net| net.prefix_len())
                        .map(ToString::to_string);
                    assert_eq!(
                        trie.lookup(&IpAddr::V6(probe)).cloned(),
                        expected,
                        "probe {probe}"
                    );
                }
            });
    }
}
