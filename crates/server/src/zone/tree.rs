// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! radix tree over reversed label keys, the canonical order index of a zone

use std::collections::btree_map::{self, BTreeMap};
use std::sync::Arc;

use crate::zone::node::ZoneNode;

/// A radix tree keyed by the reverse-label form of the owner names.
///
/// Because the keys sort byte-lexicographically in DNSSEC canonical order,
/// an in-order walk of the tree is the NSEC chain order of the zone. The
/// tree itself is not thread safe; the zone lock serializes structural
/// changes.
pub(crate) struct NameTree {
    root: TreeNode,
    len: usize,
}

#[derive(Default)]
struct TreeNode {
    value: Option<Arc<ZoneNode>>,
    children: BTreeMap<u8, Edge>,
}

impl TreeNode {
    fn leaf(value: Arc<ZoneNode>) -> Self {
        Self {
            value: Some(value),
            children: BTreeMap::new(),
        }
    }
}

/// A compressed edge: the first byte of `prefix` duplicates the map key of
/// the parent's children
struct Edge {
    prefix: Vec<u8>,
    node: TreeNode,
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

impl NameTree {
    pub(crate) fn new() -> Self {
        Self {
            root: TreeNode::default(),
            len: 0,
        }
    }

    /// Number of stored values
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Inserts a value under the key, or returns the value already stored
    /// there; insertion is O(key length)
    pub(crate) fn insert(&mut self, key: &str, value: Arc<ZoneNode>) -> Arc<ZoneNode> {
        let mut node = &mut self.root;
        let mut k = key.as_bytes();

        loop {
            if k.is_empty() {
                return match &node.value {
                    Some(existing) => existing.clone(),
                    None => {
                        node.value = Some(value.clone());
                        self.len += 1;
                        value
                    }
                };
            }

            let first = k[0];
            if !node.children.contains_key(&first) {
                node.children.insert(
                    first,
                    Edge {
                        prefix: k.to_vec(),
                        node: TreeNode::leaf(value.clone()),
                    },
                );
                self.len += 1;
                return value;
            }

            let common = {
                let edge = node.children.get(&first).expect("checked above");
                common_prefix(&edge.prefix, k)
            };
            let edge = node.children.get_mut(&first).expect("checked above");
            if common == edge.prefix.len() {
                // the whole edge matches, descend
                k = &k[common..];
                node = &mut edge.node;
                continue;
            }

            // the edge must be split at the common prefix
            let suffix = edge.prefix.split_off(common);
            let old_node = std::mem::take(&mut edge.node);
            edge.node.children.insert(
                suffix[0],
                Edge {
                    prefix: suffix,
                    node: old_node,
                },
            );

            if common == k.len() {
                // the key ends at the split point
                edge.node.value = Some(value.clone());
            } else {
                edge.node.children.insert(
                    k[common],
                    Edge {
                        prefix: k[common..].to_vec(),
                        node: TreeNode::leaf(value.clone()),
                    },
                );
            }
            self.len += 1;
            return value;
        }
    }

    /// Looks up the key, falling back to the nearest ancestor: the last
    /// value-bearing node whose key is a prefix of the search key. The
    /// boolean is true only on an exact match.
    pub(crate) fn find(&self, key: &str) -> (Option<Arc<ZoneNode>>, bool) {
        let (found, exact, _) = self.find_walk(key, |_| false);
        (found, exact)
    }

    /// As `find`, but invokes the predicate on every value-bearing node
    /// visited during the descent; if the predicate fires the walk stops and
    /// that node is returned with the third result true.
    pub(crate) fn find_func<F>(&self, key: &str, predicate: F) -> (Option<Arc<ZoneNode>>, bool, bool)
    where
        F: Fn(&ZoneNode) -> bool,
    {
        self.find_walk(key, predicate)
    }

    fn find_walk<F>(&self, key: &str, predicate: F) -> (Option<Arc<ZoneNode>>, bool, bool)
    where
        F: Fn(&ZoneNode) -> bool,
    {
        let mut node = &self.root;
        let mut k = key.as_bytes();
        let mut last: Option<&Arc<ZoneNode>> = None;

        loop {
            if let Some(value) = &node.value {
                if predicate(value) {
                    return (Some(value.clone()), k.is_empty(), true);
                }
                last = Some(value);
            }
            if k.is_empty() {
                return (last.cloned(), node.value.is_some(), false);
            }

            match node.children.get(&k[0]) {
                Some(edge) if k.starts_with(&edge.prefix) => {
                    k = &k[edge.prefix.len()..];
                    node = &edge.node;
                }
                _ => return (last.cloned(), false, false),
            }
        }
    }

    /// Removes the exact-match value; a no-op when none is stored. Pass-
    /// through nodes left behind are merged back into their parent edge.
    pub(crate) fn remove(&mut self, key: &str) -> Option<Arc<ZoneNode>> {
        let removed = Self::remove_walk(&mut self.root, key.as_bytes());
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    fn remove_walk(node: &mut TreeNode, k: &[u8]) -> Option<Arc<ZoneNode>> {
        if k.is_empty() {
            return node.value.take();
        }

        let first = k[0];
        let removed = {
            let edge = node.children.get_mut(&first)?;
            if !k.starts_with(&edge.prefix) {
                return None;
            }
            let rest = &k[edge.prefix.len()..];
            Self::remove_walk(&mut edge.node, rest)?
        };

        // prune an empty leaf, merge a left-over pass-through node
        let edge = node.children.get_mut(&first).expect("still present");
        if edge.node.value.is_none() {
            if edge.node.children.is_empty() {
                node.children.remove(&first);
            } else if edge.node.children.len() == 1 {
                let (_, child) = edge.node.children.pop_first().expect("one child");
                edge.prefix.extend_from_slice(&child.prefix);
                edge.node = child.node;
            }
        }

        Some(removed)
    }

    /// First value in key order
    pub(crate) fn first(&self) -> Option<Arc<ZoneNode>> {
        Self::first_value(&self.root).cloned()
    }

    fn first_value(node: &TreeNode) -> Option<&Arc<ZoneNode>> {
        if let Some(value) = &node.value {
            return Some(value);
        }
        node.children
            .values()
            .next()
            .and_then(|edge| Self::first_value(&edge.node))
    }

    /// In-order successor of the key, wrapping around to the first value so
    /// that a walk can detect the end of the zone by seeing the origin again
    pub(crate) fn next(&self, key: &str) -> Option<Arc<ZoneNode>> {
        match Self::successor(&self.root, key.as_bytes()) {
            Some(value) => Some(value.clone()),
            None => self.first(),
        }
    }

    /// Smallest value with key strictly greater than `k`, relative to `node`
    fn successor<'a>(node: &'a TreeNode, k: &[u8]) -> Option<&'a Arc<ZoneNode>> {
        if k.is_empty() {
            // anything below this node extends the key and is greater
            return node
                .children
                .values()
                .find_map(|edge| Self::first_value(&edge.node));
        }

        let mut past_match = false;
        for (_, edge) in node.children.range(k[0]..) {
            if past_match || edge.prefix[0] > k[0] {
                if let Some(value) = Self::first_value(&edge.node) {
                    return Some(value);
                }
                continue;
            }

            // edge.prefix[0] == k[0], the only edge the key can live under
            let common = common_prefix(&edge.prefix, k);
            if common == edge.prefix.len() && common < k.len() {
                // descend; on failure later siblings are still candidates
                if let Some(value) = Self::successor(&edge.node, &k[common..]) {
                    return Some(value);
                }
            } else if common == k.len() && common == edge.prefix.len() {
                // the key sits exactly on this node
                if let Some(value) = Self::successor(&edge.node, b"") {
                    return Some(value);
                }
            } else if common == k.len() {
                // the key is a proper prefix of the edge, the subtree is greater
                if let Some(value) = Self::first_value(&edge.node) {
                    return Some(value);
                }
            } else if edge.prefix[common] > k[common] {
                if let Some(value) = Self::first_value(&edge.node) {
                    return Some(value);
                }
            }
            // otherwise the subtree orders before the key
            past_match = true;
        }

        None
    }

    /// In-order iteration over the values, i.e. canonical zone order
    pub(crate) fn iter(&self) -> Iter<'_> {
        Iter {
            stack: vec![self.root.children.values()],
            root_value: self.root.value.as_ref(),
        }
    }
}

/// In-order iterator over a [`NameTree`]
pub(crate) struct Iter<'a> {
    stack: Vec<btree_map::Values<'a, u8, Edge>>,
    root_value: Option<&'a Arc<ZoneNode>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Arc<ZoneNode>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(value) = self.root_value.take() {
            return Some(value);
        }

        loop {
            let current = self.stack.last_mut()?;
            match current.next() {
                Some(edge) => {
                    self.stack.push(edge.node.children.values());
                    if let Some(value) = &edge.node.value {
                        return Some(value);
                    }
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use shellbark_proto::rr::Name;

    fn node(name: &str) -> Arc<ZoneNode> {
        Arc::new(ZoneNode::new(Name::from_str(name).unwrap()))
    }

    fn tree_of(names: &[&str]) -> NameTree {
        let mut tree = NameTree::new();
        for name in names {
            let n = node(name);
            tree.insert(&n.name().to_radix_key(), n);
        }
        tree
    }

    #[test]
    fn test_insert_find_exact() {
        let tree = tree_of(&["example.com.", "www.example.com.", "a.example.com."]);
        assert_eq!(tree.len(), 3);

        let key = Name::from_str("www.example.com.").unwrap().to_radix_key();
        let (found, exact) = tree.find(&key);
        assert!(exact);
        assert_eq!(
            found.unwrap().name(),
            &Name::from_str("www.example.com.").unwrap()
        );
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut tree = NameTree::new();
        let first = node("www.example.com.");
        let key = first.name().to_radix_key();

        let stored = tree.insert(&key, first.clone());
        assert!(Arc::ptr_eq(&stored, &first));

        // a second insert returns the node already there
        let second = node("www.example.com.");
        let stored = tree.insert(&key, second);
        assert!(Arc::ptr_eq(&stored, &first));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_find_falls_back_to_ancestor() {
        let tree = tree_of(&["example.com.", "www.example.com."]);

        let key = Name::from_str("sub.www.example.com.")
            .unwrap()
            .to_radix_key();
        let (found, exact) = tree.find(&key);
        assert!(!exact);
        assert_eq!(
            found.unwrap().name(),
            &Name::from_str("www.example.com.").unwrap()
        );

        // a miss in another branch falls back to the deepest common ancestor
        let key = Name::from_str("b.a.example.com.").unwrap().to_radix_key();
        let (found, exact) = tree.find(&key);
        assert!(!exact);
        assert_eq!(
            found.unwrap().name(),
            &Name::from_str("example.com.").unwrap()
        );

        // nothing on the path at all
        let key = Name::from_str("example.org.").unwrap().to_radix_key();
        let (found, exact) = tree.find(&key);
        assert!(!exact);
        assert!(found.is_none());
    }

    #[test]
    fn test_find_func_stops_at_predicate() {
        let tree = tree_of(&["example.com.", "www.example.com."]);
        let apex = Name::from_str("example.com.").unwrap();

        let key = Name::from_str("www.example.com.").unwrap().to_radix_key();
        let (found, exact, matched) = tree.find_func(&key, |n| n.name() == &apex);
        assert!(matched);
        assert!(!exact);
        assert_eq!(found.unwrap().name(), &apex);

        let (found, exact, matched) = tree.find_func(&key, |_| false);
        assert!(!matched);
        assert!(exact);
        assert_eq!(
            found.unwrap().name(),
            &Name::from_str("www.example.com.").unwrap()
        );
    }

    #[test]
    fn test_remove_and_merge() {
        let mut tree = tree_of(&["example.com.", "www.example.com.", "a.example.com."]);

        let key = Name::from_str("a.example.com.").unwrap().to_radix_key();
        assert!(tree.remove(&key).is_some());
        assert!(tree.remove(&key).is_none());
        assert_eq!(tree.len(), 2);

        // the survivors are unaffected
        let key = Name::from_str("www.example.com.").unwrap().to_radix_key();
        let (found, exact) = tree.find(&key);
        assert!(exact);
        assert!(found.is_some());

        let key = Name::from_str("example.com.").unwrap().to_radix_key();
        let (_, exact) = tree.find(&key);
        assert!(exact);
    }

    #[test]
    fn test_iter_in_canonical_order() {
        // deliberately inserted out of order
        let tree = tree_of(&[
            "z.example.com.",
            "example.com.",
            "yljkjljk.a.example.com.",
            "a.example.com.",
            "*.z.example.com.",
            "zabc.a.example.com.",
        ]);

        let walked: Vec<String> = tree.iter().map(|n| n.name().to_string()).collect();
        assert_eq!(
            walked,
            vec![
                "example.com.",
                "a.example.com.",
                "yljkjljk.a.example.com.",
                "zabc.a.example.com.",
                "z.example.com.",
                "*.z.example.com.",
            ]
        );
    }

    #[test]
    fn test_next_walks_the_chain_and_wraps() {
        let names = [
            "example.com.",
            "a.example.com.",
            "www.example.com.",
            "z.example.com.",
        ];
        let tree = tree_of(&names);

        let mut at = Name::from_str("example.com.").unwrap();
        let mut seen = vec![at.to_string()];
        loop {
            let next = tree.next(&at.to_radix_key()).unwrap();
            if next.name() == &Name::from_str("example.com.").unwrap() {
                break;
            }
            seen.push(next.name().to_string());
            at = next.name().clone();
        }
        assert_eq!(
            seen,
            vec![
                "example.com.",
                "a.example.com.",
                "www.example.com.",
                "z.example.com.",
            ]
        );
    }

    #[test]
    fn test_next_of_unstored_key() {
        let tree = tree_of(&["example.com.", "www.example.com."]);

        // a key between the two stored ones
        let key = Name::from_str("m.example.com.").unwrap().to_radix_key();
        let next = tree.next(&key).unwrap();
        assert_eq!(
            next.name(),
            &Name::from_str("www.example.com.").unwrap()
        );
    }
}
