// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! An authoritative zone: canonically ordered in-memory record storage

mod node;
mod signer;
mod tree;

pub use self::node::ZoneNode;
pub use self::signer::{SignatureConfig, ZoneSigningKey};

use std::sync::Arc;

use parking_lot::RwLock;
use time::OffsetDateTime;
use tracing::trace;

use shellbark_proto::rr::{Name, Record, RecordType};

use crate::error::{ZoneError, ZoneErrorKind};
use crate::zone::tree::NameTree;

/// A DNS zone, safe for concurrent use.
///
/// Records are grouped by owner name into [`ZoneNode`]s, which a radix tree
/// over the reverse-label keys holds in DNSSEC canonical order. A zone level
/// reader-writer lock guards the tree and the zone counters; each node has
/// its own lock for its contents. Lock order is always zone first, then at
/// most one node.
///
/// Mutations keep the zone write lock for the whole operation. That forgoes
/// a little concurrency between content edits on distinct nodes, but it
/// leaves no window in which a looked-up node can be unlinked before its
/// edit lands.
pub struct Zone {
    origin: Name,
    origin_labels: Vec<String>,
    inner: RwLock<ZoneInner>,
}

struct ZoneInner {
    tree: NameTree,
    wildcard_count: u32,
    mod_time: OffsetDateTime,
    expired: bool,
}

impl Zone {
    /// Creates an initialized zone with the given origin.
    ///
    /// The origin is lowercased and made fully qualified; parse a `Name`
    /// first for the validity checks, the empty string parses as the root.
    pub fn new(origin: Name) -> Self {
        let origin = origin.to_lowercase().to_fqdn();
        let origin_labels = origin.labels().iter().map(|l| l.to_string()).collect();
        Self {
            origin,
            origin_labels,
            inner: RwLock::new(ZoneInner {
                tree: NameTree::new(),
                wildcard_count: 0,
                mod_time: OffsetDateTime::now_utc(),
                expired: false,
            }),
        }
    }

    /// Returns the fully qualified, lowercased origin of the zone
    pub fn origin(&self) -> &Name {
        &self.origin
    }

    /// Returns the number of nodes whose leftmost label is the wildcard
    pub fn wildcard_count(&self) -> u32 {
        self.inner.read().wildcard_count
    }

    /// Returns the time of the last mutation
    pub fn mod_time(&self) -> OffsetDateTime {
        self.inner.read().mod_time
    }

    /// Returns true when a secondary zone has outlived its expire interval.
    /// The flag is opaque to the store itself.
    pub fn is_expired(&self) -> bool {
        self.inner.read().expired
    }

    /// Marks the zone expired, or fresh again
    pub fn set_expired(&self, expired: bool) {
        self.inner.write().expired = expired;
    }

    /// Returns the number of owner names in the zone
    pub fn len(&self) -> usize {
        self.inner.read().tree.len()
    }

    /// Returns true when the zone holds no names at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when `name` equals the origin or ends in it, compared per label
    fn is_in_zone(&self, name: &Name) -> bool {
        let labels = name.labels();
        if self.origin_labels.len() > labels.len() {
            return false;
        }
        self.origin_labels
            .iter()
            .rev()
            .zip(labels.iter().rev())
            .all(|(o, l)| o.eq_ignore_ascii_case(l))
    }

    /// Inserts the record into the zone.
    ///
    /// There is no check for duplicate data; `remove` takes duplicates back
    /// out one call at a time. Fails without touching the zone when the
    /// owner is not below the origin.
    pub fn insert(&self, rr: Arc<Record>) -> Result<(), ZoneError> {
        if !self.is_in_zone(rr.name()) {
            return Err(ZoneErrorKind::OutOfZone(rr.name().clone()).into());
        }

        let key = rr.name().to_radix_key();
        let delegation = rr.record_type() == RecordType::NS && rr.name() != &self.origin;

        let mut inner = self.inner.write();
        inner.mod_time = OffsetDateTime::now_utc();

        let (found, exact) = inner.tree.find(&key);
        let node = match (found, exact) {
            (Some(node), true) => node,
            _ => {
                trace!("new name in zone {}: {}", self.origin, rr.name());
                if rr.name().is_wildcard() {
                    inner.wildcard_count += 1;
                }
                inner
                    .tree
                    .insert(&key, Arc::new(ZoneNode::new(rr.name().clone())))
            }
        };
        node.insert(rr, delegation);
        Ok(())
    }

    /// Removes the record from the zone, by pointer identity; unknown
    /// records are a no-op.
    ///
    /// A node left without records or signatures is unlinked from the tree.
    pub fn remove(&self, rr: &Arc<Record>) {
        let key = rr.name().to_radix_key();

        let mut inner = self.inner.write();
        let (found, exact) = inner.tree.find(&key);
        let node = match (found, exact) {
            (Some(node), true) => node,
            _ => return,
        };

        if !node.remove(rr) {
            return;
        }
        inner.mod_time = OffsetDateTime::now_utc();

        if node.is_empty() {
            inner.tree.remove(&key);
            if rr.name().is_wildcard() {
                inner.wildcard_count = inner.wildcard_count.saturating_sub(1);
            }
        }
    }

    /// Removes all the records at the owner name, typically for a dynamic
    /// update; missing names are a no-op
    pub fn remove_name(&self, name: &Name) {
        let key = name.to_radix_key();

        let mut inner = self.inner.write();
        if inner.tree.remove(&key).is_some() {
            inner.mod_time = OffsetDateTime::now_utc();
            if name.is_wildcard() {
                inner.wildcard_count = inner.wildcard_count.saturating_sub(1);
            }
        }
    }

    /// Removes the RRset of the given type at the owner name; `RRSIG` clears
    /// every signature at the node. The node itself stays, even when this
    /// leaves it empty.
    pub fn remove_rrset(&self, name: &Name, record_type: RecordType) {
        let key = name.to_radix_key();

        let mut inner = self.inner.write();
        let (found, exact) = inner.tree.find(&key);
        let node = match (found, exact) {
            (Some(node), true) => node,
            _ => return,
        };

        if node.clear_rrset(record_type) {
            inner.mod_time = OffsetDateTime::now_utc();
        }
    }

    /// Looks up the owner name.
    ///
    /// On an exact match the second value is true; otherwise the nearest
    /// ancestor with data is returned, or nothing when there is none on the
    /// path.
    pub fn find(&self, name: &Name) -> Option<(Arc<ZoneNode>, bool)> {
        let inner = self.inner.read();
        match inner.tree.find(&name.to_radix_key()) {
            (Some(node), exact) => Some((node, exact)),
            (None, _) => None,
        }
    }

    /// Works like `find`, but the predicate runs on each node with data
    /// visited during the descent; if it returns true that node is returned
    /// and the third value is true.
    ///
    /// Typical use is picking up a wildcard or a delegation cut while
    /// descending to a query name.
    pub fn find_func<F>(&self, name: &Name, predicate: F) -> Option<(Arc<ZoneNode>, bool, bool)>
    where
        F: Fn(&ZoneNode) -> bool,
    {
        let inner = self.inner.read();
        match inner.tree.find_func(&name.to_radix_key(), predicate) {
            (Some(node), exact, matched) => Some((node, exact, matched)),
            (None, ..) => None,
        }
    }

    /// Returns the apex node. A zone without one is not a legal zone.
    pub fn apex(&self) -> Option<Arc<ZoneNode>> {
        self.find(&self.origin)
            .and_then(|(node, exact)| exact.then_some(node))
    }

    /// Returns the in-order successor of the owner name, wrapping around to
    /// the first name of the zone
    pub fn next(&self, name: &Name) -> Option<Arc<ZoneNode>> {
        self.inner.read().tree.next(&name.to_radix_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    use shellbark_proto::rr::RData;

    fn a_record(name: &str, addr: [u8; 4]) -> Arc<Record> {
        Arc::new(Record::from_rdata(
            Name::from_str(name).unwrap(),
            300,
            RData::A(Ipv4Addr::from(addr)),
        ))
    }

    fn aaaa_record(name: &str) -> Arc<Record> {
        Arc::new(Record::from_rdata(
            Name::from_str(name).unwrap(),
            300,
            RData::AAAA("2001:db8::1".parse().unwrap()),
        ))
    }

    #[test]
    fn test_insert_and_find() {
        let zone = Zone::new(Name::from_str("example.com.").unwrap());
        let rr = a_record("www.example.com.", [1, 2, 3, 4]);
        zone.insert(rr.clone()).unwrap();

        let (node, exact) = zone
            .find(&Name::from_str("www.example.com.").unwrap())
            .unwrap();
        assert!(exact);
        let rrset = node.records(RecordType::A);
        assert_eq!(rrset.len(), 1);
        assert!(Arc::ptr_eq(&rrset[0], &rr));

        // a child of a stored name falls back to it
        let (node, exact) = zone
            .find(&Name::from_str("sub.www.example.com.").unwrap())
            .unwrap();
        assert!(!exact);
        assert_eq!(node.name(), &Name::from_str("www.example.com.").unwrap());
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let zone = Zone::new(Name::from_str("example.com.").unwrap());
        zone.insert(a_record("www.Example.COM.", [1, 2, 3, 4])).unwrap();

        let (_, exact) = zone
            .find(&Name::from_str("WWW.example.com.").unwrap())
            .unwrap();
        assert!(exact);
    }

    #[test]
    fn test_out_of_zone_insert_leaves_zone_unchanged() {
        let zone = Zone::new(Name::from_str("example.com.").unwrap());
        let before = zone.mod_time();

        let err = zone
            .insert(a_record("example.org.", [1, 2, 3, 4]))
            .unwrap_err();
        assert!(matches!(err.kind(), ZoneErrorKind::OutOfZone(_)));
        assert!(zone.is_empty());
        assert_eq!(zone.mod_time(), before);

        // a name that merely shares a suffix string is still out of zone
        assert!(zone.insert(a_record("notexample.com.", [1, 2, 3, 4])).is_err());
    }

    #[test]
    fn test_insert_remove_restores_prior_state() {
        let zone = Zone::new(Name::from_str("example.com.").unwrap());
        zone.insert(a_record("www.example.com.", [1, 2, 3, 4])).unwrap();

        let extra = a_record("www.example.com.", [5, 6, 7, 8]);
        zone.insert(extra.clone()).unwrap();
        zone.remove(&extra);

        let (node, exact) = zone
            .find(&Name::from_str("www.example.com.").unwrap())
            .unwrap();
        assert!(exact);
        assert_eq!(node.records(RecordType::A).len(), 1);

        // removing the only record takes the node with it
        let (node, _) = zone
            .find(&Name::from_str("www.example.com.").unwrap())
            .unwrap();
        let last = node.records(RecordType::A)[0].clone();
        zone.remove(&last);
        assert!(zone.find(&Name::from_str("www.example.com.").unwrap()).is_none());
    }

    #[test]
    fn test_wildcard_accounting() {
        let zone = Zone::new(Name::from_str("example.com.").unwrap());

        let a = a_record("*.example.com.", [1, 2, 3, 4]);
        let aaaa = aaaa_record("*.example.com.");
        zone.insert(a.clone()).unwrap();
        zone.insert(aaaa.clone()).unwrap();
        assert_eq!(zone.wildcard_count(), 1);

        zone.remove(&a);
        assert_eq!(zone.wildcard_count(), 1);
        zone.remove(&aaaa);
        assert_eq!(zone.wildcard_count(), 0);
        assert!(zone.find(&Name::from_str("*.example.com.").unwrap()).is_none());

        // a stale decrement clamps at zero
        zone.remove_name(&Name::from_str("*.example.com.").unwrap());
        assert_eq!(zone.wildcard_count(), 0);
    }

    #[test]
    fn test_remove_name() {
        let zone = Zone::new(Name::from_str("example.com.").unwrap());
        zone.insert(a_record("www.example.com.", [1, 2, 3, 4])).unwrap();
        zone.insert(aaaa_record("www.example.com.")).unwrap();

        zone.remove_name(&Name::from_str("www.example.com.").unwrap());
        assert!(zone.find(&Name::from_str("www.example.com.").unwrap()).is_none());

        // removing an absent name is a no-op
        let before = zone.mod_time();
        zone.remove_name(&Name::from_str("gone.example.com.").unwrap());
        assert_eq!(zone.mod_time(), before);
    }

    #[test]
    fn test_remove_rrset_keeps_the_node() {
        let zone = Zone::new(Name::from_str("example.com.").unwrap());
        zone.insert(a_record("www.example.com.", [1, 2, 3, 4])).unwrap();
        zone.insert(aaaa_record("www.example.com.")).unwrap();

        let name = Name::from_str("www.example.com.").unwrap();
        zone.remove_rrset(&name, RecordType::A);

        let (node, exact) = zone.find(&name).unwrap();
        assert!(exact);
        assert!(node.records(RecordType::A).is_empty());
        assert_eq!(node.records(RecordType::AAAA).len(), 1);

        // emptying the node entirely still keeps it
        zone.remove_rrset(&name, RecordType::AAAA);
        let (node, exact) = zone.find(&name).unwrap();
        assert!(exact);
        assert!(node.is_empty());
    }

    #[test]
    fn test_delegation_marks_non_auth() {
        let zone = Zone::new(Name::from_str("example.com.").unwrap());
        let apex_ns = Arc::new(Record::from_rdata(
            Name::from_str("example.com.").unwrap(),
            3600,
            RData::NS(Name::from_str("ns1.example.com.").unwrap()),
        ));
        let child_ns = Arc::new(Record::from_rdata(
            Name::from_str("child.example.com.").unwrap(),
            3600,
            RData::NS(Name::from_str("ns1.child.example.com.").unwrap()),
        ));

        zone.insert(apex_ns).unwrap();
        zone.insert(child_ns).unwrap();

        let (apex, _) = zone.find(&Name::from_str("example.com.").unwrap()).unwrap();
        assert!(!apex.is_non_auth());

        let (child, _) = zone
            .find(&Name::from_str("child.example.com.").unwrap())
            .unwrap();
        assert!(child.is_non_auth());
    }

    #[test]
    fn test_apex() {
        let zone = Zone::new(Name::from_str("example.com.").unwrap());
        assert!(zone.apex().is_none());

        zone.insert(a_record("example.com.", [1, 2, 3, 4])).unwrap();
        assert_eq!(
            zone.apex().unwrap().name(),
            &Name::from_str("example.com.").unwrap()
        );
    }

    #[test]
    fn test_find_func_picks_up_delegation() {
        let zone = Zone::new(Name::from_str("example.com.").unwrap());
        zone.insert(Arc::new(Record::from_rdata(
            Name::from_str("child.example.com.").unwrap(),
            3600,
            RData::NS(Name::from_str("ns1.child.example.com.").unwrap()),
        )))
        .unwrap();
        zone.insert(a_record("deep.child.example.com.", [1, 2, 3, 4]))
            .unwrap();

        let (node, exact, matched) = zone
            .find_func(&Name::from_str("deep.child.example.com.").unwrap(), |n| {
                n.is_non_auth()
            })
            .unwrap();
        assert!(matched);
        assert!(!exact);
        assert_eq!(node.name(), &Name::from_str("child.example.com.").unwrap());
    }

    #[test]
    fn test_mixed_mutators_keep_invariants() {
        use std::thread;

        let zone = Zone::new(Name::from_str("example.com.").unwrap());
        thread::scope(|scope| {
            for t in 0..4 {
                let zone = &zone;
                scope.spawn(move || {
                    for i in 0..50 {
                        let name = format!("h{t}-{i}.example.com.");
                        let rr = a_record(&name, [10, 0, t, i]);
                        zone.insert(rr.clone()).unwrap();
                        if i % 3 == 0 {
                            zone.remove(&rr);
                        }
                        if i % 7 == 0 {
                            let star = a_record("*.example.com.", [10, 9, 9, 9]);
                            zone.insert(star.clone()).unwrap();
                            zone.remove(&star);
                        }
                    }
                });
            }
        });

        // every surviving name is findable and in zone, the wildcard count
        // matches the surviving wildcard nodes
        for t in 0..4u8 {
            for i in 0..50u8 {
                let name = Name::from_str(&format!("h{t}-{i}.example.com.")).unwrap();
                let found = zone.find(&name);
                if i % 3 == 0 {
                    assert!(found.map_or(true, |(_, exact)| !exact));
                } else {
                    assert!(found.unwrap().1);
                }
            }
        }
        let wildcard_alive = zone
            .find(&Name::from_str("*.example.com.").unwrap())
            .map_or(false, |(_, exact)| exact);
        assert_eq!(zone.wildcard_count(), u32::from(wildcard_alive));
    }
}
