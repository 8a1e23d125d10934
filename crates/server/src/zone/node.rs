// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! a single owner name of a zone, with its RRsets and signatures

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockWriteGuard};

use shellbark_proto::rr::{Name, RData, Record, RecordType};

/// All the records of a zone sharing one owner name.
///
/// RRs are grouped into RRsets by type; RRSIGs are kept apart from the data
/// they cover, keyed by the covered type. The node carries its own
/// reader-writer lock so that content edits on different nodes do not
/// serialize on the zone lock; tree traversal does not take this lock.
pub struct ZoneNode {
    name: Name,
    inner: RwLock<NodeInner>,
}

/// The lock protected content of a node
#[derive(Default)]
pub(crate) struct NodeInner {
    /// RRsets by record type, insertion ordered within a set
    pub(crate) rrs: BTreeMap<RecordType, Vec<Arc<Record>>>,
    /// RRSIGs by the type they cover
    pub(crate) sigs: BTreeMap<RecordType, Vec<Arc<Record>>>,
    /// Set when this node is a delegation point, i.e. it holds an NS RRset
    /// and is not the apex. Only DS and NSEC are signed here.
    pub(crate) non_auth: bool,
}

impl ZoneNode {
    pub(crate) fn new(name: Name) -> Self {
        Self {
            name,
            inner: RwLock::new(NodeInner::default()),
        }
    }

    /// Returns the owner name of this node
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns true when this node is a delegation point
    pub fn is_non_auth(&self) -> bool {
        self.inner.read().non_auth
    }

    /// Returns a copy of the RRset of the given type
    pub fn records(&self, record_type: RecordType) -> Vec<Arc<Record>> {
        self.inner
            .read()
            .rrs
            .get(&record_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns a copy of the RRSIGs covering the given type
    pub fn signatures(&self, type_covered: RecordType) -> Vec<Arc<Record>> {
        self.inner
            .read()
            .sigs
            .get(&type_covered)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the types present at this node, in type code order
    pub fn record_types(&self) -> Vec<RecordType> {
        self.inner.read().rrs.keys().copied().collect()
    }

    /// Returns true when the node holds neither records nor signatures
    pub fn is_empty(&self) -> bool {
        let inner = self.inner.read();
        inner.rrs.is_empty() && inner.sigs.is_empty()
    }

    /// Returns the minimum TTL of the SOA at this node, if there is one
    pub(crate) fn soa_minimum(&self) -> Option<u32> {
        let inner = self.inner.read();
        inner
            .rrs
            .get(&RecordType::SOA)
            .and_then(|rrset| rrset.first())
            .and_then(|rr| rr.data().as_soa())
            .map(|soa| soa.minimum())
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, NodeInner> {
        self.inner.write()
    }

    /// Attaches a record to this node.
    ///
    /// RRSIGs land in the signature map under the type they cover; anything
    /// else is appended to its RRset. An NS set at other than the apex marks
    /// the node as a delegation point, which `delegation` conveys.
    pub(crate) fn insert(&self, rr: Arc<Record>, delegation: bool) {
        let covered = match rr.data() {
            RData::RRSIG(sig) => Some(sig.type_covered()),
            _ => None,
        };

        let mut inner = self.inner.write();
        match covered {
            Some(type_covered) => {
                inner.sigs.entry(type_covered).or_default().push(rr);
            }
            None => {
                if delegation {
                    inner.non_auth = true;
                }
                inner.rrs.entry(rr.record_type()).or_default().push(rr);
            }
        }
    }

    /// Detaches the record if the very same record, by pointer, is attached.
    ///
    /// Duplicate inserts produce duplicate entries; each call removes at
    /// most one. Returns true if a record was removed.
    pub(crate) fn remove(&self, rr: &Arc<Record>) -> bool {
        let mut inner = self.inner.write();
        let (map, key) = match rr.data() {
            RData::RRSIG(sig) => (&mut inner.sigs, sig.type_covered()),
            _ => (&mut inner.rrs, rr.record_type()),
        };

        let Some(rrset) = map.get_mut(&key) else {
            return false;
        };
        let Some(at) = rrset.iter().position(|held| Arc::ptr_eq(held, rr)) else {
            return false;
        };

        rrset.remove(at);
        if rrset.is_empty() {
            map.remove(&key);
        }
        true
    }

    /// Clears the RRset of the given type; clearing RRSIG drops every
    /// signature at the node
    pub(crate) fn clear_rrset(&self, record_type: RecordType) -> bool {
        let mut inner = self.inner.write();
        if record_type == RecordType::RRSIG {
            let had = !inner.sigs.is_empty();
            inner.sigs.clear();
            had
        } else {
            inner.rrs.remove(&record_type).is_some()
        }
    }
}

impl fmt::Display for ZoneNode {
    /// Formats the node in the canonical print order: the SOA and its
    /// signatures first, then the other RRsets each followed by their
    /// signatures, the NSEC and its signatures last
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();

        let write_rrset = |f: &mut fmt::Formatter<'_>, rt: RecordType| -> fmt::Result {
            if let Some(rrset) = inner.rrs.get(&rt) {
                for rr in rrset {
                    writeln!(f, "{rr}")?;
                }
                if let Some(sigs) = inner.sigs.get(&rt) {
                    for sig in sigs {
                        writeln!(f, "{sig}")?;
                    }
                }
            }
            Ok(())
        };

        write_rrset(f, RecordType::SOA)?;
        for rt in inner.rrs.keys() {
            if *rt == RecordType::SOA || *rt == RecordType::NSEC {
                continue;
            }
            write_rrset(f, *rt)?;
        }
        write_rrset(f, RecordType::NSEC)
    }
}
