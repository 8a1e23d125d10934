// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! negative cache proof for non-existence of a record or name

use std::fmt;

use crate::error::ProtoResult;
use crate::rr::domain::Name;
use crate::rr::type_bit_map::emit_type_bit_maps;
use crate::rr::RecordType;
use crate::serialize::binary::{BinEncodable, BinEncoder};

/// [RFC 4034, Resource Records for the DNS Security Extensions, March 2005](https://tools.ietf.org/html/rfc4034#section-4)
///
/// ```text
/// 4.1.  NSEC RDATA Wire Format
///
///  The RDATA of the NSEC RR is as shown below:
///
///                       1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
///   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///  /                      Next Domain Name                         /
///  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///  /                       Type Bit Maps                           /
///  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The NSEC chains each owner name of the zone to its in-order successor and
/// carries the bitmap of the types present at the owner.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NSEC {
    next_domain_name: Name,
    type_bit_maps: Vec<RecordType>,
}

impl NSEC {
    /// Constructs a new NSEC RData.
    ///
    /// The bitmap is stored as given; callers that build chains are expected
    /// to pass the types in their type code order.
    pub fn new(next_domain_name: Name, type_bit_maps: Vec<RecordType>) -> Self {
        Self {
            next_domain_name,
            type_bit_maps,
        }
    }

    /// Returns the next owner name in the canonical ordering of the zone
    pub fn next_domain_name(&self) -> &Name {
        &self.next_domain_name
    }

    /// Returns the types present at the owner name of this record
    pub fn type_bit_maps(&self) -> &[RecordType] {
        &self.type_bit_maps
    }
}

impl BinEncodable for NSEC {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> ProtoResult<()> {
        // RFC 6840 section 5.1: the next domain name is not subject to the
        // canonical lowercasing of names inside rdata
        self.next_domain_name.emit_as_canonical(encoder, false)?;
        emit_type_bit_maps(encoder, &self.type_bit_maps)
    }
}

impl fmt::Display for NSEC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.next_domain_name)?;
        for rr_type in &self.type_bit_maps {
            write!(f, " {rr_type}")?;
        }
        Ok(())
    }
}
