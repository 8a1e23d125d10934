// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! delegation signer, pointing to the DNSKEY of a child zone

use std::fmt;

use data_encoding::HEXUPPER;

use crate::error::ProtoResult;
use crate::rr::dnssec::Algorithm;
use crate::serialize::binary::{BinEncodable, BinEncoder};

/// [RFC 4034, Resource Records for the DNS Security Extensions, March 2005](https://tools.ietf.org/html/rfc4034#section-5)
///
/// ```text
/// 5.1.  DS RDATA Wire Format
///
///           The RDATA for a DS RR consists of a 2 octet Key Tag field, a 1 octet
///    Algorithm field, a 1 octet Digest Type field, and a Digest field.
///
///                         1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
///     0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |           Key Tag             |  Algorithm    |  Digest Type  |
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    /                                                               /
///    /                            Digest                             /
///    /                                                               /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct DS {
    key_tag: u16,
    algorithm: Algorithm,
    digest_type: u8,
    digest: Vec<u8>,
}

impl DS {
    /// Constructs a new DS RData
    pub fn new(key_tag: u16, algorithm: Algorithm, digest_type: u8, digest: Vec<u8>) -> Self {
        Self {
            key_tag,
            algorithm,
            digest_type,
            digest,
        }
    }

    /// Returns the key tag of the referenced DNSKEY
    pub fn key_tag(&self) -> u16 {
        self.key_tag
    }

    /// Returns the algorithm of the referenced DNSKEY
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the digest type used to hash the DNSKEY
    pub fn digest_type(&self) -> u8 {
        self.digest_type
    }

    /// Returns the digest of the DNSKEY
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }
}

impl BinEncodable for DS {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> ProtoResult<()> {
        encoder.emit_u16(self.key_tag)?;
        self.algorithm.emit(encoder)?;
        encoder.emit_u8(self.digest_type)?;
        encoder.emit_vec(&self.digest)
    }
}

impl fmt::Display for DS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{tag} {alg} {dt} {digest}",
            tag = self.key_tag,
            alg = u8::from(self.algorithm),
            dt = self.digest_type,
            digest = HEXUPPER.encode(&self.digest)
        )
    }
}
