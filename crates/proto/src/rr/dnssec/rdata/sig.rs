// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! signature record for signing an RRset

use std::fmt;

use data_encoding::BASE64;

use crate::error::ProtoResult;
use crate::rr::dnssec::Algorithm;
use crate::rr::domain::Name;
use crate::rr::RecordType;
use crate::serialize::binary::{BinEncodable, BinEncoder};

/// [RFC 4034, Resource Records for the DNS Security Extensions, March 2005](https://tools.ietf.org/html/rfc4034#section-3)
///
/// ```text
/// 3.1.  RRSIG RDATA Wire Format
///
///    The RDATA for an RRSIG RR consists of a 2 octet Type Covered field, a
///    1 octet Algorithm field, a 1 octet Labels field, a 4 octet Original
///    TTL field, a 4 octet Signature Expiration field, a 4 octet Signature
///    Inception field, a 2 octet Key tag, the Signer's Name field, and the
///    Signature field.
///
///                         1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
///     0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |        Type Covered           |  Algorithm    |     Labels    |
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |                         Original TTL                          |
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |                      Signature Expiration                     |
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |                      Signature Inception                      |
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |            Key Tag            |                               /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+         Signer's Name         /
///    /                                                               /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    /                                                               /
///    /                            Signature                          /
///    /                                                               /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The expiration and inception fields are serial numbers in the sense of
/// RFC 1982, see the `timestamp` module.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SIG {
    type_covered: RecordType,
    algorithm: Algorithm,
    num_labels: u8,
    original_ttl: u32,
    sig_expiration: u32,
    sig_inception: u32,
    key_tag: u16,
    signer_name: Name,
    sig: Vec<u8>,
}

impl SIG {
    /// Constructs a new SIG RData
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        type_covered: RecordType,
        algorithm: Algorithm,
        num_labels: u8,
        original_ttl: u32,
        sig_expiration: u32,
        sig_inception: u32,
        key_tag: u16,
        signer_name: Name,
        sig: Vec<u8>,
    ) -> Self {
        Self {
            type_covered,
            algorithm,
            num_labels,
            original_ttl,
            sig_expiration,
            sig_inception,
            key_tag,
            signer_name,
            sig,
        }
    }

    /// Returns the type of the RRset this signature covers
    pub fn type_covered(&self) -> RecordType {
        self.type_covered
    }

    /// Returns the algorithm the signature was produced with
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the number of labels of the owner, not counting the root or a
    /// leading wildcard
    pub fn num_labels(&self) -> u8 {
        self.num_labels
    }

    /// Returns the TTL of the covered RRset as it appears in the zone
    pub fn original_ttl(&self) -> u32 {
        self.original_ttl
    }

    /// Returns the expiration timestamp, a serial number of seconds since the epoch
    pub fn sig_expiration(&self) -> u32 {
        self.sig_expiration
    }

    /// Returns the inception timestamp, a serial number of seconds since the epoch
    pub fn sig_inception(&self) -> u32 {
        self.sig_inception
    }

    /// Returns the key tag of the key that produced this signature
    pub fn key_tag(&self) -> u16 {
        self.key_tag
    }

    /// Returns the owner name of the DNSKEY that produced this signature
    pub fn signer_name(&self) -> &Name {
        &self.signer_name
    }

    /// Returns the signature bytes
    pub fn sig(&self) -> &[u8] {
        &self.sig
    }

    /// Returns the SIG with the signature bytes replaced
    pub fn set_sig(mut self, sig: Vec<u8>) -> Self {
        self.sig = sig;
        self
    }
}

/// Emits the rdata fields preceding the signature itself, which is the
/// `RRSIG_RDATA` prefix of the to-be-signed data of RFC 4034 section 3.1.8.1
#[allow(clippy::too_many_arguments)]
pub(crate) fn emit_pre_sig(
    encoder: &mut BinEncoder<'_>,
    type_covered: RecordType,
    algorithm: Algorithm,
    num_labels: u8,
    original_ttl: u32,
    sig_expiration: u32,
    sig_inception: u32,
    key_tag: u16,
    signer_name: &Name,
) -> ProtoResult<()> {
    type_covered.emit(encoder)?;
    algorithm.emit(encoder)?;
    encoder.emit_u8(num_labels)?;
    encoder.emit_u32(original_ttl)?;
    encoder.emit_u32(sig_expiration)?;
    encoder.emit_u32(sig_inception)?;
    encoder.emit_u16(key_tag)?;
    signer_name.emit_as_canonical(encoder, true)
}

impl BinEncodable for SIG {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> ProtoResult<()> {
        emit_pre_sig(
            encoder,
            self.type_covered,
            self.algorithm,
            self.num_labels,
            self.original_ttl,
            self.sig_expiration,
            self.sig_inception,
            self.key_tag,
            &self.signer_name,
        )?;
        encoder.emit_vec(&self.sig)
    }
}

impl fmt::Display for SIG {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ty} {alg} {labels} {ttl} {exp} {inc} {tag} {signer} {sig}",
            ty = self.type_covered,
            alg = u8::from(self.algorithm),
            labels = self.num_labels,
            ttl = self.original_ttl,
            exp = self.sig_expiration,
            inc = self.sig_inception,
            tag = self.key_tag,
            signer = self.signer_name,
            sig = BASE64.encode(&self.sig)
        )
    }
}
