// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! public key record data for signing zone records

use std::fmt;

use data_encoding::BASE64;

use crate::error::ProtoResult;
use crate::rr::dnssec::Algorithm;
use crate::serialize::binary::{BinEncodable, BinEncoder};

/// [RFC 4034, Resource Records for the DNS Security Extensions, March 2005](https://tools.ietf.org/html/rfc4034#section-2)
///
/// ```text
/// 2.1.  DNSKEY RDATA Wire Format
///
///    The RDATA for a DNSKEY RR consists of a 2 octet Flags Field, a 1
///    octet Protocol Field, a 1 octet Algorithm Field, and the Public Key
///    Field.
///
///                         1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
///     0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |              Flags            |    Protocol   |   Algorithm   |
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    /                                                               /
///    /                            Public Key                         /
///    /                                                               /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Bit 7 of the flags is the Zone Key flag, bit 15 the Secure Entry Point
/// flag of [RFC 3757](https://tools.ietf.org/html/rfc3757), and bit 8 the
/// Revoke flag of [RFC 5011](https://tools.ietf.org/html/rfc5011). The
/// Protocol Field MUST be 3.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct DNSKEY {
    zone_key: bool,
    secure_entry_point: bool,
    revoke: bool,
    algorithm: Algorithm,
    public_key: Vec<u8>,
}

impl DNSKEY {
    /// Constructs a new DNSKEY RData
    ///
    /// # Arguments
    ///
    /// * `zone_key` - this key is used to sign Zone resource records
    /// * `secure_entry_point` - this key is used to sign DNSKeys that sign the Zone records
    /// * `revoke` - this key has been revoked
    /// * `algorithm` - the algorithm of the public key
    /// * `public_key` - the public key material
    pub fn new(
        zone_key: bool,
        secure_entry_point: bool,
        revoke: bool,
        algorithm: Algorithm,
        public_key: Vec<u8>,
    ) -> Self {
        Self {
            zone_key,
            secure_entry_point,
            revoke,
            algorithm,
            public_key,
        }
    }

    /// Returns true if the key is a zone key
    pub fn zone_key(&self) -> bool {
        self.zone_key
    }

    /// Returns true if the key carries the SEP flag, i.e. it is meant to be
    /// used as a key signing key and signs only the keyset
    pub fn secure_entry_point(&self) -> bool {
        self.secure_entry_point
    }

    /// Returns true if the key has been revoked
    pub fn revoke(&self) -> bool {
        self.revoke
    }

    /// Returns the algorithm of the key
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the public key material
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Returns the 16 bit flags field of the wire form
    pub fn flags(&self) -> u16 {
        let mut flags: u16 = 0;
        if self.zone_key {
            flags |= 0b0000_0001_0000_0000;
        }
        if self.secure_entry_point {
            flags |= 0b0000_0000_0000_0001;
        }
        if self.revoke {
            flags |= 0b0000_0000_1000_0000;
        }

        flags
    }

    /// Calculates the key tag of the key per RFC 4034 appendix B, the
    /// ones-complement style checksum over the rdata wire form
    pub fn calculate_key_tag(&self) -> ProtoResult<u16> {
        let bytes = self.to_bytes()?;

        let mut ac: u32 = 0;
        for (i, k) in bytes.iter().enumerate() {
            ac += u32::from(*k) << if i & 0x01 != 0 { 0 } else { 8 };
        }
        ac += ac >> 16;
        Ok((ac & 0xFFFF) as u16)
    }
}

impl BinEncodable for DNSKEY {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> ProtoResult<()> {
        encoder.emit_u16(self.flags())?;
        encoder.emit_u8(3)?; // protocol is always 3, RFC 4034 section 2.1.2
        self.algorithm.emit(encoder)?;
        encoder.emit_vec(&self.public_key)
    }
}

impl fmt::Display for DNSKEY {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{flags} 3 {alg} {key}",
            flags = self.flags(),
            alg = u8::from(self.algorithm),
            key = BASE64.encode(&self.public_key)
        )
    }
}
