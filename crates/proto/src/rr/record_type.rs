// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! record type definitions

#![allow(clippy::use_self)]

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde-config")]
use serde::{Deserialize, Serialize};

use crate::error::{ProtoError, ProtoResult};
use crate::serialize::binary::{BinEncodable, BinEncoder};

/// The type of the resource record.
///
/// This specifies the type of data in the RData field of the Resource Record
#[cfg_attr(feature = "serde-config", derive(Deserialize, Serialize))]
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
#[non_exhaustive]
pub enum RecordType {
    /// [RFC 1035](https://tools.ietf.org/html/rfc1035) IPv4 Address record
    A,
    /// [RFC 3596](https://tools.ietf.org/html/rfc3596) IPv6 address record
    AAAA,
    /// [RFC 1035](https://tools.ietf.org/html/rfc1035) All cached records, aka ANY
    ANY,
    /// [RFC 1035](https://tools.ietf.org/html/rfc1035) Authoritative Zone Transfer
    AXFR,
    /// [RFC 1035](https://tools.ietf.org/html/rfc1035) Canonical name record
    CNAME,
    /// [RFC 4034](https://tools.ietf.org/html/rfc4034) DNS Key record
    DNSKEY,
    /// [RFC 4034](https://tools.ietf.org/html/rfc4034) Delegation signer
    DS,
    /// [RFC 1035](https://tools.ietf.org/html/rfc1035) Mail exchange record
    MX,
    /// [RFC 1035](https://tools.ietf.org/html/rfc1035) Name server record
    NS,
    /// [RFC 4034](https://tools.ietf.org/html/rfc4034) Next secure record
    NSEC,
    /// [RFC 1035](https://tools.ietf.org/html/rfc1035) Null server record, for testing
    NULL,
    /// [RFC 6891](https://tools.ietf.org/html/rfc6891) Option record
    OPT,
    /// [RFC 1035](https://tools.ietf.org/html/rfc1035) Pointer record
    PTR,
    /// [RFC 4034](https://tools.ietf.org/html/rfc4034) DNSSEC signature
    RRSIG,
    /// [RFC 1035](https://tools.ietf.org/html/rfc1035) and [RFC 2308](https://tools.ietf.org/html/rfc2308) Start of authority record
    SOA,
    /// [RFC 2782](https://tools.ietf.org/html/rfc2782) Service locator
    SRV,
    /// [RFC 1035](https://tools.ietf.org/html/rfc1035) Text record
    TXT,
    /// A 0 TYPE, see RFC 8145 for Zero usage
    ZERO,
    /// Unknown Record type, or unsupported
    Unknown(u16),
}

impl RecordType {
    /// Returns true if this is one of the DNSSEC record types
    pub fn is_dnssec(self) -> bool {
        matches!(self, Self::DNSKEY | Self::DS | Self::NSEC | Self::RRSIG)
    }
}

impl From<u16> for RecordType {
    /// Convert from `u16` to `RecordType`
    fn from(value: u16) -> Self {
        match value {
            1 => Self::A,
            28 => Self::AAAA,
            255 => Self::ANY,
            252 => Self::AXFR,
            5 => Self::CNAME,
            48 => Self::DNSKEY,
            43 => Self::DS,
            15 => Self::MX,
            2 => Self::NS,
            47 => Self::NSEC,
            10 => Self::NULL,
            41 => Self::OPT,
            12 => Self::PTR,
            46 => Self::RRSIG,
            6 => Self::SOA,
            33 => Self::SRV,
            16 => Self::TXT,
            0 => Self::ZERO,
            _ => Self::Unknown(value),
        }
    }
}

impl From<RecordType> for u16 {
    /// Convert from `RecordType` to `u16`
    fn from(rt: RecordType) -> Self {
        match rt {
            RecordType::A => 1,
            RecordType::AAAA => 28,
            RecordType::ANY => 255,
            RecordType::AXFR => 252,
            RecordType::CNAME => 5,
            RecordType::DNSKEY => 48,
            RecordType::DS => 43,
            RecordType::MX => 15,
            RecordType::NS => 2,
            RecordType::NSEC => 47,
            RecordType::NULL => 10,
            RecordType::OPT => 41,
            RecordType::PTR => 12,
            RecordType::RRSIG => 46,
            RecordType::SOA => 6,
            RecordType::SRV => 33,
            RecordType::TXT => 16,
            RecordType::ZERO => 0,
            RecordType::Unknown(value) => value,
        }
    }
}

impl FromStr for RecordType {
    type Err = ProtoError;

    fn from_str(str: &str) -> ProtoResult<Self> {
        match str {
            "A" => Ok(Self::A),
            "AAAA" => Ok(Self::AAAA),
            "ANY" => Ok(Self::ANY),
            "AXFR" => Ok(Self::AXFR),
            "CNAME" => Ok(Self::CNAME),
            "DNSKEY" => Ok(Self::DNSKEY),
            "DS" => Ok(Self::DS),
            "MX" => Ok(Self::MX),
            "NS" => Ok(Self::NS),
            "NSEC" => Ok(Self::NSEC),
            "NULL" => Ok(Self::NULL),
            "OPT" => Ok(Self::OPT),
            "PTR" => Ok(Self::PTR),
            "RRSIG" => Ok(Self::RRSIG),
            "SOA" => Ok(Self::SOA),
            "SRV" => Ok(Self::SRV),
            "TXT" => Ok(Self::TXT),
            _ => Err(format!("unrecognized record type: {str}").into()),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::A => f.write_str("A"),
            Self::AAAA => f.write_str("AAAA"),
            Self::ANY => f.write_str("ANY"),
            Self::AXFR => f.write_str("AXFR"),
            Self::CNAME => f.write_str("CNAME"),
            Self::DNSKEY => f.write_str("DNSKEY"),
            Self::DS => f.write_str("DS"),
            Self::MX => f.write_str("MX"),
            Self::NS => f.write_str("NS"),
            Self::NSEC => f.write_str("NSEC"),
            Self::NULL => f.write_str("NULL"),
            Self::OPT => f.write_str("OPT"),
            Self::PTR => f.write_str("PTR"),
            Self::RRSIG => f.write_str("RRSIG"),
            Self::SOA => f.write_str("SOA"),
            Self::SRV => f.write_str("SRV"),
            Self::TXT => f.write_str("TXT"),
            Self::ZERO => f.write_str("ZERO"),
            Self::Unknown(code) => write!(f, "TYPE{code}"),
        }
    }
}

/// Record types order by their type code, which is what the NSEC type bitmap
/// and the canonical RRset forms require
impl PartialOrd for RecordType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecordType {
    fn cmp(&self, other: &Self) -> Ordering {
        u16::from(*self).cmp(&u16::from(*other))
    }
}

impl BinEncodable for RecordType {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> ProtoResult<()> {
        encoder.emit_u16((*self).into())
    }
}
