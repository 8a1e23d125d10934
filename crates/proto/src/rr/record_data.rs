// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! record data enum variants for all valid DNS data types

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use enum_as_inner::EnumAsInner;

use crate::error::ProtoResult;
use crate::rr::dnssec::rdata::{DNSKEY, DS, NSEC, SIG};
use crate::rr::domain::Name;
use crate::rr::rdata::{OPT, SOA, TXT};
use crate::rr::RecordType;
use crate::serialize::binary::{BinEncodable, BinEncoder};

/// Record data enum variants.
///
/// This library carries only the record types its zone store and signer
/// need; everything else travels as [`RData::NULL`], opaque rdata bytes.
/// Wire *parsing* of general records is out of scope, but every variant can
/// emit the uncompressed canonical form required for DNSSEC signing: the
/// types of RFC 4034 section 6.2 have the names embedded in their rdata
/// lowercased when the encoder is in canonical mode.
#[derive(Debug, EnumAsInner, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum RData {
    /// IPv4 address
    A(Ipv4Addr),
    /// IPv6 address
    AAAA(Ipv6Addr),
    /// Alias to another name
    CNAME(Name),
    /// Public key for DNSSEC signatures
    DNSKEY(DNSKEY),
    /// Delegation signer for a child zone
    DS(DS),
    /// Delegation to an authoritative name server
    NS(Name),
    /// Authenticated denial of existence
    NSEC(NSEC),
    /// Opaque data, or a record type this library does not model
    NULL(Vec<u8>),
    /// EDNS options of the OPT pseudo record
    OPT(OPT),
    /// Reverse mapping pointer
    PTR(Name),
    /// Signature over an RRset
    RRSIG(SIG),
    /// Start of authority
    SOA(SOA),
    /// Free form text
    TXT(TXT),
}

impl RData {
    /// Returns the record type matching this data
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::A(..) => RecordType::A,
            Self::AAAA(..) => RecordType::AAAA,
            Self::CNAME(..) => RecordType::CNAME,
            Self::DNSKEY(..) => RecordType::DNSKEY,
            Self::DS(..) => RecordType::DS,
            Self::NS(..) => RecordType::NS,
            Self::NSEC(..) => RecordType::NSEC,
            Self::NULL(..) => RecordType::NULL,
            Self::OPT(..) => RecordType::OPT,
            Self::PTR(..) => RecordType::PTR,
            Self::RRSIG(..) => RecordType::RRSIG,
            Self::SOA(..) => RecordType::SOA,
            Self::TXT(..) => RecordType::TXT,
        }
    }
}

impl BinEncodable for RData {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> ProtoResult<()> {
        match self {
            Self::A(address) => encoder.emit_vec(&address.octets()),
            Self::AAAA(address) => encoder.emit_vec(&address.octets()),
            // CNAME, NS and PTR rdata names are lowercased in canonical form,
            // RFC 4034 section 6.2
            Self::CNAME(name) | Self::NS(name) | Self::PTR(name) => name.emit(encoder),
            Self::DNSKEY(dnskey) => dnskey.emit(encoder),
            Self::DS(ds) => ds.emit(encoder),
            Self::NSEC(nsec) => nsec.emit(encoder),
            Self::NULL(data) => encoder.emit_vec(data),
            Self::OPT(opt) => opt.emit(encoder),
            Self::RRSIG(sig) => sig.emit(encoder),
            Self::SOA(soa) => soa.emit(encoder),
            Self::TXT(txt) => txt.emit(encoder),
        }
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A(address) => write!(f, "{address}"),
            Self::AAAA(address) => write!(f, "{address}"),
            Self::CNAME(name) | Self::NS(name) | Self::PTR(name) => write!(f, "{name}"),
            Self::DNSKEY(dnskey) => write!(f, "{dnskey}"),
            Self::DS(ds) => write!(f, "{ds}"),
            Self::NSEC(nsec) => write!(f, "{nsec}"),
            Self::NULL(data) => write!(f, "\\# {} bytes", data.len()),
            Self::OPT(opt) => write!(f, "{opt}"),
            Self::RRSIG(sig) => write!(f, "{sig}"),
            Self::SOA(soa) => write!(f, "{soa}"),
            Self::TXT(txt) => write!(f, "{txt}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_record_type_matches_variant() {
        assert_eq!(
            RData::A(Ipv4Addr::new(1, 2, 3, 4)).record_type(),
            RecordType::A
        );
        assert_eq!(
            RData::NS(Name::from_str("ns1.example.com.").unwrap()).record_type(),
            RecordType::NS
        );
    }

    #[test]
    fn test_canonical_emit_lowercases_rdata_names() {
        let rdata = RData::NS(Name::from_str("NS1.Example.COM.").unwrap());

        let mut bytes = Vec::new();
        let mut encoder = BinEncoder::new(&mut bytes);
        encoder.set_canonical_names(true);
        rdata.emit(&mut encoder).unwrap();
        assert_eq!(bytes, b"\x03ns1\x07example\x03com\x00");
    }

    #[test]
    fn test_a_emit() {
        let rdata = RData::A(Ipv4Addr::new(192, 0, 2, 1));
        assert_eq!(rdata.to_bytes().unwrap(), vec![192, 0, 2, 1]);
    }
}
