// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Extended DNS options

use std::fmt;

use crate::error::{ProtoErrorKind, ProtoResult};
use crate::rr::rdata::opt::{self, EdnsCode, EdnsOption, OPT};
use crate::rr::{DNSClass, Name, RData, Record, RecordType};
use crate::serialize::binary::{BinDecoder, BinEncodable, BinEncoder};

/// Edns implements the higher level concepts for working with extended dns as it is used to create or be
/// created from OPT record data.
///
/// The OPT pseudo record reuses the fixed RR header fields, RFC 6891
/// section 6.1.3: the CLASS carries the requestor's maximum UDP payload
/// size, and the TTL carries the extended RCODE and flags:
///
/// ```text
///                +0 (MSB)                            +1 (LSB)
///     +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
///  0: |         EXTENDED-RCODE        |            VERSION            |
///     +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
///  2: | DO|                           Z                               |
///     +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
/// ```
///
/// The flags word is kept raw so that the accessors touch only their own
/// bits; the Z bits pass through unchanged.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Edns {
    // high 8 bits that make up the 12 bit total field when included with the 4bit rcode from the
    //  header (from TTL)
    rcode_high: u8,
    // Indicates the implementation level of the setter. (from TTL)
    version: u8,
    // DNSSEC OK and Z flags (from TTL)
    flags: u16,
    // max payload size, minimum of 512, (from RR CLASS)
    max_payload: u16,

    options: OPT,
}

impl Default for Edns {
    fn default() -> Self {
        Self {
            rcode_high: 0,
            version: 0,
            flags: 0,
            max_payload: 512,
            options: OPT::default(),
        }
    }
}

impl Edns {
    /// Creates a new extended DNS object
    pub fn new() -> Self {
        Self::default()
    }

    /// The high order bytes for the response code in the DNS Message
    pub fn rcode_high(&self) -> u8 {
        self.rcode_high
    }

    /// Returns the EDNS version
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the value of the DO (DNSSEC OK) bit, bit 15 of the flags
    pub fn dnssec_ok(&self) -> bool {
        self.flags & 0x8000 == 0x8000
    }

    /// Returns the Z flags, of which only the low 15 bits are significant
    pub fn z_flags(&self) -> u16 {
        self.flags & 0x7FFF
    }

    /// Maximum supported size of the DNS payload
    pub fn max_payload(&self) -> u16 {
        self.max_payload
    }

    /// Returns the Option associated with the code
    pub fn option(&self, code: EdnsCode) -> Option<&EdnsOption> {
        self.options.get(code)
    }

    /// Returns the options portion of EDNS
    pub fn options(&self) -> &OPT {
        &self.options
    }

    /// Returns a mutable options portion of EDNS
    pub fn options_mut(&mut self) -> &mut OPT {
        &mut self.options
    }

    /// Set the high order bits for the result code
    pub fn set_rcode_high(&mut self, rcode_high: u8) -> &mut Self {
        self.rcode_high = rcode_high;
        self
    }

    /// Set the EDNS version, touching nothing but the version byte
    pub fn set_version(&mut self, version: u8) -> &mut Self {
        self.version = version;
        self
    }

    /// Set or clear the DO bit, preserving every other bit of the flags
    pub fn set_dnssec_ok(&mut self, dnssec_ok: bool) -> &mut Self {
        if dnssec_ok {
            self.flags |= 0x8000;
        } else {
            self.flags &= !0x8000;
        }
        self
    }

    /// Set the maximum payload which can be supported
    /// From RFC 6891: `Values lower than 512 MUST be treated as equal to 512`
    pub fn set_max_payload(&mut self, max_payload: u16) -> &mut Self {
        self.max_payload = max_payload.max(512);
        self
    }

    /// Returns the TTL field of the pseudo record carrying the extended
    /// RCODE, version and flags
    pub fn ttl(&self) -> u32 {
        u32::from(self.rcode_high) << 24 | u32::from(self.version) << 16 | u32::from(self.flags)
    }

    /// Reads the OPT pseudo record from its wire form
    pub fn read(decoder: &mut BinDecoder<'_>) -> ProtoResult<Self> {
        if decoder.read_u8()? != 0 {
            return Err(ProtoErrorKind::EdnsNameNotRoot.into());
        }
        if RecordType::from(decoder.read_u16()?) != RecordType::OPT {
            return Err("expected an OPT record".into());
        }

        let max_payload = decoder.read_u16()?;
        let ttl = decoder.read_u32()?;
        let rdata_length = decoder.read_u16()?;
        let options = opt::read(decoder, rdata_length)?;

        Ok(Self {
            rcode_high: (ttl >> 24) as u8,
            version: ((ttl >> 16) & 0xFF) as u8,
            flags: (ttl & 0xFFFF) as u16,
            max_payload,
            options,
        })
    }
}

impl<'a> From<&'a Record> for Edns {
    fn from(value: &'a Record) -> Self {
        assert!(value.record_type() == RecordType::OPT);

        let rcode_high = ((value.ttl() & 0xFF00_0000u32) >> 24) as u8;
        let version = ((value.ttl() & 0x00FF_0000u32) >> 16) as u8;
        let flags = (value.ttl() & 0x0000_FFFFu32) as u16;
        let max_payload = u16::from(value.dns_class());

        let options = match value.data() {
            RData::OPT(option_data) => option_data.clone(),
            // no options were carried
            RData::NULL(..) => OPT::default(),
            _ => panic!("rr_type doesn't match the RData: {:?}", value.data()),
        };

        Self {
            rcode_high,
            version,
            flags,
            max_payload,
            options,
        }
    }
}

impl<'a> From<&'a Edns> for Record {
    /// This returns a Resource Record that is formatted for Edns(0)
    fn from(value: &'a Edns) -> Self {
        Self::from_rdata(Name::root(), value.ttl(), RData::OPT(value.options().clone()))
            .set_dns_class(DNSClass::for_opt(value.max_payload()))
    }
}

impl BinEncodable for Edns {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> ProtoResult<()> {
        encoder.emit_u8(0)?; // Name::root
        RecordType::OPT.emit(encoder)?;
        DNSClass::for_opt(self.max_payload()).emit(encoder)?;
        encoder.emit_u32(self.ttl())?;

        // the rdata length covers the concatenated options
        let mut rdata = Vec::new();
        {
            let mut rdata_encoder = BinEncoder::new(&mut rdata);
            self.options.emit(&mut rdata_encoder)?;
        }
        encoder.emit_u16(rdata.len() as u16)?;
        encoder.emit_vec(&rdata)
    }
}

impl fmt::Display for Edns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ";; OPT PSEUDOSECTION:\n; EDNS: version {version}; flags: {flags}; udp: {udp}{opts}",
            version = self.version,
            flags = if self.dnssec_ok() { "do" } else { "" },
            udp = self.max_payload,
            opts = self.options,
        )
    }
}
