// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! option record for passing protocol options between the client and server
#![allow(clippy::use_self)]

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use data_encoding::HEXLOWER;
use tracing::{debug, warn};

use crate::error::{ProtoErrorKind, ProtoResult};
use crate::serialize::binary::{BinDecoder, BinEncodable, BinEncoder};

/// The OPT record type is used for ExtendedDNS records.
///
/// [RFC 6891, EDNS(0) Extensions, April 2013](https://tools.ietf.org/html/rfc6891#section-6)
///
/// ```text
/// 6.1.2.  Wire Format
///
///    An OPT RR has a fixed part and a variable set of options expressed as
///    {attribute, value} pairs.  The fixed part holds some DNS metadata,
///    and also a small collection of basic extension elements that we
///    expect to be so popular that it would be a waste of wire space to
///    encode them as {attribute, value} pairs.
///
///    The variable part of an OPT RR may contain zero or more options in
///    the RDATA.  Each option MUST be treated as a bit field.  Each option
///    is encoded as:
///
///                   +0 (MSB)                            +1 (LSB)
///        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
///     0: |                          OPTION-CODE                          |
///        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
///     2: |                         OPTION-LENGTH                         |
///        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
///     4: |                                                               |
///        /                          OPTION-DATA                          /
///        /                                                               /
///        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
/// ```
///
/// The options are kept in wire order so that decoding and re-encoding an
/// OPT is byte identical, including options this library does not know.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct OPT {
    options: Vec<EdnsOption>,
}

impl OPT {
    /// Creates a new OPT record data from the ordered option list
    pub fn new(options: Vec<EdnsOption>) -> Self {
        Self { options }
    }

    /// Returns the options in wire order
    pub fn options(&self) -> &[EdnsOption] {
        &self.options
    }

    /// Appends an option to the end of the list
    pub fn push(&mut self, option: EdnsOption) {
        self.options.push(option);
    }

    /// Returns the first option with the given code
    pub fn get(&self, code: EdnsCode) -> Option<&EdnsOption> {
        self.options.iter().find(|o| o.code() == code)
    }

    /// Returns the number of options
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns true if there are no options
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Read the OPT rdata, i.e. the option list, from the decoder
pub fn read(decoder: &mut BinDecoder<'_>, rdata_length: u16) -> ProtoResult<OPT> {
    let start = decoder.index();
    let rdata_length = usize::from(rdata_length);
    let mut options = Vec::new();

    while decoder.index() - start < rdata_length {
        let code = EdnsCode::from(decoder.read_u16()?);
        let length = usize::from(decoder.read_u16()?);
        if decoder.index() + length > start + rdata_length {
            warn!("incomplete or poorly formatted EDNS option: {code:?}");
            return Err("OPT option length exceeds rdata length".into());
        }
        let data = decoder.read_slice(length)?;
        options.push(EdnsOption::read(code, data)?);
    }

    Ok(OPT::new(options))
}

impl BinEncodable for OPT {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> ProtoResult<()> {
        for option in &self.options {
            encoder.emit_u16(option.code().into())?;
            encoder.emit_u16(option.len())?;
            option.emit(encoder)?;
        }
        Ok(())
    }
}

impl fmt::Display for OPT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for option in &self.options {
            write!(f, "\n; {option}")?;
        }
        Ok(())
    }
}

/// The code of the EDNS data option
#[derive(Hash, Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EdnsCode {
    /// [RFC 8764, Apple's Long-Lived Queries](https://tools.ietf.org/html/rfc8764)
    LLQ,

    /// [Update Lease, draft-sekar-dns-ul](http://files.dns-sd.org/draft-sekar-dns-ul.txt)
    UL,

    /// [RFC 5001, NSID](https://tools.ietf.org/html/rfc5001)
    NSID,

    /// [Client Subnet, draft-vandergaast-edns-client-subnet](https://tools.ietf.org/html/draft-vandergaast-edns-client-subnet-02)
    Subnet,

    /// Unknown, used to deal with unknown or unsupported codes
    Unknown(u16),
}

impl From<u16> for EdnsCode {
    fn from(value: u16) -> Self {
        match value {
            1 => Self::LLQ,
            2 => Self::UL,
            3 => Self::NSID,
            0x50fa => Self::Subnet,
            _ => Self::Unknown(value),
        }
    }
}

impl From<EdnsCode> for u16 {
    fn from(value: EdnsCode) -> Self {
        match value {
            EdnsCode::LLQ => 1,
            EdnsCode::UL => 2,
            EdnsCode::NSID => 3,
            EdnsCode::Subnet => 0x50fa,
            EdnsCode::Unknown(value) => value,
        }
    }
}

/// options used to pass information about capabilities between client and server
///
/// <http://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-13>
#[derive(Debug, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum EdnsOption {
    /// Long-Lived Query, the setup and lease management of push style queries
    LLQ(LLQ),

    /// Update lease in seconds, for dynamic update entries that should expire
    UL(u32),

    /// Name server identifier, opaque octets identifying the responding server
    NSID(Vec<u8>),

    /// Client subnet, the network the query originated from
    Subnet(ClientSubnet),

    /// Unknown, used to deal with unknown or unsupported codes
    Unknown(u16, Vec<u8>),
}

impl EdnsOption {
    /// Returns the option code for this option
    pub fn code(&self) -> EdnsCode {
        match self {
            Self::LLQ(..) => EdnsCode::LLQ,
            Self::UL(..) => EdnsCode::UL,
            Self::NSID(..) => EdnsCode::NSID,
            Self::Subnet(..) => EdnsCode::Subnet,
            Self::Unknown(code, ..) => EdnsCode::Unknown(*code),
        }
    }

    /// Returns the length in bytes of the option data
    pub fn len(&self) -> u16 {
        match self {
            Self::LLQ(..) => 18,
            Self::UL(..) => 4,
            Self::NSID(data) => data.len() as u16,
            Self::Subnet(subnet) => subnet.len(),
            Self::Unknown(_, data) => data.len() as u16,
        }
    }

    /// Returns true if the option data is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parses the option data for the given code.
    ///
    /// Unknown codes are preserved as opaque bytes so that re-encoding is
    /// byte identical.
    pub fn read(code: EdnsCode, data: &[u8]) -> ProtoResult<Self> {
        match code {
            EdnsCode::LLQ => Ok(Self::LLQ(LLQ::from_bytes(data)?)),
            EdnsCode::UL => {
                let mut decoder = BinDecoder::new(data);
                let lease = decoder.read_u32()?;
                if !decoder.is_empty() {
                    return Err("trailing bytes in update lease option".into());
                }
                Ok(Self::UL(lease))
            }
            EdnsCode::NSID => Ok(Self::NSID(data.to_vec())),
            EdnsCode::Subnet => Ok(Self::Subnet(ClientSubnet::from_bytes(data)?)),
            EdnsCode::Unknown(code) => Ok(Self::Unknown(code, data.to_vec())),
        }
    }
}

impl BinEncodable for EdnsOption {
    /// Emits only the option data, the code and length prefix are emitted by
    /// the containing OPT
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> ProtoResult<()> {
        match self {
            Self::LLQ(llq) => llq.emit(encoder),
            Self::UL(lease) => encoder.emit_u32(*lease),
            Self::NSID(data) => encoder.emit_vec(data),
            Self::Subnet(subnet) => subnet.emit(encoder),
            Self::Unknown(_, data) => encoder.emit_vec(data),
        }
    }
}

impl fmt::Display for EdnsOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LLQ(llq) => write!(f, "LLQ: {llq}"),
            Self::UL(lease) => write!(f, "LEASE: {lease}"),
            Self::NSID(data) => write!(f, "NSID: {}", HEXLOWER.encode(data)),
            Self::Subnet(subnet) => write!(f, "SUBNET: {subnet}"),
            Self::Unknown(code, data) => write!(f, "OPT{code}: {}", HEXLOWER.encode(data)),
        }
    }
}

/// Long-Lived Query option data.
///
/// ```text
/// Field Name       Field Type     Description
/// ---------------------------------------------------------------------
/// VERSION          u_int16_t      Version of LLQ protocol implemented
/// LLQ-OPCODE       u_int16_t      Identifies LLQ operation
/// ERROR-CODE       u_int16_t      Identifies LLQ errors
/// LLQ-ID           u_int64_t      Identifier for an LLQ
/// LEASE-LIFE       u_int32_t      Requested or granted life of LLQ, in seconds
/// ```
#[derive(Debug, Default, PartialEq, Eq, Hash, Copy, Clone)]
pub struct LLQ {
    /// Version of the LLQ protocol implemented
    pub version: u16,
    /// The operation being performed
    pub opcode: u16,
    /// An error code, zero on requests
    pub error_code: u16,
    /// The identifier for this long lived query
    pub id: u64,
    /// Requested or granted life of the query, in seconds
    pub lease_life: u32,
}

impl LLQ {
    /// Parses the 18 octet option data
    pub fn from_bytes(data: &[u8]) -> ProtoResult<Self> {
        if data.len() != 18 {
            return Err("LLQ option data must be 18 octets".into());
        }
        let mut decoder = BinDecoder::new(data);
        Ok(Self {
            version: decoder.read_u16()?,
            opcode: decoder.read_u16()?,
            error_code: decoder.read_u16()?,
            id: decoder.read_u64()?,
            lease_life: decoder.read_u32()?,
        })
    }
}

impl BinEncodable for LLQ {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> ProtoResult<()> {
        encoder.emit_u16(self.version)?;
        encoder.emit_u16(self.opcode)?;
        encoder.emit_u16(self.error_code)?;
        encoder.emit_u64(self.id)?;
        encoder.emit_u32(self.lease_life)
    }
}

impl fmt::Display for LLQ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({} {} {} {} {})",
            self.version, self.opcode, self.error_code, self.id, self.lease_life
        )
    }
}

/// Client subnet option data, giving the responder an idea of the network the
/// query originated from.
///
/// ```text
///              +0 (MSB)                            +1 (LSB)
///   +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
///  0: |                          FAMILY                               |
///   +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
///  2: |     SOURCE NETMASK        |         SCOPE NETMASK            |
///   +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
///  4: |                           ADDRESS...                         /
///   +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
/// ```
///
/// The address is emitted at the full width of the family, with the bits
/// beyond the source netmask zeroed.
#[derive(Debug, Default, PartialEq, Eq, Hash, Copy, Clone)]
pub struct ClientSubnet {
    /// The address family, 1 for IPv4 and 2 for IPv6
    pub family: u16,
    /// The number of significant bits of the address
    pub source_netmask: u8,
    /// The number of bits the responder covered with its answer, zero on queries
    pub scope_netmask: u8,
    /// The client address, absent when the payload length did not match the family
    pub address: Option<IpAddr>,
}

impl ClientSubnet {
    /// Returns the emitted length of the option data
    pub fn len(&self) -> u16 {
        match self.family {
            2 => 4 + 16,
            _ => 4 + 4,
        }
    }

    /// Returns true if the option data would be empty, which it never is
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Parses the option data.
    ///
    /// At least the family and the two netmasks must be present. The address
    /// is only taken when the payload is at the full width of the family,
    /// otherwise it is left unset.
    pub fn from_bytes(data: &[u8]) -> ProtoResult<Self> {
        if data.len() < 8 {
            return Err("client subnet option data must be at least 8 octets".into());
        }
        let mut decoder = BinDecoder::new(data);
        let family = decoder.read_u16()?;
        let source_netmask = decoder.read_u8()?;
        let scope_netmask = decoder.read_u8()?;

        let address = match family {
            1 if data.len() == 8 => {
                let octets: [u8; 4] = decoder.read_slice(4)?.try_into().expect("4 bytes");
                Some(IpAddr::V4(Ipv4Addr::from(octets)))
            }
            2 if data.len() == 20 => {
                let octets: [u8; 16] = decoder.read_slice(16)?.try_into().expect("16 bytes");
                Some(IpAddr::V6(Ipv6Addr::from(octets)))
            }
            _ => {
                debug!(
                    "client subnet family {family} with {} address octets, leaving address unset",
                    data.len() - 4
                );
                None
            }
        };

        Ok(Self {
            family,
            source_netmask,
            scope_netmask,
            address,
        })
    }
}

/// Zeroes the bits of the address beyond the netmask
fn mask_address(octets: &mut [u8], netmask: u8) {
    let bits = usize::from(netmask);
    for (i, octet) in octets.iter_mut().enumerate() {
        if bits >= (i + 1) * 8 {
            continue;
        } else if bits <= i * 8 {
            *octet = 0;
        } else {
            let keep = (bits - i * 8) as u32;
            *octet &= 0xFFu8 << (8 - keep);
        }
    }
}

impl BinEncodable for ClientSubnet {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> ProtoResult<()> {
        encoder.emit_u16(self.family)?;
        encoder.emit_u8(self.source_netmask)?;
        encoder.emit_u8(self.scope_netmask)?;

        match self.family {
            1 => {
                if self.source_netmask > 32 {
                    return Err(ProtoErrorKind::BadNetmask {
                        family: self.family,
                        netmask: self.source_netmask,
                    }
                    .into());
                }
                let mut octets = match self.address {
                    Some(IpAddr::V4(ip)) => ip.octets(),
                    None => [0u8; 4],
                    Some(IpAddr::V6(_)) => {
                        return Err("client subnet address does not match family".into())
                    }
                };
                mask_address(&mut octets, self.source_netmask);
                encoder.emit_vec(&octets)
            }
            2 => {
                if self.source_netmask > 128 {
                    return Err(ProtoErrorKind::BadNetmask {
                        family: self.family,
                        netmask: self.source_netmask,
                    }
                    .into());
                }
                let mut octets = match self.address {
                    Some(IpAddr::V6(ip)) => ip.octets(),
                    None => [0u8; 16],
                    Some(IpAddr::V4(_)) => {
                        return Err("client subnet address does not match family".into())
                    }
                };
                mask_address(&mut octets, self.source_netmask);
                encoder.emit_vec(&octets)
            }
            family => Err(ProtoErrorKind::BadFamily(family).into()),
        }
    }
}

impl fmt::Display for ClientSubnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address {
            Some(IpAddr::V4(ip)) => write!(f, "{ip}")?,
            // brackets to keep the netmasks readable, as in a socket address
            Some(IpAddr::V6(ip)) => write!(f, "[{ip}]")?,
            None => f.write_str("<nil>")?,
        }
        write!(f, "/{}/{}", self.source_netmask, self.scope_netmask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_pack_masks_address() {
        // family 1, /24, scope 0, 192.0.2.77 becomes 192.0.2.0 on the wire
        let subnet = ClientSubnet {
            family: 1,
            source_netmask: 24,
            scope_netmask: 0,
            address: Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 77))),
        };

        let bytes = subnet.to_bytes().unwrap();
        assert_eq!(bytes, vec![0x00, 0x01, 0x18, 0x00, 0xC0, 0x00, 0x02, 0x00]);

        let parsed = ClientSubnet::from_bytes(&bytes).unwrap();
        assert_eq!(
            parsed,
            ClientSubnet {
                family: 1,
                source_netmask: 24,
                scope_netmask: 0,
                address: Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 0))),
            }
        );
    }

    #[test]
    fn test_subnet_bad_netmask_and_family() {
        let subnet = ClientSubnet {
            family: 1,
            source_netmask: 33,
            scope_netmask: 0,
            address: None,
        };
        assert!(matches!(
            subnet.to_bytes().unwrap_err().kind(),
            ProtoErrorKind::BadNetmask { family: 1, netmask: 33 }
        ));

        let subnet = ClientSubnet {
            family: 3,
            source_netmask: 0,
            scope_netmask: 0,
            address: None,
        };
        assert!(matches!(
            subnet.to_bytes().unwrap_err().kind(),
            ProtoErrorKind::BadFamily(3)
        ));
    }

    #[test]
    fn test_subnet_odd_length_leaves_address_unset() {
        // family says IPv4 but the payload is not 8 octets total
        let bytes = [0x00, 0x01, 0x18, 0x00, 0xC0, 0x00, 0x02, 0x00, 0xFF];
        let parsed = ClientSubnet::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.family, 1);
        assert_eq!(parsed.address, None);
    }

    #[test]
    fn test_llq_round_trip() {
        let llq = LLQ {
            version: 1,
            opcode: 2,
            error_code: 0,
            id: 0x0102_0304_0506_0708,
            lease_life: 3600,
        };
        let bytes = llq.to_bytes().unwrap();
        assert_eq!(bytes.len(), 18);
        assert_eq!(LLQ::from_bytes(&bytes).unwrap(), llq);
    }

    #[test]
    fn test_opt_round_trip_preserves_order_and_unknown() {
        let opt = OPT::new(vec![
            EdnsOption::NSID(vec![0xde, 0xad, 0xbe, 0xef]),
            EdnsOption::Unknown(0x1234, vec![1, 2, 3]),
            EdnsOption::UL(120),
            EdnsOption::LLQ(LLQ {
                version: 1,
                opcode: 1,
                error_code: 0,
                id: 42,
                lease_life: 7200,
            }),
            EdnsOption::Unknown(0x000a, vec![]),
        ]);

        let bytes = opt.to_bytes().unwrap();
        let mut decoder = BinDecoder::new(&bytes);
        let parsed = read(&mut decoder, bytes.len() as u16).unwrap();
        assert_eq!(parsed, opt);

        // and the re-encoding is byte identical
        assert_eq!(parsed.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_opt_read_empty_option_at_end() {
        // a zero length option terminating the list must parse
        let bytes: Vec<u8> = vec![
            0x00, 0x03, 0x00, 0x04, 0xaa, 0xbb, 0xcc, 0xdd, // NSID
            0x00, 0x0b, 0x00, 0x00, // unknown keepalive, no data
        ];
        let mut decoder = BinDecoder::new(&bytes);
        let opt = read(&mut decoder, bytes.len() as u16).unwrap();
        assert_eq!(opt.len(), 2);
        assert_eq!(
            opt.options()[1],
            EdnsOption::Unknown(0x000b, Vec::new())
        );
    }

    #[test]
    fn test_opt_truncated_option_is_rejected() {
        let bytes: Vec<u8> = vec![0x00, 0x03, 0x00, 0x04, 0xaa];
        let mut decoder = BinDecoder::new(&bytes);
        assert!(read(&mut decoder, bytes.len() as u16).is_err());
    }

    #[test]
    fn test_nsid_text_form_is_lowercase_hex() {
        let nsid = EdnsOption::NSID(vec![0xCA, 0xFE]);
        assert_eq!(nsid.to_string(), "NSID: cafe");
    }
}
