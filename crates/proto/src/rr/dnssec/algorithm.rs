// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! DNSSEC signing and validation algorithm identifiers

#![allow(clippy::use_self)]

use std::fmt;

#[cfg(feature = "serde-config")]
use serde::{Deserialize, Serialize};

use crate::error::ProtoResult;
use crate::serialize::binary::{BinEncodable, BinEncoder};

/// DNSSEC signing algorithm, the values are assigned by IANA.
///
/// [RFC 8624](https://tools.ietf.org/html/rfc8624) documents the
/// implementation recommendations per algorithm.
#[cfg_attr(feature = "serde-config", derive(Deserialize, Serialize))]
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
#[non_exhaustive]
pub enum Algorithm {
    /// [RFC 5702](https://tools.ietf.org/html/rfc5702), RSA with SHA-256
    RSASHA256,
    /// [RFC 5702](https://tools.ietf.org/html/rfc5702), RSA with SHA-512
    RSASHA512,
    /// [RFC 6605](https://tools.ietf.org/html/rfc6605), ECDSA Curve P-256 with SHA-256
    ECDSAP256SHA256,
    /// [RFC 6605](https://tools.ietf.org/html/rfc6605), ECDSA Curve P-384 with SHA-384
    ECDSAP384SHA384,
    /// [RFC 8080](https://tools.ietf.org/html/rfc8080), Edwards Curve Ed25519
    ED25519,
    /// An unknown or unsupported algorithm number
    Unknown(u8),
}

impl From<u8> for Algorithm {
    fn from(value: u8) -> Self {
        match value {
            8 => Self::RSASHA256,
            10 => Self::RSASHA512,
            13 => Self::ECDSAP256SHA256,
            14 => Self::ECDSAP384SHA384,
            15 => Self::ED25519,
            _ => Self::Unknown(value),
        }
    }
}

impl From<Algorithm> for u8 {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::RSASHA256 => 8,
            Algorithm::RSASHA512 => 10,
            Algorithm::ECDSAP256SHA256 => 13,
            Algorithm::ECDSAP384SHA384 => 14,
            Algorithm::ED25519 => 15,
            Algorithm::Unknown(value) => value,
        }
    }
}

impl BinEncodable for Algorithm {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> ProtoResult<()> {
        encoder.emit_u8((*self).into())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Self::RSASHA256 => "RSASHA256",
            Self::RSASHA512 => "RSASHA512",
            Self::ECDSAP256SHA256 => "ECDSAP256SHA256",
            Self::ECDSAP384SHA384 => "ECDSAP384SHA384",
            Self::ED25519 => "ED25519",
            Self::Unknown(value) => return write!(f, "ALG{value}"),
        };
        f.write_str(s)
    }
}
