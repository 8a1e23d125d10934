// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Error types for the crate

#![deny(missing_docs)]

use std::fmt;

use enum_as_inner::EnumAsInner;
use thiserror::Error;

/// An alias for results returned by functions of this crate
pub type ProtoResult<T> = ::std::result::Result<T, ProtoError>;

/// The error kind for errors that get returned in the crate
#[derive(Debug, EnumAsInner, Error)]
#[non_exhaustive]
pub enum ProtoErrorKind {
    /// A client-subnet option carried an address family other than IPv4 or IPv6
    #[error("bad address family in client subnet: {0}")]
    BadFamily(u16),

    /// A client-subnet netmask does not fit the address family
    #[error("netmask {netmask} exceeds the width of address family {family}")]
    BadNetmask {
        /// Address family from the option, 1 for IPv4 and 2 for IPv6
        family: u16,
        /// The offending source netmask
        netmask: u8,
    },

    /// Not enough data was available to decode the requested value
    #[error("buffer exhausted: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun {
        /// Number of bytes the read required
        needed: usize,
        /// Number of bytes left in the buffer
        remaining: usize,
    },

    /// Character data length exceeded the limit
    #[error("char data length exceeds 255: {0}")]
    CharacterDataTooLong(usize),

    /// A domain name was too long
    #[error("name label data exceed 255: {0}")]
    DomainNameTooLong(usize),

    /// EDNS resource record label is not the root label, although required
    #[error("edns resource record label must be the root label (.)")]
    EdnsNameNotRoot,

    /// A label exceeded the 63 octet limit
    #[error("label bytes exceed 63: {0}")]
    LabelBytesTooLong(usize),

    /// A label was empty or otherwise malformed
    #[error("malformed label: {0}")]
    MalformedLabel(String),

    /// An unrecognized or unsupported condition, static message
    #[error("{0}")]
    Message(&'static str),

    /// An unrecognized or unsupported condition, formatted message
    #[error("{0}")]
    Msg(String),

    /// A cryptographic key was rejected by the provider
    #[error("key rejected: {0}")]
    RingKeyRejected(#[from] ring::error::KeyRejected),

    /// An opaque error from the cryptographic provider
    #[error("ring error: {0}")]
    Ring(#[from] ring::error::Unspecified),

    /// A signing operation failed; the provider error is surfaced unchanged
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// The error type for errors that get returned in the crate
#[derive(Debug, Error)]
pub struct ProtoError {
    kind: Box<ProtoErrorKind>,
}

impl ProtoError {
    /// Get the kind of the error
    pub fn kind(&self) -> &ProtoErrorKind {
        &self.kind
    }
}

impl fmt::Display for ProtoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl From<ProtoErrorKind> for ProtoError {
    fn from(kind: ProtoErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }
}

impl From<&'static str> for ProtoError {
    fn from(msg: &'static str) -> Self {
        ProtoErrorKind::Message(msg).into()
    }
}

impl From<String> for ProtoError {
    fn from(msg: String) -> Self {
        ProtoErrorKind::Msg(msg).into()
    }
}

impl From<ring::error::KeyRejected> for ProtoError {
    fn from(e: ring::error::KeyRejected) -> Self {
        ProtoErrorKind::from(e).into()
    }
}

impl From<ring::error::Unspecified> for ProtoError {
    fn from(e: ring::error::Unspecified) -> Self {
        ProtoErrorKind::from(e).into()
    }
}
