// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Error types for the zone store and signer

#![deny(missing_docs)]

use std::fmt;

use thiserror::Error;

use shellbark_proto::rr::Name;
use shellbark_proto::ProtoError;

/// An alias for results returned by functions of this crate
pub type ZoneResult<T> = ::std::result::Result<T, ZoneError>;

/// The error kind for errors that get returned in the crate
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ZoneErrorKind {
    /// The record owner is neither the origin nor under it
    #[error("out of zone data: {0}")]
    OutOfZone(Name),

    /// The zone has no apex SOA, which makes it unsignable
    #[error("no SOA record found at the zone apex")]
    MissingSoa,

    /// A signing pass was requested without any keys
    #[error("no signing keys supplied")]
    NoKeys,

    /// An error at the protocol layer, including signing failures which are
    /// surfaced unchanged
    #[error("proto error: {0}")]
    Proto(#[from] ProtoError),
}

/// The error type for errors that get returned in the crate
#[derive(Debug, Error)]
pub struct ZoneError {
    kind: Box<ZoneErrorKind>,
}

impl ZoneError {
    /// Get the kind of the error
    pub fn kind(&self) -> &ZoneErrorKind {
        &self.kind
    }
}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl From<ZoneErrorKind> for ZoneError {
    fn from(kind: ZoneErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }
}

impl From<ProtoError> for ZoneError {
    fn from(e: ProtoError) -> Self {
        ZoneErrorKind::from(e).into()
    }
}
