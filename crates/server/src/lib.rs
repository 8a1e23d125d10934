// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

#![warn(missing_docs, clippy::dbg_macro, clippy::print_stdout, clippy::unimplemented)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Shellbark DNS authoritative zone store.
//!
//! An in-memory zone keyed in DNSSEC canonical order, supporting incremental
//! mutation, exact and closest-encloser lookup, and multi-threaded DNSSEC
//! signing that maintains the NSEC chain and the RRSIG coverage of every
//! RRset.

mod error;
pub mod zone;

pub use error::{ZoneError, ZoneErrorKind, ZoneResult};
pub use zone::{SignatureConfig, Zone, ZoneNode, ZoneSigningKey};
