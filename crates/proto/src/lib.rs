// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

#![warn(missing_docs, clippy::dbg_macro, clippy::print_stdout, clippy::unimplemented)]
#![allow(clippy::needless_doctest_main, clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Shellbark DNS Protocol library.
//!
//! The foundational types of the Shellbark projects: domain names with their
//! DNSSEC canonical ordering, resource records, the DNSSEC record data with
//! canonical RRset serialization and signing keys, and the EDNS0 OPT codec.
//! The zone store and signer live in `shellbark-server` on top of these
//! types.

mod error;
pub mod op;
pub mod rr;
pub mod serialize;

pub use error::{ProtoError, ProtoErrorKind, ProtoResult};
