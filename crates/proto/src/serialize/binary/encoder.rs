// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::error::{ProtoErrorKind, ProtoResult};

/// Encode DNS resource record data into its binary wire form.
///
/// The encoder appends to a caller supplied buffer. Name compression is
/// deliberately not implemented: the encoder exists for the canonical forms
/// used by DNSSEC signing and for the OPT pseudo-RR, both of which require
/// uncompressed names.
pub struct BinEncoder<'a> {
    buffer: &'a mut Vec<u8>,
    /// Whether names should be emitted in the DNSSEC canonical form, i.e. lowercased.
    canonical_names: bool,
}

impl<'a> BinEncoder<'a> {
    /// Create a new encoder with the Vec to fill
    pub fn new(buffer: &'a mut Vec<u8>) -> Self {
        Self {
            buffer,
            canonical_names: false,
        }
    }

    /// Sets the canonical names flag, names will be lowercased when emitted
    pub fn set_canonical_names(&mut self, canonical_names: bool) {
        self.canonical_names = canonical_names;
    }

    /// Returns true if names should be emitted in canonical form
    pub fn is_canonical_names(&self) -> bool {
        self.canonical_names
    }

    /// Returns the length of the data written so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Emit a single byte
    pub fn emit(&mut self, b: u8) -> ProtoResult<()> {
        self.buffer.push(b);
        Ok(())
    }

    /// Emit a single byte
    pub fn emit_u8(&mut self, data: u8) -> ProtoResult<()> {
        self.emit(data)
    }

    /// Emit a u16 in network byte order
    pub fn emit_u16(&mut self, data: u16) -> ProtoResult<()> {
        self.emit_vec(&data.to_be_bytes())
    }

    /// Emit a u32 in network byte order
    pub fn emit_u32(&mut self, data: u32) -> ProtoResult<()> {
        self.emit_vec(&data.to_be_bytes())
    }

    /// Emit an i32 in network byte order
    pub fn emit_i32(&mut self, data: i32) -> ProtoResult<()> {
        self.emit_vec(&data.to_be_bytes())
    }

    /// Emit a u64 in network byte order
    pub fn emit_u64(&mut self, data: u64) -> ProtoResult<()> {
        self.emit_vec(&data.to_be_bytes())
    }

    /// Emit the bytes as is
    pub fn emit_vec(&mut self, data: &[u8]) -> ProtoResult<()> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Emit length prefixed character data, e.g. a TXT segment
    pub fn emit_character_data<S: AsRef<[u8]>>(&mut self, char_data: S) -> ProtoResult<()> {
        let char_bytes = char_data.as_ref();
        if char_bytes.len() > 255 {
            return Err(ProtoErrorKind::CharacterDataTooLong(char_bytes.len()).into());
        }

        self.emit(char_bytes.len() as u8)?;
        self.emit_vec(char_bytes)
    }
}
