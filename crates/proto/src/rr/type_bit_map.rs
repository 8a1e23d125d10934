// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! type bit map helper definitions

use std::collections::BTreeMap;

use crate::error::ProtoResult;
use crate::rr::RecordType;
use crate::serialize::binary::BinEncoder;

/// Encodes the set of record types as the "type bit maps" field used by NSEC
/// records, RFC 4034 section 4.1.2.
///
/// The RR type space is split into 256 window blocks, each covering the
/// low-order 8 bits of the 16-bit type space. Each block with at least one
/// present type is emitted as `window number | bitmap length | bitmap`, in
/// increasing window order, with trailing zero octets of the bitmap omitted.
pub(crate) fn emit_type_bit_maps(
    encoder: &mut BinEncoder<'_>,
    types: &[RecordType],
) -> ProtoResult<()> {
    let mut windows: BTreeMap<u8, Vec<u8>> = BTreeMap::new();

    // collect the bitmaps
    for rr_type in types {
        let code = u16::from(*rr_type);
        let window = (code >> 8) as u8;
        let low = (code & 0x00FF) as u8;

        let bit_map = windows.entry(window).or_default();
        let index = usize::from(low / 8);
        let bit = 0b1000_0000 >> (low % 8);

        if bit_map.len() < index + 1 {
            bit_map.resize(index + 1, 0_u8);
        }

        bit_map[index] |= bit;
    }

    // output the bitmaps; a window bitmap is never larger than 32 octets
    for (window, bitmap) in windows {
        encoder.emit_u8(window)?;
        encoder.emit_u8(bitmap.len() as u8)?;
        encoder.emit_vec(&bitmap)?;
    }

    Ok(())
}
