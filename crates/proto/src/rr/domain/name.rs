// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Domain name associated types, in their presentation form.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{ProtoError, ProtoErrorKind, ProtoResult};
use crate::serialize::binary::{BinEncodable, BinEncoder};

/// A DNS domain name in presentation form.
///
/// A name is a dot separated sequence of labels; the root is written `"."`.
/// A label boundary is an *unescaped* dot: `\.` keeps a dot inside a label,
/// and `\\` is a literal backslash which does not protect the following
/// character. Comparison is ASCII case insensitive; whether a name is fully
/// qualified (ends at the root) is significant for equality.
#[derive(Debug, Clone)]
pub struct Name {
    name: String,
}

/// Splits the presentation form into its escaped label slices.
///
/// The trailing root label of a fully qualified name yields no slice; empty
/// slices are produced for empty labels and rejected during validation.
fn split_labels(d: &str) -> Vec<&str> {
    let bytes = d.as_bytes();
    let mut labels = Vec::new();
    let mut start = 0usize;
    let mut last = 0u8;
    let mut last_last = 0u8;

    for (i, &b) in bytes.iter().enumerate() {
        if b == b'.' && (last != b'\\' || last_last == b'\\') {
            labels.push(&d[start..i]);
            start = i + 1;
            continue;
        }
        last_last = last;
        last = b;
    }
    if start < bytes.len() {
        labels.push(&d[start..]);
    }

    labels
}

/// Resolves the escapes of a single label into raw bytes.
fn unescape_label(label: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(label.len());
    let mut bytes = label.bytes();
    while let Some(b) = bytes.next() {
        if b == b'\\' {
            out.push(bytes.next().unwrap_or(b'\\'));
        } else {
            out.push(b);
        }
    }
    out
}

impl Name {
    /// Returns the root name, `"."`
    pub fn root() -> Self {
        Self {
            name: ".".to_string(),
        }
    }

    /// Parses an ASCII presentation form name, validating the label lengths.
    ///
    /// The empty string is treated as the root. Each label is limited to 63
    /// octets after escape resolution and the whole name to 255 octets of
    /// wire form.
    pub fn from_ascii<S: AsRef<str>>(name: S) -> ProtoResult<Self> {
        let name = name.as_ref();
        if name.is_empty() || name == "." {
            return Ok(Self::root());
        }

        let mut wire_len = 1usize;
        for label in split_labels(name) {
            let raw = unescape_label(label);
            if raw.is_empty() {
                return Err(ProtoErrorKind::MalformedLabel(name.to_string()).into());
            }
            if raw.len() > 63 {
                return Err(ProtoErrorKind::LabelBytesTooLong(raw.len()).into());
            }
            wire_len += raw.len() + 1;
        }
        if wire_len > 255 {
            return Err(ProtoErrorKind::DomainNameTooLong(wire_len).into());
        }

        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Returns true if this is the root label, i.e. `"."`
    pub fn is_root(&self) -> bool {
        self.name == "."
    }

    /// Returns true if the name ends at the root, i.e. it is fully qualified
    pub fn is_fqdn(&self) -> bool {
        if self.is_root() {
            return true;
        }
        let bytes = self.name.as_bytes();
        if *bytes.last().expect("name is never empty") != b'.' {
            return false;
        }
        // the final dot must be an unescaped label boundary
        let len = bytes.len();
        let last = if len >= 2 { bytes[len - 2] } else { 0 };
        let last_last = if len >= 3 { bytes[len - 3] } else { 0 };
        last != b'\\' || last_last == b'\\'
    }

    /// Returns the fully qualified form, appending the root if necessary
    pub fn to_fqdn(&self) -> Self {
        if self.is_fqdn() {
            self.clone()
        } else {
            Self {
                name: format!("{}.", self.name),
            }
        }
    }

    /// Returns the name with all ASCII characters lowercased
    pub fn to_lowercase(&self) -> Self {
        Self {
            name: self.name.to_ascii_lowercase(),
        }
    }

    /// Returns the escaped label slices of the name, left to right.
    ///
    /// The root has no labels.
    pub fn labels(&self) -> Vec<&str> {
        if self.is_root() {
            return Vec::new();
        }
        split_labels(&self.name)
    }

    /// Returns the number of labels relevant for an RRSIG: the root does not
    /// count, and neither does a leading wildcard label
    pub fn num_labels(&self) -> u8 {
        let labels = self.labels();
        let count = match labels.first() {
            Some(&"*") => labels.len() - 1,
            _ => labels.len(),
        };
        count as u8
    }

    /// Returns true if the leftmost label is the wildcard, `*`
    pub fn is_wildcard(&self) -> bool {
        matches!(self.labels().first(), Some(&"*"))
    }

    /// Returns the length of the name in wire form
    pub fn len(&self) -> usize {
        let mut len = 1usize;
        for label in self.labels() {
            len += unescape_label(label).len() + 1;
        }
        len
    }

    /// Returns true for the root, which is the only name of wire length one
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// Returns true if `name` is equal to or a subdomain of this name.
    ///
    /// Label comparison is ASCII case insensitive.
    pub fn zone_of(&self, name: &Self) -> bool {
        let zone_labels = self.labels();
        let name_labels = name.labels();
        if zone_labels.len() > name_labels.len() {
            return false;
        }
        zone_labels
            .iter()
            .rev()
            .zip(name_labels.iter().rev())
            .all(|(z, n)| z.eq_ignore_ascii_case(n))
    }

    /// Reverses the label order of the name to produce the radix key that
    /// sorts in DNSSEC canonical order.
    ///
    /// For `"www.example.com."` the key is `".com.example.www"`. The key for
    /// the root is `"."`. Escaped dots do not split labels, and the key is
    /// lowercased, ASCII only.
    pub fn to_radix_key(&self) -> String {
        let d = &self.name;
        if d.is_empty() || d == "." {
            return ".".to_string();
        }

        let mut d = d.clone();
        if !self.is_fqdn() {
            d.push('.');
        }

        let bytes = d.as_bytes().to_vec();
        let mut out = String::new();
        let mut last_dot = 0usize;
        let mut last = 0u8;
        let mut last_last = 0u8;
        for (i, &b) in bytes.iter().enumerate() {
            if b == b'.' && (last != b'\\' || last_last == b'\\') {
                out = format!("{}.{}", &d[last_dot..i], out);
                last_dot = i + 1;
                continue;
            }
            last_last = last;
            last = b;
        }

        format!(".{}", out[..out.len() - 1].to_ascii_lowercase())
    }

    /// Emits the name in uncompressed wire form.
    ///
    /// With `lowercase` set the labels are written in DNSSEC canonical form.
    pub fn emit_as_canonical(
        &self,
        encoder: &mut BinEncoder<'_>,
        lowercase: bool,
    ) -> ProtoResult<()> {
        for label in self.labels() {
            let mut raw = unescape_label(label);
            if raw.len() > 63 {
                return Err(ProtoErrorKind::LabelBytesTooLong(raw.len()).into());
            }
            if lowercase {
                raw.make_ascii_lowercase();
            }
            encoder.emit_u8(raw.len() as u8)?;
            encoder.emit_vec(&raw)?;
        }
        encoder.emit_u8(0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::root()
    }
}

impl BinEncodable for Name {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> ProtoResult<()> {
        let lowercase = encoder.is_canonical_names();
        self.emit_as_canonical(encoder, lowercase)
    }
}

impl FromStr for Name {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_ascii(s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.name.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}
