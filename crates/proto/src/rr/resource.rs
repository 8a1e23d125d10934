// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! resource record implementation

use std::fmt;

use crate::rr::dns_class::DNSClass;
use crate::rr::domain::Name;
use crate::rr::record_data::RData;
use crate::rr::record_type::RecordType;

/// Resource records are storage value in DNS, into which all key/value pair data is stored.
///
/// [RFC 1035](https://tools.ietf.org/html/rfc1035)
///
/// ```text
/// 4.1.3. Resource record format
///
/// The answer, authority, and additional sections all share the same
/// format: a variable number of resource records, where the number of
/// records is specified in the corresponding count field in the header.
/// Each resource record has the following format:
///                                     1  1  1  1  1  1
///       0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                                               |
///     /                                               /
///     /                      NAME                     /
///     |                                               |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      TYPE                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     CLASS                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      TTL                      |
///     |                                               |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                   RDLENGTH                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     /                     RDATA                     /
///     /                                               /
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// The record type is not stored separately, it is the one matching the
/// record data.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Record {
    name: Name,
    dns_class: DNSClass,
    ttl: u32,
    rdata: RData,
}

impl Record {
    /// Creates a record with the data and the IN class
    pub fn from_rdata(name: Name, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            dns_class: DNSClass::IN,
            ttl,
            rdata,
        }
    }

    /// Replaces the class of the record, needed for the OPT pseudo record
    /// which carries the UDP payload size there
    pub fn set_dns_class(mut self, dns_class: DNSClass) -> Self {
        self.dns_class = dns_class;
        self
    }

    /// Replaces the ttl of the record
    pub fn set_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the owner name of the record
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the type of the record, derived from the data
    pub fn record_type(&self) -> RecordType {
        self.rdata.record_type()
    }

    /// Returns the class of the record
    pub fn dns_class(&self) -> DNSClass {
        self.dns_class
    }

    /// Returns the time to live of the record
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the record data
    pub fn data(&self) -> &RData {
        &self.rdata
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{name} {ttl} {class} {ty} {rdata}",
            name = self.name,
            ttl = self.ttl,
            class = self.dns_class,
            ty = self.record_type(),
            rdata = self.rdata,
        )
    }
}
