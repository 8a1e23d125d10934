// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! to-be-signed serialization of an RRset

use crate::error::ProtoResult;
use crate::rr::dnssec::rdata::sig::{emit_pre_sig, SIG};
use crate::rr::domain::Name;
use crate::rr::{DNSClass, Record};
use crate::serialize::binary::{BinEncodable, BinEncoder};

/// Data To Be Signed.
pub struct TBS(Vec<u8>);

impl AsRef<[u8]> for TBS {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

/// Returns the to-be-signed serialization of the given record set, RFC 4034
/// section 3.1.8.1:
///
/// ```text
///          signed_data = RRSIG_RDATA | RR(1) | RR(2)...  where
///
///             "|" denotes concatenation
///
///             RRSIG_RDATA is the wire format of the RRSIG RDATA fields
///                with the Signature field excluded and the Signer's Name
///                in canonical form.
///
///             RR(i) = name | type | class | OrigTTL | RDATA length | RDATA
/// ```
///
/// The RRs are serialized with the owner name lowercased and uncompressed,
/// the TTL taken from the Original TTL field of the RRSIG, and the RRs
/// ordered by the canonical byte order of their RDATA. Records whose owner,
/// class or type do not match the signature are skipped.
pub fn rrset_tbs_with_sig(
    name: &Name,
    dns_class: DNSClass,
    sig: &SIG,
    records: &[&Record],
) -> ProtoResult<TBS> {
    // canonical rdata bytes double as the sort key
    let mut rrset: Vec<Vec<u8>> = Vec::with_capacity(records.len());
    for record in records {
        if record.record_type() != sig.type_covered()
            || record.dns_class() != dns_class
            || record.name() != name
        {
            continue;
        }

        let mut rdata_buf = Vec::new();
        let mut rdata_encoder = BinEncoder::new(&mut rdata_buf);
        rdata_encoder.set_canonical_names(true);
        record.data().emit(&mut rdata_encoder)?;
        rrset.push(rdata_buf);
    }

    // canonical order of the RRs within the set
    rrset.sort();

    let mut buf: Vec<u8> = Vec::new();
    let mut encoder = BinEncoder::new(&mut buf);
    encoder.set_canonical_names(true);

    emit_pre_sig(
        &mut encoder,
        sig.type_covered(),
        sig.algorithm(),
        sig.num_labels(),
        sig.original_ttl(),
        sig.sig_expiration(),
        sig.sig_inception(),
        sig.key_tag(),
        sig.signer_name(),
    )?;

    for rdata in rrset {
        name.emit_as_canonical(&mut encoder, true)?;
        sig.type_covered().emit(&mut encoder)?;
        dns_class.emit(&mut encoder)?;
        encoder.emit_u32(sig.original_ttl())?;
        encoder.emit_u16(rdata.len() as u16)?;
        encoder.emit_vec(&rdata)?;
    }

    Ok(TBS(buf))
}
