// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! end to end tests of the zone store and the signing pass

use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;

use shellbark_proto::rr::dnssec::rdata::SIG;
use shellbark_proto::rr::dnssec::timestamp;
use shellbark_proto::rr::dnssec::{rrset_tbs_with_sig, Algorithm, Ed25519KeyPair, SigningKey};
use shellbark_proto::rr::rdata::{SOA, TXT};
use shellbark_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use shellbark_proto::{ProtoErrorKind, ProtoResult};
use shellbark_server::{SignatureConfig, Zone, ZoneErrorKind, ZoneSigningKey};

/// A deterministic key for tests that do not care about real cryptography,
/// using one of the private DNS algorithm numbers
struct TestKey {
    public: Vec<u8>,
}

impl TestKey {
    fn new(seed: u8) -> Self {
        Self {
            public: vec![seed; 32],
        }
    }
}

impl SigningKey for TestKey {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Unknown(253)
    }

    fn sign(&self, tbs: &[u8]) -> ProtoResult<Vec<u8>> {
        let mut sig = vec![0u8; 4];
        sig.extend_from_slice(&(tbs.len() as u32).to_be_bytes());
        sig.extend_from_slice(&self.public);
        Ok(sig)
    }

    fn public_bytes(&self) -> ProtoResult<Vec<u8>> {
        Ok(self.public.clone())
    }
}

/// A key whose provider always fails
struct BrokenKey;

impl SigningKey for BrokenKey {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Unknown(253)
    }

    fn sign(&self, _tbs: &[u8]) -> ProtoResult<Vec<u8>> {
        Err(ProtoErrorKind::SigningFailed("provider is broken".to_string()).into())
    }

    fn public_bytes(&self) -> ProtoResult<Vec<u8>> {
        Ok(vec![0; 32])
    }
}

fn name(s: &str) -> Name {
    Name::from_str(s).unwrap()
}

fn soa_record(minimum: u32) -> Arc<Record> {
    Arc::new(Record::from_rdata(
        name("example.com."),
        3600,
        RData::SOA(SOA::new(
            name("ns1.example.com."),
            name("root.example.com."),
            2024010101,
            28800,
            7200,
            604800,
            minimum,
        )),
    ))
}

fn rr(owner: &str, ttl: u32, rdata: RData) -> Arc<Record> {
    Arc::new(Record::from_rdata(name(owner), ttl, rdata))
}

/// apex SOA and NS plus one TXT below it
fn small_zone() -> Zone {
    let zone = Zone::new(name("example.com."));
    zone.insert(soa_record(3600)).unwrap();
    zone.insert(rr(
        "example.com.",
        3600,
        RData::NS(name("ns1.example.com.")),
    ))
    .unwrap();
    zone.insert(rr(
        "a.example.com.",
        300,
        RData::TXT(TXT::new(vec!["hello".to_string()])),
    ))
    .unwrap();
    zone
}

fn zsk() -> ZoneSigningKey {
    ZoneSigningKey::from_key(name("example.com."), 3600, false, Arc::new(TestKey::new(1)))
        .unwrap()
}

fn ksk() -> ZoneSigningKey {
    ZoneSigningKey::from_key(name("example.com."), 3600, true, Arc::new(TestKey::new(2))).unwrap()
}

fn key_tags(sigs: &[Arc<Record>]) -> Vec<u16> {
    let mut tags: Vec<u16> = sigs
        .iter()
        .map(|s| s.data().as_rrsig().unwrap().key_tag())
        .collect();
    tags.sort_unstable();
    tags
}

#[test]
fn test_sign_builds_the_nsec_chain() {
    let zone = small_zone();
    let keys = [zsk()];
    zone.sign(&keys, &SignatureConfig::default()).unwrap();

    let apex = zone.apex().unwrap();
    let apex_nsec = apex.records(RecordType::NSEC);
    assert_eq!(apex_nsec.len(), 1);
    let nsec = apex_nsec[0].data().as_nsec().unwrap();
    assert_eq!(nsec.next_domain_name(), &name("a.example.com."));
    assert_eq!(
        nsec.type_bit_maps(),
        &[
            RecordType::NS,
            RecordType::SOA,
            RecordType::RRSIG,
            RecordType::NSEC,
        ]
    );
    // the NSEC ttl comes from the SOA minimum
    assert_eq!(apex_nsec[0].ttl(), 3600);

    let (a_node, exact) = zone.find(&name("a.example.com.")).unwrap();
    assert!(exact);
    let a_nsec = a_node.records(RecordType::NSEC);
    assert_eq!(a_nsec.len(), 1);
    let nsec = a_nsec[0].data().as_nsec().unwrap();
    assert_eq!(nsec.next_domain_name(), &name("example.com."));
    assert_eq!(
        nsec.type_bit_maps(),
        &[RecordType::TXT, RecordType::RRSIG, RecordType::NSEC]
    );

    // every RRset carries a signature by the key
    let tag = keys[0].key_tag();
    for (node, types) in [
        (&apex, vec![RecordType::SOA, RecordType::NS, RecordType::NSEC]),
        (&a_node, vec![RecordType::TXT, RecordType::NSEC]),
    ] {
        for rr_type in types {
            let sigs = node.signatures(rr_type);
            assert_eq!(sigs.len(), 1, "missing signature for {rr_type}");
            let sig = sigs[0].data().as_rrsig().unwrap();
            assert_eq!(sig.key_tag(), tag);
            assert_eq!(sig.type_covered(), rr_type);
            assert_eq!(sig.signer_name(), &name("example.com."));
        }
    }
}

#[test]
fn test_signature_validity_window() {
    let zone = small_zone();
    zone.sign(&[zsk()], &SignatureConfig::default()).unwrap();

    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    let apex = zone.apex().unwrap();
    for rr_type in [RecordType::SOA, RecordType::NS, RecordType::NSEC] {
        for sig in apex.signatures(rr_type) {
            let sig = sig.data().as_rrsig().unwrap();
            let inception = timestamp::u32_to_time(sig.sig_inception(), now);
            let expiration = timestamp::u32_to_time(sig.sig_expiration(), now);
            assert!(inception <= now);
            assert!(now < expiration);
            // expiration is validity plus at most the jitter away
            let validity = 4 * 7 * 24 * 3600;
            let jitter = 12 * 3600;
            assert!((expiration - now - validity).abs() <= jitter + 300);
        }
    }
}

#[test]
fn test_nsec_chain_is_a_single_cycle() {
    let zone = small_zone();
    for i in 0..20 {
        zone.insert(rr(
            &format!("host-{i}.example.com."),
            300,
            RData::A(Ipv4Addr::new(10, 0, 0, i)),
        ))
        .unwrap();
    }
    zone.sign(&[zsk()], &SignatureConfig::default()).unwrap();

    let node_count = zone.len();
    let mut at = name("example.com.");
    let mut seen = 0;
    loop {
        let (node, exact) = zone.find(&at).unwrap();
        assert!(exact);
        let nsec_rrs = node.records(RecordType::NSEC);
        assert_eq!(nsec_rrs.len(), 1, "no NSEC at {at}");
        let next = nsec_rrs[0]
            .data()
            .as_nsec()
            .unwrap()
            .next_domain_name()
            .clone();
        seen += 1;
        if next == name("example.com.") {
            break;
        }
        assert!(seen <= node_count, "NSEC chain does not close");
        at = next;
    }
    assert_eq!(seen, node_count);
}

#[test]
fn test_sep_keys_sign_only_the_keyset() {
    let zone = small_zone();
    let zsk = zsk();
    let ksk = ksk();
    zone.insert(zsk.record().clone()).unwrap();
    zone.insert(ksk.record().clone()).unwrap();

    let keys = [zsk, ksk];
    zone.sign(&keys, &SignatureConfig::default()).unwrap();

    let apex = zone.apex().unwrap();
    // the keyset is signed by both keys
    assert_eq!(
        key_tags(&apex.signatures(RecordType::DNSKEY)),
        {
            let mut tags = vec![keys[0].key_tag(), keys[1].key_tag()];
            tags.sort_unstable();
            tags
        }
    );
    // everything else only by the zone signing key
    assert_eq!(
        key_tags(&apex.signatures(RecordType::SOA)),
        vec![keys[0].key_tag()]
    );
    assert_eq!(
        key_tags(&apex.signatures(RecordType::NS)),
        vec![keys[0].key_tag()]
    );
}

#[test]
fn test_delegations_are_signed_for_nsec_only() {
    let zone = small_zone();
    zone.insert(rr(
        "child.example.com.",
        3600,
        RData::NS(name("ns1.child.example.com.")),
    ))
    .unwrap();

    zone.sign(&[zsk()], &SignatureConfig::default()).unwrap();

    let (child, exact) = zone.find(&name("child.example.com.")).unwrap();
    assert!(exact);
    assert!(child.is_non_auth());
    // the NS set of the delegation is not ours to sign
    assert!(child.signatures(RecordType::NS).is_empty());
    assert_eq!(child.signatures(RecordType::NSEC).len(), 1);
    // but it is present in the NSEC bitmap
    let nsec_rrs = child.records(RecordType::NSEC);
    let nsec = nsec_rrs[0].data().as_nsec().unwrap();
    assert!(nsec.type_bit_maps().contains(&RecordType::NS));
}

#[test]
fn test_resign_leaves_valid_signatures_alone() {
    let zone = small_zone();
    let keys = [zsk()];
    zone.sign(&keys, &SignatureConfig::default()).unwrap();

    let apex = zone.apex().unwrap();
    let before = apex.signatures(RecordType::SOA);

    zone.sign(&keys, &SignatureConfig::default()).unwrap();
    let after = apex.signatures(RecordType::SOA);

    assert_eq!(before.len(), 1);
    assert!(Arc::ptr_eq(&before[0], &after[0]));
}

#[test]
fn test_resign_follows_zone_changes() {
    let zone = small_zone();
    let keys = [zsk()];
    zone.sign(&keys, &SignatureConfig::default()).unwrap();

    let (a_node, _) = zone.find(&name("a.example.com.")).unwrap();
    let nsec_before = a_node.records(RecordType::NSEC);
    let nsec_sig_before = a_node.signatures(RecordType::NSEC);

    // a new type at the node changes its bitmap
    zone.insert(rr(
        "a.example.com.",
        300,
        RData::A(Ipv4Addr::new(192, 0, 2, 1)),
    ))
    .unwrap();
    zone.sign(&keys, &SignatureConfig::default()).unwrap();

    let (a_node, _) = zone.find(&name("a.example.com.")).unwrap();
    let nsec_after = a_node.records(RecordType::NSEC);
    assert!(!Arc::ptr_eq(&nsec_before[0], &nsec_after[0]));
    assert!(nsec_after[0]
        .data()
        .as_nsec()
        .unwrap()
        .type_bit_maps()
        .contains(&RecordType::A));

    // the old NSEC signature went with the old NSEC
    let nsec_sig_after = a_node.signatures(RecordType::NSEC);
    assert_eq!(nsec_sig_after.len(), 1);
    assert!(!Arc::ptr_eq(&nsec_sig_before[0], &nsec_sig_after[0]));

    // and the new RRset is covered
    assert_eq!(a_node.signatures(RecordType::A).len(), 1);
}

#[test]
fn test_sweep_drops_near_expiry_foreign_signatures() {
    let zone = small_zone();
    let now = time::OffsetDateTime::now_utc().unix_timestamp();

    // a signature by a key we no longer have, about to expire
    let dying = SIG::new(
        RecordType::TXT,
        Algorithm::Unknown(253),
        2,
        300,
        timestamp::time_to_u32(now + 100),
        timestamp::time_to_u32(now - 1000),
        9999,
        name("example.com."),
        vec![0xdd; 8],
    );
    zone.insert(rr("a.example.com.", 3600, RData::RRSIG(dying)))
        .unwrap();

    // and one that is still far from expiring
    let healthy = SIG::new(
        RecordType::TXT,
        Algorithm::Unknown(253),
        2,
        300,
        timestamp::time_to_u32(now + 180 * 24 * 3600),
        timestamp::time_to_u32(now - 1000),
        8888,
        name("example.com."),
        vec![0xee; 8],
    );
    zone.insert(rr("a.example.com.", 3600, RData::RRSIG(healthy)))
        .unwrap();

    let keys = [zsk()];
    zone.sign(&keys, &SignatureConfig::default()).unwrap();

    let (a_node, _) = zone.find(&name("a.example.com.")).unwrap();
    let tags = key_tags(&a_node.signatures(RecordType::TXT));
    assert!(!tags.contains(&9999), "stale signature must be dropped");
    assert!(tags.contains(&8888), "valid foreign signature must survive");
    assert!(tags.contains(&keys[0].key_tag()));
}

#[test]
fn test_sign_errors() {
    // no keys at all
    let zone = small_zone();
    let err = zone.sign(&[], &SignatureConfig::default()).unwrap_err();
    assert!(matches!(err.kind(), ZoneErrorKind::NoKeys));

    // no apex SOA
    let zone = Zone::new(name("example.com."));
    zone.insert(rr(
        "www.example.com.",
        300,
        RData::A(Ipv4Addr::new(1, 2, 3, 4)),
    ))
    .unwrap();
    let err = zone.sign(&[zsk()], &SignatureConfig::default()).unwrap_err();
    assert!(matches!(err.kind(), ZoneErrorKind::MissingSoa));
}

#[test]
fn test_broken_key_aborts_the_pass() {
    let zone = small_zone();
    for i in 0..50 {
        zone.insert(rr(
            &format!("host-{i}.example.com."),
            300,
            RData::A(Ipv4Addr::new(10, 0, 1, i)),
        ))
        .unwrap();
    }

    let broken =
        ZoneSigningKey::from_key(name("example.com."), 3600, false, Arc::new(BrokenKey)).unwrap();
    let err = zone
        .sign(&[broken], &SignatureConfig::default())
        .unwrap_err();
    assert!(matches!(err.kind(), ZoneErrorKind::Proto(_)));
}

#[test]
fn test_worker_pool_signs_large_zones() {
    let zone = small_zone();
    for i in 0..200u32 {
        zone.insert(rr(
            &format!("host-{i:03}.example.com."),
            300,
            RData::A(Ipv4Addr::from(0x0a00_0000 + i)),
        ))
        .unwrap();
    }

    let config = SignatureConfig {
        signer_workers: 4,
        ..SignatureConfig::default()
    };
    zone.sign(&[zsk()], &config).unwrap();

    // every node ended up with an NSEC and a signature over each RRset
    let mut at = name("example.com.");
    let mut seen = 0;
    loop {
        let (node, _) = zone.find(&at).unwrap();
        for rr_type in node.record_types() {
            if node.is_non_auth() && rr_type != RecordType::NSEC {
                continue;
            }
            assert!(
                !node.signatures(rr_type).is_empty(),
                "unsigned {rr_type} at {}",
                node.name()
            );
        }
        seen += 1;
        let nsec_rrs = node.records(RecordType::NSEC);
        let next = nsec_rrs[0]
            .data()
            .as_nsec()
            .unwrap()
            .next_domain_name()
            .clone();
        if next == name("example.com.") {
            break;
        }
        at = next;
    }
    assert_eq!(seen, zone.len());
}

#[test]
fn test_ed25519_signatures_verify() {
    let zone = small_zone();
    let (key, _pkcs8) = Ed25519KeyPair::generate().unwrap();
    let key = Arc::new(key);
    let zsk =
        ZoneSigningKey::from_key(name("example.com."), 3600, false, key.clone()).unwrap();
    zone.insert(zsk.record().clone()).unwrap();

    zone.sign(&[zsk], &SignatureConfig::default()).unwrap();

    // reconstruct the signed data for the apex SOA and verify it with ring
    let apex = zone.apex().unwrap();
    let soa_set = apex.records(RecordType::SOA);
    let sig_rr = &apex.signatures(RecordType::SOA)[0];
    let sig = sig_rr.data().as_rrsig().unwrap();

    let records: Vec<&Record> = soa_set.iter().map(|r| r.as_ref()).collect();
    let tbs = rrset_tbs_with_sig(&name("example.com."), DNSClass::IN, sig, &records).unwrap();

    let public = ring::signature::UnparsedPublicKey::new(
        &ring::signature::ED25519,
        key.public_bytes().unwrap(),
    );
    public.verify(tbs.as_ref(), sig.sig()).unwrap();
}
