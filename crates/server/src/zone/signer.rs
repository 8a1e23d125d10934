// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! the DNSSEC signing pass: NSEC chain and RRSIG maintenance

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use time::OffsetDateTime;
use tracing::{debug, trace};

use shellbark_proto::rr::dnssec::rdata::{DNSKEY, NSEC, SIG};
use shellbark_proto::rr::dnssec::timestamp;
use shellbark_proto::rr::dnssec::{rrset_tbs_with_sig, SigningKey};
use shellbark_proto::rr::{DNSClass, Name, RData, Record, RecordType};

use crate::error::{ZoneError, ZoneErrorKind};
use crate::zone::node::ZoneNode;
use crate::zone::Zone;

/// Parameters for zone (re)signing. The defaults are those of OpenDNSSEC's
/// kasp.xml.
#[cfg_attr(feature = "serde-config", derive(serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct SignatureConfig {
    /// Validity period of the signatures, typically 2 to 4 weeks
    pub validity: Duration,

    /// How much remaining lifetime a signature may have before it is
    /// refreshed. Typical value is 3 days.
    pub refresh: Duration,

    /// A random amount of time added to or subtracted from the expiration
    /// time, so that not all signatures expire at once. Typical value is 12
    /// hours, meaning the applied offset lies in -12h..=+12h.
    pub jitter: Duration,

    /// Subtracted from the inception time so that badly calibrated clocks
    /// elsewhere can still validate a fresh signature. Typical value is 300
    /// seconds.
    pub inception_offset: Duration,

    /// Honor the SEP flag: keys carrying it sign only the DNSKEY RRset.
    /// When unset, every key signs everything.
    pub honor_sep_flag: bool,

    /// Number of signing worker threads
    pub signer_workers: usize,

    /// TTL for created NSEC records; when zero it is taken from the SOA
    /// minimum at signing time
    pub min_ttl: u32,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            validity: Duration::from_secs(4 * 7 * 24 * 3600),
            refresh: Duration::from_secs(3 * 24 * 3600),
            jitter: Duration::from_secs(12 * 3600),
            inception_offset: Duration::from_secs(300),
            honor_sep_flag: true,
            signer_workers: thread::available_parallelism()
                .map(|n| n.get() + 1)
                .unwrap_or(2),
            min_ttl: 0,
        }
    }
}

/// A DNSKEY together with its private half, ready to sign a zone.
///
/// The key tag is computed once at construction. The public DNSKEY record is
/// available through [`ZoneSigningKey::record`]; the signer never adds it to
/// the zone itself.
pub struct ZoneSigningKey {
    record: Arc<Record>,
    key_tag: u16,
    key: Arc<dyn SigningKey>,
}

impl ZoneSigningKey {
    /// Pairs a DNSKEY record with its private key material.
    ///
    /// The record must carry DNSKEY data whose algorithm matches the key.
    pub fn new(record: Record, key: Arc<dyn SigningKey>) -> Result<Self, ZoneError> {
        let Some(dnskey) = record.data().as_dnskey() else {
            return Err(ZoneErrorKind::Proto("expected a DNSKEY record".into()).into());
        };
        if dnskey.algorithm() != key.algorithm() {
            return Err(ZoneErrorKind::Proto("key algorithm mismatch".into()).into());
        }

        let key_tag = dnskey.calculate_key_tag()?;
        Ok(Self {
            record: Arc::new(record),
            key_tag,
            key,
        })
    }

    /// Builds the DNSKEY record from the key itself and pairs them up
    pub fn from_key(
        name: Name,
        ttl: u32,
        secure_entry_point: bool,
        key: Arc<dyn SigningKey>,
    ) -> Result<Self, ZoneError> {
        let dnskey = key.to_dnskey(secure_entry_point)?;
        Self::new(
            Record::from_rdata(name, ttl, RData::DNSKEY(dnskey)),
            key,
        )
    }

    /// The public DNSKEY record; insert it into the zone before signing if
    /// the keyset should be served
    pub fn record(&self) -> &Arc<Record> {
        &self.record
    }

    /// The public DNSKEY data
    pub fn dnskey(&self) -> &DNSKEY {
        self.record.data().as_dnskey().expect("validated at construction")
    }

    /// The owner of the DNSKEY, which becomes the signer name of RRSIGs
    pub fn name(&self) -> &Name {
        self.record.name()
    }

    /// The key tag identifying this key in its RRSIGs
    pub fn key_tag(&self) -> u16 {
        self.key_tag
    }

    /// True when the key carries the SEP flag
    fn is_sep(&self) -> bool {
        self.dnskey().secure_entry_point()
    }

    fn ttl(&self) -> u32 {
        self.record.ttl()
    }

    fn sign(&self, tbs: &[u8]) -> Result<Vec<u8>, ZoneError> {
        Ok(self.key.sign(tbs)?)
    }
}

impl Zone {
    /// (Re)signs the zone with the given keys, rebuilding the NSEC chain as
    /// needed.
    ///
    /// Signatures nearing their expiration are refreshed with the current
    /// keys; valid ones are left alone, and near-expiry signatures made by
    /// keys no longer offered are dropped. The public DNSKEY records are not
    /// added to the zone.
    ///
    /// The zone lock is held for the whole pass. Nodes are handed to
    /// `signer_workers` worker threads through a bounded queue, each node
    /// paired with the name of its in-order successor; the walk wraps
    /// around to the origin at the end of the zone. The first worker error
    /// stops the walk and is returned; nodes not yet signed stay unsigned.
    pub fn sign(
        &self,
        keys: &[ZoneSigningKey],
        config: &SignatureConfig,
    ) -> Result<(), ZoneError> {
        if keys.is_empty() {
            return Err(ZoneErrorKind::NoKeys.into());
        }

        let mut inner = self.inner.write();
        inner.mod_time = OffsetDateTime::now_utc();

        let apex_key = self.origin().to_radix_key();
        let apex = match inner.tree.find(&apex_key) {
            (Some(node), true) => node,
            _ => return Err(ZoneErrorKind::MissingSoa.into()),
        };
        let soa_minimum = apex.soa_minimum().ok_or(ZoneErrorKind::MissingSoa)?;

        let mut config = config.clone();
        if config.min_ttl == 0 {
            config.min_ttl = soa_minimum;
        }
        let workers = config.signer_workers.max(1);

        debug!("signing zone: {}", self.origin());

        let (node_tx, node_rx) = mpsc::sync_channel::<(Arc<ZoneNode>, Name)>(workers * 2);
        let node_rx = Mutex::new(node_rx);
        let (err_tx, err_rx) = mpsc::channel::<ZoneError>();
        let mut first_err = None;

        thread::scope(|scope| {
            for _ in 0..workers {
                let node_rx = &node_rx;
                let err_tx = err_tx.clone();
                let config = &config;
                scope.spawn(move || {
                    loop {
                        let received = node_rx.lock().recv();
                        let (node, next_name) = match received {
                            Ok(job) => job,
                            Err(_) => return,
                        };
                        if let Err(e) = sign_node(&node, &next_name, keys, config) {
                            let _ = err_tx.send(e);
                            break;
                        }
                    }
                    // keep draining after a failure so the producer never
                    // blocks on the queue before it observes the error
                    while node_rx.lock().recv().is_ok() {}
                });
            }
            drop(err_tx);

            // the producer walks the canonical order; the successor of the
            // last node is the origin again
            let mut walk = inner.tree.iter().peekable();
            while let Some(node) = walk.next() {
                if let Ok(e) = err_rx.try_recv() {
                    first_err = Some(e);
                    break;
                }
                let next_name = match walk.peek() {
                    Some(successor) => successor.name().clone(),
                    None => self.origin().clone(),
                };
                if node_tx.send((node.clone(), next_name)).is_err() {
                    break;
                }
            }
            drop(node_tx);
        });

        if first_err.is_none() {
            first_err = err_rx.try_recv().ok();
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Signs a single node against its in-order successor.
///
/// The node lock is held for the duration; the caller must hold the zone
/// lock so that the successor cannot change underneath.
fn sign_node(
    node: &ZoneNode,
    next_name: &Name,
    keys: &[ZoneSigningKey],
    config: &SignatureConfig,
) -> Result<(), ZoneError> {
    let mut inner = node.write();
    let inner = &mut *inner;

    // the canonical type bitmap: whatever is present, plus the NSEC and its
    // RRSIG themselves
    let mut bitmap = vec![RecordType::NSEC, RecordType::RRSIG];
    for rr_type in inner.rrs.keys() {
        if *rr_type != RecordType::NSEC && *rr_type != RecordType::RRSIG {
            bitmap.push(*rr_type);
        }
    }
    bitmap.sort();

    // an existing NSEC survives only if it still points at the right
    // successor with the right bitmap; anything else is replaced and its
    // signatures dropped
    let (ttl, stale) = match inner.rrs.get(&RecordType::NSEC).and_then(|set| set.first()) {
        Some(existing) => {
            let stale = match existing.data().as_nsec() {
                Some(nsec) => {
                    nsec.next_domain_name() != next_name || nsec.type_bit_maps() != &bitmap[..]
                }
                None => true,
            };
            (existing.ttl(), stale)
        }
        None => (config.min_ttl, true),
    };
    if stale {
        let nsec = Record::from_rdata(
            node.name().clone(),
            ttl,
            RData::NSEC(NSEC::new(next_name.clone(), bitmap)),
        );
        inner.rrs.insert(RecordType::NSEC, vec![Arc::new(nsec)]);
        inner.sigs.remove(&RecordType::NSEC);
    }

    // walk all keys and check the signatures of every RRset
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let refresh = config.refresh.as_secs() as i64;
    for key in keys {
        for (rr_type, rrset) in &inner.rrs {
            if config.honor_sep_flag && key.is_sep() && *rr_type != RecordType::DNSKEY {
                // SEP keys sign only the keyset
                continue;
            }
            if inner.non_auth && *rr_type != RecordType::DS && *rr_type != RecordType::NSEC {
                continue;
            }

            let held = inner.sigs.get(rr_type).and_then(|sigs| {
                sigs.iter()
                    .position(|sig| covered_key_tag(sig) == Some(key.key_tag()))
            });
            let fresh_needed = match held {
                Some(at) => remaining_lifetime(&inner.sigs[rr_type][at], now) < refresh,
                None => true,
            };
            if !fresh_needed {
                continue;
            }

            trace!("signing rrset: {} {}", node.name(), rr_type);
            let rrsig = Arc::new(sign_rrset(node.name(), rrset, key, config, now)?);
            match held {
                Some(at) => inner.sigs.get_mut(rr_type).expect("held")[at] = rrsig,
                None => inner.sigs.entry(*rr_type).or_default().push(rrsig),
            }
        }
    }

    // anything still close to expiring was made by a key that is gone
    inner.sigs.retain(|_, sigs| {
        sigs.retain(|sig| remaining_lifetime(sig, now) >= refresh);
        !sigs.is_empty()
    });

    Ok(())
}

/// Produces a fresh RRSIG over the RRset with the given key
fn sign_rrset(
    name: &Name,
    rrset: &[Arc<Record>],
    key: &ZoneSigningKey,
    config: &SignatureConfig,
    now: i64,
) -> Result<Record, ZoneError> {
    let inception = timestamp::time_to_u32(now - config.inception_offset.as_secs() as i64);
    let expiration =
        timestamp::time_to_u32(now + config.validity.as_secs() as i64 + jitter(config.jitter));

    let rr_type = rrset.first().map(|rr| rr.record_type()).unwrap_or(RecordType::NULL);
    let original_ttl = rrset.first().map(|rr| rr.ttl()).unwrap_or(config.min_ttl);

    let sig = SIG::new(
        rr_type,
        key.dnskey().algorithm(),
        name.num_labels(),
        original_ttl,
        expiration,
        inception,
        key.key_tag(),
        key.name().clone(),
        Vec::new(),
    );

    let records: Vec<&Record> = rrset.iter().map(|rr| rr.as_ref()).collect();
    let tbs = rrset_tbs_with_sig(name, DNSClass::IN, &sig, &records).map_err(ZoneError::from)?;
    let signature = key.sign(tbs.as_ref())?;

    Ok(Record::from_rdata(
        name.clone(),
        key.ttl(),
        RData::RRSIG(sig.set_sig(signature)),
    ))
}

/// The key tag of the RRSIG held in the record, if it is one
fn covered_key_tag(sig: &Arc<Record>) -> Option<u16> {
    sig.data().as_rrsig().map(SIG::key_tag)
}

/// Seconds until the signature expires, by serial number arithmetic;
/// records that are not RRSIGs never survive a sweep
fn remaining_lifetime(sig: &Arc<Record>, now: i64) -> i64 {
    match sig.data().as_rrsig() {
        Some(rrsig) => timestamp::u32_to_time(rrsig.sig_expiration(), now) - now,
        None => i64::MIN,
    }
}

/// A uniform offset in -jitter..=+jitter, in whole seconds
fn jitter(jitter: Duration) -> i64 {
    let bound = jitter.as_secs() as i64;
    if bound == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(-bound..=bound)
}
