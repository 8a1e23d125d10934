// Copyright 2024-2026 The contributors to Shellbark DNS
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! private key material used for signing zone records

use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair as RingEd25519, KeyPair as _};

use crate::error::ProtoResult;
use crate::rr::dnssec::rdata::DNSKEY;
use crate::rr::dnssec::Algorithm;

/// A key that can produce DNSSEC signatures.
///
/// The zone signer is written against this trait only; the cryptographic
/// providers live behind it. Failures of the provider are surfaced unchanged
/// in the returned error.
pub trait SigningKey: Send + Sync {
    /// Returns the algorithm of the key
    fn algorithm(&self) -> Algorithm;

    /// Signs the to-be-signed bytes, returning the raw signature
    fn sign(&self, tbs: &[u8]) -> ProtoResult<Vec<u8>>;

    /// Returns the public key material in DNSKEY wire form
    fn public_bytes(&self) -> ProtoResult<Vec<u8>>;

    /// Constructs the DNSKEY RData publishing this key.
    ///
    /// The zone key flag is always set; `secure_entry_point` marks the key
    /// as a KSK.
    fn to_dnskey(&self, secure_entry_point: bool) -> ProtoResult<DNSKEY> {
        Ok(DNSKEY::new(
            true,
            secure_entry_point,
            false,
            self.algorithm(),
            self.public_bytes()?,
        ))
    }
}

/// An Ed25519 key pair backed by ring, RFC 8080
pub struct Ed25519KeyPair {
    inner: RingEd25519,
}

impl Ed25519KeyPair {
    /// Generates a new key, returning it together with its PKCS#8 document
    /// for storage
    pub fn generate() -> ProtoResult<(Self, Vec<u8>)> {
        let rng = SystemRandom::new();
        let pkcs8 = RingEd25519::generate_pkcs8(&rng)?;
        let key = Self::from_pkcs8(pkcs8.as_ref())?;
        Ok((key, pkcs8.as_ref().to_vec()))
    }

    /// Loads the key pair from a PKCS#8 document
    pub fn from_pkcs8(bytes: &[u8]) -> ProtoResult<Self> {
        let inner = RingEd25519::from_pkcs8(bytes)?;
        Ok(Self { inner })
    }
}

impl SigningKey for Ed25519KeyPair {
    fn algorithm(&self) -> Algorithm {
        Algorithm::ED25519
    }

    fn sign(&self, tbs: &[u8]) -> ProtoResult<Vec<u8>> {
        Ok(self.inner.sign(tbs).as_ref().to_vec())
    }

    fn public_bytes(&self) -> ProtoResult<Vec<u8>> {
        // RFC 8080 section 3: the public key field is the 32 octet point
        Ok(self.inner.public_key().as_ref().to_vec())
    }
}
