//! Local key material for workflow accounts.
//!
//! Keypairs never leave the process; the network only ever sees the public
//! half plus a signature produced by whichever backend submits the
//! transaction. Accepts both raw hex and the DER-wrapped hex form that
//! operator `.env` files usually carry.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;

/// DER wrapping for an ed25519 private key, as exported by most wallets.
const PRIVATE_KEY_DER_PREFIX: &str = "302e020100300506032b657004220420";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("private key is not valid hex")]
    InvalidHex,
    #[error("private key must be 32 bytes, got {bytes}")]
    InvalidLength { bytes: usize },
}

/// An ed25519 signing key held in memory for the duration of a run.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut OsRng))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }
}

impl FromStr for PrivateKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex_part = trimmed
            .strip_prefix(PRIVATE_KEY_DER_PREFIX)
            .unwrap_or(trimmed);
        let bytes = hex::decode(hex_part).map_err(|_| KeyParseError::InvalidHex)?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyParseError::InvalidLength { bytes: bytes.len() })?;
        Ok(Self(SigningKey::from_bytes(&bytes)))
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PRIVATE_KEY_DER_PREFIX, hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never leak key material through debug logs.
        write!(f, "PrivateKey(..)")
    }
}

/// The shareable half of a keypair; equality is how the ledger decides
/// whether the required signatory authorized a transaction.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}
