//! Salted PIN hashes
//!
//! The raw PIN is never stored. A `PinHash` keeps a random salt and the
//! SHA-256 digest of `salt || pin`; verification recomputes the digest and
//! compares it in constant time.

use super::error::ConfigError;
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

pub const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

#[derive(Clone, PartialEq, Eq)]
pub struct PinHash {
    salt: [u8; SALT_LEN],
    digest: [u8; DIGEST_LEN],
}

impl PinHash {
    /// Hash a PIN with a fresh random salt
    pub fn new(pin: &str) -> Self {
        Self::with_salt(pin, rand::random())
    }

    /// Hash a PIN with a caller-chosen salt
    pub fn with_salt(pin: &str, salt: [u8; SALT_LEN]) -> Self {
        let digest = Self::digest(&salt, pin);
        PinHash { salt, digest }
    }

    fn digest(salt: &[u8; SALT_LEN], pin: &str) -> [u8; DIGEST_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(pin.as_bytes());
        hasher.finalize().into()
    }

    /// Check a submitted PIN against the stored digest in constant time
    pub fn verify(&self, pin: &str) -> bool {
        let candidate = Self::digest(&self.salt, pin);
        candidate[..].ct_eq(&self.digest[..]).into()
    }

    /// Encode as `salt_hex:digest_hex`
    pub fn to_hex(&self) -> String {
        format!("{}:{}", hex::encode(self.salt), hex::encode(self.digest))
    }

    /// Decode the `salt_hex:digest_hex` form produced by [`PinHash::to_hex`]
    pub fn from_hex(encoded: &str) -> Result<Self, ConfigError> {
        let (salt_hex, digest_hex) = encoded
            .trim()
            .split_once(':')
            .ok_or_else(|| ConfigError::invalid_pin_hash("expected salt_hex:digest_hex"))?;

        let mut salt = [0u8; SALT_LEN];
        hex::decode_to_slice(salt_hex, &mut salt)
            .map_err(|e| ConfigError::invalid_pin_hash(format!("salt: {}", e)))?;

        let mut digest = [0u8; DIGEST_LEN];
        hex::decode_to_slice(digest_hex, &mut digest)
            .map_err(|e| ConfigError::invalid_pin_hash(format!("digest: {}", e)))?;

        Ok(PinHash { salt, digest })
    }
}

impl fmt::Debug for PinHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinHash").finish_non_exhaustive()
    }
}
