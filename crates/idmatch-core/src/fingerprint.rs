//! Natural-key fingerprints.
//!
//! A fingerprint is the first 16 hex characters of the SHA-256 digest of the
//! natural-key values joined with `|`. Each value contributes its trimmed
//! string form; absent values contribute the empty string.
//!
//! ## Determinism Guarantees
//!
//! - Same key values → same fingerprint, on every platform and run
//! - Key order matters: fields are joined in declared key order
//! - Computed on normalized records, so whitespace and numeric precision
//!   noise never splits one logical record into two fingerprints

use crate::model::{Record, Value};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Separator placed between key values before hashing.
pub const KEY_SEPARATOR: char = '|';

/// Number of hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 16;

/// Lowercase 16-character hex fingerprint of a natural key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint of one record plus whether its natural key was entirely empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDerivation {
    pub fingerprint: Fingerprint,
    /// Every key field was absent or blank. Such records still get a
    /// fingerprint but cannot reliably match a snapshot record.
    pub empty_key: bool,
}

/// Fingerprint a sequence of key values in declared key order.
pub fn fingerprint_values<'a, I>(values: I) -> Fingerprint
where
    I: IntoIterator<Item = &'a Value>,
{
    let parts: Vec<String> = values
        .into_iter()
        .map(|v| v.to_key_text().trim().to_string())
        .collect();
    fingerprint_key_string(&parts.join(&KEY_SEPARATOR.to_string()))
}

/// Derive the fingerprint of a (normalized) record from its key positions.
pub fn derive_key(record: &Record, key_positions: &[usize]) -> KeyDerivation {
    let values: Vec<&Value> = key_positions.iter().map(|p| record.get(*p)).collect();
    let empty_key = values.iter().all(|v| v.is_blank());
    KeyDerivation {
        fingerprint: fingerprint_values(values),
        empty_key,
    }
}

fn fingerprint_key_string(key: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_LEN);
    Fingerprint(digest)
}
