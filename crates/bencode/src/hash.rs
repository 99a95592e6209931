//! SHA-256 content hashing of encoded values.
//!
//! The encoder streams straight into the hasher; no intermediate buffer is
//! built.

use sha2::{Digest, Sha256};

use crate::codec::{EncodeOptions, Encoder};
use crate::error::EncodeError;
use crate::model::Value;

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// Returns the SHA-256 of the canonical encoding of `value`.
///
/// Two values that differ only in dictionary key order hash the same.
pub fn content_hash(value: &Value) -> Result<Hash, EncodeError> {
    digest_with_options(value, EncodeOptions::canonical())
}

/// Returns the SHA-256 of `value` encoded with `options`.
///
/// With default options dictionaries keep their stored order, so hashing a
/// decoded value reproduces the hash of its source bytes as long as those
/// were written in this codec's normal form (no leading zeros in numbers).
pub fn digest_with_options(value: &Value, options: EncodeOptions) -> Result<Hash, EncodeError> {
    let mut encoder = Encoder::with_options(Sha256::new(), options);
    encoder.encode(value)?;
    let digest = encoder.into_inner().finalize();

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&digest);
    Ok(hash)
}

/// Formats a digest as lowercase hex.
pub fn to_hex(hash: &Hash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}
