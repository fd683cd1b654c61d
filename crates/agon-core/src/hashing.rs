//! # Content Hashing
//!
//! Deterministic identity for archive records.
//!
//! A record's identity is the BLAKE3 digest of its *canonical
//! encoding*: the postcard serialization of the typed value. Postcard
//! writes struct fields in declaration order with no keys, padding, or
//! map reordering, so canonicalization holds by construction — two
//! values with identical logical content always produce identical
//! bytes, and therefore identical hashes.

use crate::types::{AgonError, ContentHash};
use serde::Serialize;

/// Canonical byte encoding of a value (postcard).
///
/// This is both the hashing pre-image and the storage payload format.
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, AgonError> {
    postcard::to_allocvec(value).map_err(|e| AgonError::Serialization(e.to_string()))
}

/// BLAKE3 hash of raw bytes, rendered as a 64-char lowercase hex key.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> ContentHash {
    ContentHash::trusted(blake3::hash(data).to_hex().to_string())
}

/// Content hash of a value: BLAKE3 over its canonical encoding.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<ContentHash, AgonError> {
    Ok(hash_bytes(&canonical_bytes(value)?))
}

// =============================================================================
// TESTS
// =============================================================================
