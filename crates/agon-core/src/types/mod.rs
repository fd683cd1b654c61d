//! # Core Type Definitions
//!
//! This module contains the foundational types for the Agon archive:
//! - Content-addressed identifiers (`ContentHash`)
//! - Opaque upstream identifiers (`AgentId`, `DebateId`)
//! - The permille strength scale (`Strength`)
//! - Error taxonomy (`AgonError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Use saturating arithmetic to prevent overflow

use crate::primitives::{HASH_HEX_LEN, STRENGTH_SCALE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// CONTENT HASH
// =============================================================================

/// A full content hash: 64 lowercase hex characters of a BLAKE3 digest.
///
/// This is the storage key and the identity of a record. Two records
/// with byte-identical canonical content always carry the same hash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(String);

impl ContentHash {
    /// Parse a full hash from hex, validating length and alphabet.
    ///
    /// Uppercase input is normalized to lowercase so hashes compare
    /// and prefix-match consistently.
    pub fn from_hex(hex: impl Into<String>) -> Result<Self, AgonError> {
        let hex: String = hex.into();
        if hex.len() != HASH_HEX_LEN {
            return Err(AgonError::Validation(format!(
                "content hash must be {} hex chars, got {}",
                HASH_HEX_LEN,
                hex.len()
            )));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AgonError::Validation(
                "content hash contains non-hex characters".to_string(),
            ));
        }
        Ok(Self(hex.to_ascii_lowercase()))
    }

    /// Wrap hex that is already known to be a valid digest rendering
    /// (hasher output, keys read back from the store).
    pub(crate) fn trusted(hex: String) -> Self {
        Self(hex)
    }

    /// The full hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters for compact display.
    #[must_use]
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// UPSTREAM IDENTIFIERS
// =============================================================================

/// Identifier of a debate participant, assigned upstream.
///
/// The CORE treats this as opaque; it only ever compares for equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    /// Create a new agent identifier.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the debate session a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DebateId(pub String);

impl DebateId {
    /// Create a new debate identifier.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DebateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// STRENGTH (permille)
// =============================================================================

/// Edge strength in permille: 0..=1000 maps onto conceptual [0, 1].
///
/// Integer permille keeps the CORE deterministic (no floating point);
/// 500 renders as `0.500`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Strength(u16);

impl Strength {
    /// Create a strength, clamping to the 0..=1000 scale.
    #[must_use]
    pub const fn new(permille: u16) -> Self {
        if permille > STRENGTH_SCALE {
            Self(STRENGTH_SCALE)
        } else {
            Self(permille)
        }
    }

    /// Clamp a signed permille value onto the scale.
    #[must_use]
    pub fn from_signed(permille: i64) -> Self {
        Self(permille.clamp(0, STRENGTH_SCALE as i64) as u16)
    }

    /// Raw permille value.
    #[must_use]
    pub const fn permille(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:03}", self.0 / 1000, self.0 % 1000)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Agon archive.
///
/// - No silent failures
/// - Use `Result<T, AgonError>` for fallible operations
/// - The CORE never panics; all errors are recoverable
///
/// Expected outcomes (a key that is absent, an ambiguous prefix) are
/// modeled as values, not errors — see `Resolution` and the
/// `Option`-returning store reads.
#[derive(Debug, Error)]
pub enum AgonError {
    /// An I/O-layer failure, carrying the name of the failing operation.
    /// Surfaced to the caller unchanged; never retried internally.
    #[error("storage fault in `{op}`: {detail}")]
    Storage { op: &'static str, detail: String },

    /// Malformed input: short prefix, non-hex characters, oversized
    /// text, cross-session link.
    #[error("validation: {0}")]
    Validation(String),

    /// A domain rule was violated: cycle detected, duplicate vote,
    /// vote after close, self-rebuttal.
    #[error("business rule: {0}")]
    BusinessRule(String),

    /// A serialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A deserialization error occurred.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl AgonError {
    /// Build a storage fault from any displayable error source.
    pub fn storage(op: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Storage {
            op,
            detail: err.to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
