//! # Archive Primitives
//!
//! Hardcoded runtime constants for the Agon CORE.
//!
//! These values are compiled into the binary and are immutable at
//! runtime. Everything that bounds a computation or feeds the strength
//! heuristic lives here so the numbers are auditable in one place.

/// Length of a full content hash in lowercase hex characters.
///
/// BLAKE3 produces a 32-byte digest; rendered as hex that is 64 chars.
pub const HASH_HEX_LEN: usize = 64;

/// Minimum accepted length for a user-supplied hash prefix.
///
/// Shorter prefixes collide too easily to be useful for resolution and
/// are rejected as a validation fault rather than scanned.
pub const MIN_PREFIX_LEN: usize = 7;

/// Maximum number of colliding keys carried in an ambiguous resolution.
///
/// Enough for a diagnostic listing; the caller is expected to retry
/// with a longer prefix rather than page through matches.
pub const MAX_AMBIGUOUS_MATCHES: usize = 5;

/// Default expansion depth for chain construction.
pub const DEFAULT_CHAIN_DEPTH: usize = 10;

/// Hard ceiling for chain expansion depth.
///
/// Requests above this are clamped, not rejected. All traversals must
/// be computationally bounded.
pub const MAX_CHAIN_DEPTH: usize = 100;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for record body text (64KB).
///
/// Texts longer than this are rejected before hashing to prevent
/// memory exhaustion from malformed input.
pub const MAX_TEXT_LENGTH: usize = 65536;

/// Maximum length for a debate topic.
pub const MAX_TOPIC_LENGTH: usize = 1024;

/// Maximum number of participants in a single debate session.
pub const MAX_PARTICIPANTS: usize = 64;

// =============================================================================
// STRENGTH SCALE (permille)
// =============================================================================
//
// Edge strength is an integer in permille: 0..=1000 maps onto the
// conceptual [0, 1] interval (500 = 0.500). Integer arithmetic keeps
// the CORE free of floating point.

/// Upper bound of the strength scale (1000 = 1.0).
pub const STRENGTH_SCALE: u16 = 1000;

/// Base strength for a rebuttal edge (0.5).
pub const REBUTTAL_BASE_STRENGTH: u16 = 500;

/// Bonus when rebuttal and target argument kinds reinforce each other
/// (empirical vs empirical, logical vs deductive): +0.2.
pub const KIND_MATCH_BONUS: u16 = 200;

/// Cap on the text-length-ratio adjustment: +/-0.1.
pub const LENGTH_RATIO_CAP: i64 = 100;

/// Strength of a full concession edge (1.0).
pub const CONCESSION_FULL_STRENGTH: u16 = 1000;

/// Strength of a partial concession edge (0.6).
pub const CONCESSION_PARTIAL_STRENGTH: u16 = 600;

/// Strength of a conditional concession edge (0.4).
pub const CONCESSION_CONDITIONAL_STRENGTH: u16 = 400;

/// Fixed strength for a support edge (0.5).
pub const SUPPORT_STRENGTH: u16 = 500;
