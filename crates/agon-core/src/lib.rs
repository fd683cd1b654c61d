//! # agon-core
//!
//! The content-addressed archive engine for Agon - THE ARCHIVE.
//!
//! This crate persists immutable argument records under BLAKE3 content
//! hashes and resolves, disambiguates, and traverses the directed
//! relationships (rebuttal, concession, support) between them.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Is the ONLY place where persistence exists (stateful)
//! - Has NO async, NO network dependencies (pure Rust)
//! - Uses integer arithmetic only; strength and participation are
//!   permille (0..=1000), never floating point
//! - Derives relationship edges by scanning records on demand; edges
//!   are never persisted as first-class state

// =============================================================================
// MODULES
// =============================================================================

pub mod archive;
pub mod chain;
pub mod consensus;
pub mod hashing;
pub mod primitives;
pub mod records;
pub mod resolver;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{AgentId, AgonError, ContentHash, DebateId, Strength};

// =============================================================================
// RE-EXPORTS: Archive Engine
// =============================================================================

pub use archive::{Archive, ArchiveCounts, StorageBackend};
pub use chain::{Chain, ChainNode, ChainStats, Edge, EdgeKind, audit_cycles, validate_link};
pub use consensus::{
    CloseRules, CloseVote, ConsensusStatus, SessionStatus, VoteChoice, calculate_status,
    validate_vote,
};
pub use hashing::{canonical_bytes, content_hash, hash_bytes};
pub use records::{
    AgentProfile, Argument, ArgumentKind, Concession, ConcessionKind, DebateSession, Rebuttal,
    RebuttalKind, Record, RecordKind,
};
pub use resolver::{Resolution, resolve};
pub use store::{Collection, MemoryStore, ObjectStore, RedbStore};
