//! # Archive Records
//!
//! The immutable, content-addressed payloads the archive persists.
//!
//! Record kinds are a tagged enum with an explicit discriminant rather
//! than duck-typing on field presence — an argument and a rebuttal may
//! share field names without ambiguity. Records are created once by
//! upstream construction logic, handed to the store, and never mutated.
//!
//! `DebateSession` and `AgentProfile` are supplementary payloads for
//! the `simulations` and `agents` collections; the store treats them
//! as opaque bytes just like argument records.

use crate::consensus::{CloseVote, SessionStatus};
use crate::hashing;
use crate::primitives::{MAX_PARTICIPANTS, MAX_TEXT_LENGTH, MAX_TOPIC_LENGTH};
use crate::types::{AgentId, AgonError, ContentHash, DebateId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// KIND DISCRIMINANTS
// =============================================================================

/// Reasoning mode of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentKind {
    /// Conclusion follows necessarily from premises.
    Deductive,
    /// Generalization from observed cases.
    Inductive,
    /// Grounded in observation or data.
    Empirical,
    /// Reasoning by structural similarity.
    Analogical,
}

impl ArgumentKind {
    /// Wire name of the kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Deductive => "deductive",
            Self::Inductive => "inductive",
            Self::Empirical => "empirical",
            Self::Analogical => "analogical",
        }
    }
}

/// Mode of attack of a rebuttal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuttalKind {
    /// Attacks the inference itself.
    Logical,
    /// Attacks with counter-evidence.
    Empirical,
    /// Attacks the framing or applicability.
    Contextual,
}

impl RebuttalKind {
    /// Wire name of the kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Logical => "logical",
            Self::Empirical => "empirical",
            Self::Contextual => "contextual",
        }
    }
}

/// Degree of a concession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcessionKind {
    /// The point is granted entirely.
    Full,
    /// The point is granted in part.
    Partial,
    /// The point is granted under stated conditions.
    Conditional,
}

impl ConcessionKind {
    /// Wire name of the kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
            Self::Conditional => "conditional",
        }
    }
}

/// Discriminant over the three record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Argument,
    Rebuttal,
    Concession,
}

impl RecordKind {
    /// Wire name of the kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Argument => "argument",
            Self::Rebuttal => "rebuttal",
            Self::Concession => "concession",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// RECORD PAYLOADS
// =============================================================================

/// A positional argument within a debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// The argument body.
    pub text: String,
    /// Reasoning mode.
    pub kind: ArgumentKind,
    /// Explicit in-session ordering; storage itself implies no order.
    pub sequence: u64,
    /// Optional argument this one supports (yields a `Supports` edge).
    pub supports: Option<ContentHash>,
    /// Authoring participant.
    pub author: AgentId,
    /// Containing debate session.
    pub debate: DebateId,
    /// Unix timestamp assigned upstream.
    pub created_at: u64,
}

/// A rebuttal directed at an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rebuttal {
    /// The record being rebutted.
    pub target: ContentHash,
    /// The rebuttal body.
    pub text: String,
    /// Mode of attack.
    pub kind: RebuttalKind,
    /// Authoring participant.
    pub author: AgentId,
    /// Containing debate session.
    pub debate: DebateId,
    /// Unix timestamp assigned upstream.
    pub created_at: u64,
}

/// A concession directed at an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concession {
    /// The record being conceded to.
    pub target: ContentHash,
    /// Degree of the concession.
    pub kind: ConcessionKind,
    /// The concession body.
    pub text: String,
    /// Authoring participant.
    pub author: AgentId,
    /// Containing debate session.
    pub debate: DebateId,
    /// Unix timestamp assigned upstream.
    pub created_at: u64,
}

/// An immutable archive record, tagged by kind.
///
/// Identity = BLAKE3 of the canonical postcard encoding of the whole
/// record (kind-specific fields, author, debate, creation time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Record {
    Argument(Argument),
    Rebuttal(Rebuttal),
    Concession(Concession),
}

impl Record {
    /// The kind discriminant.
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Argument(_) => RecordKind::Argument,
            Self::Rebuttal(_) => RecordKind::Rebuttal,
            Self::Concession(_) => RecordKind::Concession,
        }
    }

    /// Authoring participant.
    #[must_use]
    pub fn author(&self) -> &AgentId {
        match self {
            Self::Argument(a) => &a.author,
            Self::Rebuttal(r) => &r.author,
            Self::Concession(c) => &c.author,
        }
    }

    /// Containing debate session.
    #[must_use]
    pub fn debate(&self) -> &DebateId {
        match self {
            Self::Argument(a) => &a.debate,
            Self::Rebuttal(r) => &r.debate,
            Self::Concession(c) => &c.debate,
        }
    }

    /// The record body text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Argument(a) => &a.text,
            Self::Rebuttal(r) => &r.text,
            Self::Concession(c) => &c.text,
        }
    }

    /// The record this one is directed at, if any.
    ///
    /// Rebuttals and concessions always carry a target; arguments only
    /// when they explicitly support another argument. Edge derivation
    /// keys off this accessor.
    #[must_use]
    pub fn target(&self) -> Option<&ContentHash> {
        match self {
            Self::Argument(a) => a.supports.as_ref(),
            Self::Rebuttal(r) => Some(&r.target),
            Self::Concession(c) => Some(&c.target),
        }
    }

    /// Creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> u64 {
        match self {
            Self::Argument(a) => a.created_at,
            Self::Rebuttal(r) => r.created_at,
            Self::Concession(c) => c.created_at,
        }
    }

    /// Validate the record before hashing and storage.
    ///
    /// Bounds mirror the archive's input limits: non-empty body within
    /// `MAX_TEXT_LENGTH`, non-empty author and debate identifiers.
    pub fn validate(&self) -> Result<(), AgonError> {
        let text = self.text();
        if text.is_empty() {
            return Err(AgonError::Validation("record text is empty".to_string()));
        }
        if text.len() > MAX_TEXT_LENGTH {
            return Err(AgonError::Validation(format!(
                "record text {} bytes exceeds maximum {}",
                text.len(),
                MAX_TEXT_LENGTH
            )));
        }
        if self.author().as_str().is_empty() {
            return Err(AgonError::Validation("record author is empty".to_string()));
        }
        if self.debate().as_str().is_empty() {
            return Err(AgonError::Validation(
                "record debate id is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Canonical storage encoding.
    pub fn encode(&self) -> Result<Vec<u8>, AgonError> {
        hashing::canonical_bytes(self)
    }

    /// Decode a record from its canonical encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self, AgonError> {
        postcard::from_bytes(bytes).map_err(|e| AgonError::Deserialization(e.to_string()))
    }

    /// The record's content-addressed identity.
    pub fn content_hash(&self) -> Result<ContentHash, AgonError> {
        hashing::content_hash(self)
    }
}

// =============================================================================
// DEBATE SESSION (simulations collection)
// =============================================================================

/// Persisted state of a debate session.
///
/// The session key is the hash of its *immutable creation fields*
/// (topic, participants, creation time) so status and vote updates
/// rewrite the payload under a stable key. The mutable tail is the
/// session repository's concern; the CORE consensus calculator only
/// ever sees the participant and vote lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateSession {
    /// The debate topic.
    pub topic: String,
    /// Registered participants.
    pub participants: Vec<AgentId>,
    /// Closing-phase status.
    pub status: SessionStatus,
    /// Votes cast in the current round.
    pub votes: Vec<CloseVote>,
    /// Unix timestamp assigned upstream.
    pub created_at: u64,
}

impl DebateSession {
    /// Open a new active session with no votes.
    #[must_use]
    pub fn new(topic: impl Into<String>, participants: Vec<AgentId>, created_at: u64) -> Self {
        Self {
            topic: topic.into(),
            participants,
            status: SessionStatus::Active,
            votes: Vec::new(),
            created_at,
        }
    }

    /// Stable identity: hash of the immutable creation fields only.
    pub fn identity_hash(&self) -> Result<ContentHash, AgonError> {
        hashing::content_hash(&(&self.topic, &self.participants, self.created_at))
    }

    /// The debate identifier argument records reference.
    pub fn debate_id(&self) -> Result<DebateId, AgonError> {
        Ok(DebateId::new(self.identity_hash()?.as_str()))
    }

    /// Validate the session before storage.
    pub fn validate(&self) -> Result<(), AgonError> {
        if self.topic.is_empty() {
            return Err(AgonError::Validation("session topic is empty".to_string()));
        }
        if self.topic.len() > MAX_TOPIC_LENGTH {
            return Err(AgonError::Validation(format!(
                "session topic {} bytes exceeds maximum {}",
                self.topic.len(),
                MAX_TOPIC_LENGTH
            )));
        }
        if self.participants.is_empty() {
            return Err(AgonError::Validation(
                "session has no participants".to_string(),
            ));
        }
        if self.participants.len() > MAX_PARTICIPANTS {
            return Err(AgonError::Validation(format!(
                "participant count {} exceeds maximum {}",
                self.participants.len(),
                MAX_PARTICIPANTS
            )));
        }
        let unique: BTreeSet<&AgentId> = self.participants.iter().collect();
        if unique.len() != self.participants.len() {
            return Err(AgonError::Validation(
                "duplicate participants in session".to_string(),
            ));
        }
        Ok(())
    }

    /// Canonical storage encoding.
    pub fn encode(&self) -> Result<Vec<u8>, AgonError> {
        hashing::canonical_bytes(self)
    }

    /// Decode a session from its canonical encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self, AgonError> {
        postcard::from_bytes(bytes).map_err(|e| AgonError::Deserialization(e.to_string()))
    }
}

// =============================================================================
// AGENT PROFILE (agents collection)
// =============================================================================

/// A registered debate participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Display name; doubles as the `AgentId` carried in records.
    pub name: String,
    /// Optional declared stance.
    pub stance: Option<String>,
    /// Unix timestamp assigned upstream.
    pub created_at: u64,
}

impl AgentProfile {
    /// Create a profile.
    #[must_use]
    pub fn new(name: impl Into<String>, stance: Option<String>, created_at: u64) -> Self {
        Self {
            name: name.into(),
            stance,
            created_at,
        }
    }

    /// The participant identifier this profile registers.
    #[must_use]
    pub fn agent_id(&self) -> AgentId {
        AgentId::new(&self.name)
    }

    /// Validate the profile before storage.
    pub fn validate(&self) -> Result<(), AgonError> {
        if self.name.is_empty() {
            return Err(AgonError::Validation("agent name is empty".to_string()));
        }
        if self.name.len() > MAX_TOPIC_LENGTH {
            return Err(AgonError::Validation(format!(
                "agent name {} bytes exceeds maximum {}",
                self.name.len(),
                MAX_TOPIC_LENGTH
            )));
        }
        Ok(())
    }

    /// Canonical storage encoding.
    pub fn encode(&self) -> Result<Vec<u8>, AgonError> {
        hashing::canonical_bytes(self)
    }

    /// Decode a profile from its canonical encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self, AgonError> {
        postcard::from_bytes(bytes).map_err(|e| AgonError::Deserialization(e.to_string()))
    }

    /// Content-addressed identity of the profile.
    pub fn content_hash(&self) -> Result<ContentHash, AgonError> {
        hashing::content_hash(self)
    }
}

// =============================================================================
// TESTS
// =============================================================================
