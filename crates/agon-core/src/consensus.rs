//! # Consensus Vote Calculator
//!
//! Aggregates per-participant close-votes against the full participant
//! set of a debate and decides whether the session may close.
//!
//! The calculator is a pure function over data handed to it: it never
//! touches storage and never mutates anything. Vote and session state
//! are persisted by the session repository in the app layer.
//!
//! ## Status model
//!
//! A session's closing phase runs `Active -> Voting -> Closed`, with
//! `Voting -> Active` permitted as a rollback and `Closed` terminal.

use crate::primitives::STRENGTH_SCALE;
use crate::types::{AgentId, AgonError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// SESSION STATUS
// =============================================================================

/// Lifecycle status of a debate session's closing phase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The debate is open for arguments.
    #[default]
    Active,
    /// A closing vote is underway.
    Voting,
    /// The debate is closed. Terminal.
    Closed,
}

impl SessionStatus {
    /// Human-readable status name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Voting => "voting",
            Self::Closed => "closed",
        }
    }

    /// Whether the status machine permits moving to `next`.
    ///
    /// `Voting -> Active` is the rollback path; `Closed` has no
    /// outgoing transitions.
    #[must_use]
    pub fn can_transition(self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Voting)
                | (Self::Voting, Self::Active)
                | (Self::Voting, Self::Closed)
        )
    }

    /// Whether this status is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// VOTES
// =============================================================================

/// A participant's position in a closing vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    /// In favor of closing.
    Yes,
    /// Against closing.
    No,
}

impl VoteChoice {
    /// Wire name of the choice.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

/// One participant's close-vote, at most one per round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseVote {
    /// The voting participant.
    pub agent: AgentId,
    /// The position taken.
    pub choice: VoteChoice,
    /// Optional free-form justification.
    pub reason: Option<String>,
    /// Unix timestamp supplied by the caller.
    pub cast_at: u64,
}

impl CloseVote {
    /// Create a vote with no stated reason.
    #[must_use]
    pub fn new(agent: AgentId, choice: VoteChoice, cast_at: u64) -> Self {
        Self {
            agent,
            choice,
            reason: None,
            cast_at,
        }
    }
}

// =============================================================================
// CLOSE RULES
// =============================================================================

/// Decision rule for closing a session.
///
/// Unanimity is the default; the majority rule is reachable through
/// the same parameter rather than a separate code path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CloseRules {
    /// Every participant must vote, and every vote must be yes.
    #[default]
    Unanimity,
    /// At least `quorum_permille` of participants must vote yes
    /// (permille of the participant count, rounded up).
    Majority { quorum_permille: u16 },
}

impl CloseRules {
    /// Number of yes votes required for the given participant count.
    #[must_use]
    pub fn required(&self, participant_count: usize) -> usize {
        match self {
            Self::Unanimity => participant_count,
            Self::Majority { quorum_permille } => {
                let quorum = (*quorum_permille).min(STRENGTH_SCALE) as usize;
                let scale = STRENGTH_SCALE as usize;
                participant_count
                    .saturating_mul(quorum)
                    .div_ceil(scale)
                    .clamp(usize::from(participant_count > 0), participant_count)
            }
        }
    }
}

// =============================================================================
// CONSENSUS STATUS
// =============================================================================

/// Derived closing status for one voting round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusStatus {
    /// Votes cast by registered participants.
    pub total: usize,
    /// Yes votes needed under the active rule.
    pub required: usize,
    /// Yes votes cast.
    pub yes_votes: usize,
    /// No votes cast.
    pub no_votes: usize,
    /// Whether the votes cast so far all point toward closing
    /// (at least one vote, no dissent).
    pub has_consensus: bool,
    /// Whether the rule is fully satisfied and the session may close.
    pub can_close: bool,
    /// Participation as permille of the participant set (0..=1000).
    pub participation_permille: u16,
}

/// Aggregate votes against the participant set under the given rule.
///
/// Votes from agents outside the participant set are ignored here —
/// `validate_vote` is the gate that rejects them before they are
/// recorded. Duplicate votes are likewise a caller-level precondition.
#[must_use]
pub fn calculate_status(
    participants: &[AgentId],
    votes: &[CloseVote],
    rules: &CloseRules,
) -> ConsensusStatus {
    let registered: BTreeSet<&AgentId> = participants.iter().collect();

    let mut yes_votes = 0usize;
    let mut no_votes = 0usize;
    for vote in votes {
        if !registered.contains(&vote.agent) {
            continue;
        }
        match vote.choice {
            VoteChoice::Yes => yes_votes = yes_votes.saturating_add(1),
            VoteChoice::No => no_votes = no_votes.saturating_add(1),
        }
    }

    let total = yes_votes.saturating_add(no_votes);
    let required = rules.required(participants.len());

    let has_consensus = total > 0 && no_votes == 0;
    let can_close = match rules {
        CloseRules::Unanimity => no_votes == 0 && yes_votes == participants.len(),
        CloseRules::Majority { .. } => yes_votes >= required && required > 0,
    };

    let participation_permille = if participants.is_empty() {
        0
    } else {
        total
            .saturating_mul(STRENGTH_SCALE as usize)
            .checked_div(participants.len())
            .unwrap_or(0)
            .min(STRENGTH_SCALE as usize) as u16
    };

    ConsensusStatus {
        total,
        required,
        yes_votes,
        no_votes,
        has_consensus,
        can_close,
        participation_permille,
    }
}

/// Validate that `voter` may cast a vote in the current round.
///
/// Rejections are business-rule faults, not silent drops:
/// - the session must not be closed,
/// - the voter must be a registered participant,
/// - a participant may not vote twice in the same round.
pub fn validate_vote(
    participants: &[AgentId],
    votes: &[CloseVote],
    status: SessionStatus,
    voter: &AgentId,
) -> Result<(), AgonError> {
    if status.is_terminal() {
        return Err(AgonError::BusinessRule(
            "voting is closed for this session".to_string(),
        ));
    }
    if !participants.contains(voter) {
        return Err(AgonError::BusinessRule(format!(
            "agent `{}` is not a registered participant",
            voter
        )));
    }
    if votes.iter().any(|v| v.agent == *voter) {
        return Err(AgonError::BusinessRule(format!(
            "agent `{}` has already voted in this round",
            voter
        )));
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
