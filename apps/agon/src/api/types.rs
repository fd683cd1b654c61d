//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use agon_core::{
    AgentId, AgonError, ArgumentKind, Chain, ConcessionKind, RebuttalKind, VoteChoice,
    primitives::MAX_TEXT_LENGTH,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Archive status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub arguments: usize,
    pub simulations: usize,
    pub agents: usize,
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Uniform error body. Expected resolution outcomes get their own
/// variants in the handlers; this carries everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub candidates: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            candidates: None,
        }
    }

    pub fn ambiguous(msg: impl Into<String>, candidates: Vec<String>) -> Self {
        Self {
            error: msg.into(),
            candidates: Some(candidates),
        }
    }
}

// =============================================================================
// SUBMIT REQUEST/RESPONSE
// =============================================================================

/// Record submission request (tagged union).
///
/// Rebuttals and concessions name their target by hash prefix and
/// inherit its debate session; arguments name the session directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmitRequest {
    Argument {
        debate: String,
        author: String,
        text: String,
        kind: ArgumentKind,
        #[serde(default)]
        supports: Option<String>,
    },
    Rebuttal {
        target: String,
        author: String,
        text: String,
        kind: RebuttalKind,
    },
    Concession {
        target: String,
        author: String,
        text: String,
        kind: ConcessionKind,
    },
}

impl SubmitRequest {
    /// The request's author identifier.
    #[must_use]
    pub fn author(&self) -> AgentId {
        match self {
            Self::Argument { author, .. }
            | Self::Rebuttal { author, .. }
            | Self::Concession { author, .. } => AgentId::new(author),
        }
    }

    /// Boundary validation before construction: non-empty body within
    /// the archive's text limit, non-empty author.
    pub fn validate(&self) -> Result<(), AgonError> {
        let (author, text) = match self {
            Self::Argument { author, text, .. }
            | Self::Rebuttal { author, text, .. }
            | Self::Concession { author, text, .. } => (author, text),
        };
        if author.is_empty() {
            return Err(AgonError::Validation("author is empty".to_string()));
        }
        if text.is_empty() {
            return Err(AgonError::Validation("text is empty".to_string()));
        }
        if text.len() > MAX_TEXT_LENGTH {
            return Err(AgonError::Validation(format!(
                "text length {} exceeds maximum {} bytes",
                text.len(),
                MAX_TEXT_LENGTH
            )));
        }
        Ok(())
    }
}

/// Record submission response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub id: Option<String>,
    pub error: Option<String>,
}

impl SubmitResponse {
    pub fn success(id: impl Into<String>) -> Self {
        Self {
            success: true,
            id: Some(id.into()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// RECORD RESPONSE
// =============================================================================

/// A resolved, loaded record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResponse {
    pub id: String,
    pub kind: String,
    pub author: String,
    pub debate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub target: Option<String>,
    pub text: String,
    pub created_at: u64,
}

// =============================================================================
// CHAIN RESPONSE
// =============================================================================

/// One chain node in JSON form; children are arena indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainNodeJson {
    pub id: String,
    pub kind: String,
    pub author: String,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub edge_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub strength_permille: Option<u16>,
    pub children: Vec<usize>,
}

/// Chain construction response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainResponse {
    pub root: usize,
    pub total_nodes: usize,
    pub max_depth_reached: usize,
    pub nodes: Vec<ChainNodeJson>,
}

impl ChainResponse {
    /// Flatten a chain arena into the JSON shape.
    #[must_use]
    pub fn from_chain(chain: &Chain) -> Self {
        let nodes = chain
            .nodes
            .iter()
            .map(|n| ChainNodeJson {
                id: n.id.as_str().to_string(),
                kind: n.kind.name().to_string(),
                author: n.author.as_str().to_string(),
                depth: n.depth,
                edge_kind: n.edge.map(|(k, _)| k.name().to_string()),
                strength_permille: n.edge.map(|(_, s)| s.permille()),
                children: n.children.clone(),
            })
            .collect();
        Self {
            root: chain.root,
            total_nodes: chain.stats.total_nodes,
            max_depth_reached: chain.stats.max_depth_reached,
            nodes,
        }
    }
}

/// Query parameters for the chain endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainParams {
    #[serde(default)]
    pub depth: Option<usize>,
}

// =============================================================================
// DEBATES
// =============================================================================

/// Debate session creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenDebateRequest {
    pub topic: String,
    pub participants: Vec<String>,
}

/// Debate session creation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenDebateResponse {
    pub success: bool,
    pub id: Option<String>,
    pub error: Option<String>,
}

impl OpenDebateResponse {
    pub fn success(id: impl Into<String>) -> Self {
        Self {
            success: true,
            id: Some(id.into()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// CONSENSUS / VOTES
// =============================================================================

/// Consensus status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusResponse {
    pub session: String,
    pub topic: String,
    pub status: String,
    pub total: usize,
    pub required: usize,
    pub yes_votes: usize,
    pub no_votes: usize,
    pub has_consensus: bool,
    pub can_close: bool,
    pub participation_permille: u16,
}

/// Query parameters for the consensus endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsensusParams {
    /// Majority quorum in permille; unanimity when absent.
    #[serde(default)]
    pub quorum: Option<u16>,
}

/// Closing-vote request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub agent: String,
    pub choice: VoteChoice,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Closing-vote response: the tally after the vote is recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResponse {
    pub success: bool,
    pub total: usize,
    pub yes_votes: usize,
    pub no_votes: usize,
    pub can_close: bool,
}
