//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Resolution semantics on the wire: a `NotFound` outcome is 404, an
//! `Ambiguous` outcome is 409 with the colliding candidates, and a
//! rejected prefix is 422. Storage faults surface as 500 with the
//! operation name, never as a raw error dump.

use super::{
    AppState,
    types::{
        ChainParams, ChainResponse, ConsensusParams, ConsensusResponse, ErrorResponse,
        HealthResponse, OpenDebateRequest, OpenDebateResponse, RecordResponse, StatusResponse,
        SubmitRequest, SubmitResponse, VoteRequest, VoteResponse,
    },
};
use crate::authoring::{build_argument, build_concession, build_rebuttal, now_ts, resolve_unique};
use agon_core::{
    AgentId, AgonError, Archive, CloseRules, CloseVote, Collection, ContentHash, DebateSession,
    Resolution, SessionStatus, calculate_status, validate_vote,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

// =============================================================================
// FAULT MAPPING
// =============================================================================

/// Map a core fault onto an HTTP status.
fn fault_status(err: &AgonError) -> StatusCode {
    match err {
        AgonError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AgonError::BusinessRule(_) => StatusCode::CONFLICT,
        AgonError::Storage { .. }
        | AgonError::Serialization(_)
        | AgonError::Deserialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn fault_response(err: &AgonError) -> (StatusCode, Json<ErrorResponse>) {
    (fault_status(err), Json(ErrorResponse::new(err.to_string())))
}

/// Resolve a prefix, mapping the expected outcomes onto HTTP statuses.
fn resolve_or_respond(
    archive: &Archive,
    collection: Collection,
    prefix: &str,
) -> Result<ContentHash, (StatusCode, Json<ErrorResponse>)> {
    match archive.resolve(collection, prefix) {
        Ok(Resolution::Unique(hash)) => Ok(hash),
        Ok(Resolution::NotFound) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!(
                "no {} entry matches `{}`",
                collection, prefix
            ))),
        )),
        Ok(Resolution::Ambiguous(matches)) => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::ambiguous(
                format!("prefix `{}` is ambiguous; use a longer prefix", prefix),
                matches.iter().map(|m| m.as_str().to_string()).collect(),
            )),
        )),
        Err(e) => Err(fault_response(&e)),
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Get archive status.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let archive = state.archive.read().await;
    match archive.counts() {
        Ok(counts) => (
            StatusCode::OK,
            Json(StatusResponse {
                arguments: counts.arguments,
                simulations: counts.simulations,
                agents: counts.agents,
            }),
        )
            .into_response(),
        Err(e) => fault_response(&e).into_response(),
    }
}

// =============================================================================
// SUBMIT HANDLER
// =============================================================================

/// Submit a record.
pub async fn submit_handler(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return (
            fault_status(&e),
            Json(SubmitResponse::error(e.to_string())),
        );
    }

    let mut archive = state.archive.write().await;

    let built = match &request {
        SubmitRequest::Argument {
            debate,
            text,
            kind,
            supports,
            ..
        } => resolve_unique(&archive, Collection::Simulations, debate)
            .and_then(|session_key| {
                let supports = supports
                    .as_ref()
                    .map(|p| resolve_unique(&archive, Collection::Arguments, p))
                    .transpose()?;
                build_argument(
                    &archive,
                    &session_key,
                    request.author(),
                    text.clone(),
                    *kind,
                    supports,
                )
            }),
        SubmitRequest::Rebuttal {
            target, text, kind, ..
        } => resolve_unique(&archive, Collection::Arguments, target).and_then(|target_id| {
            build_rebuttal(&archive, &target_id, request.author(), text.clone(), *kind)
        }),
        SubmitRequest::Concession {
            target, text, kind, ..
        } => resolve_unique(&archive, Collection::Arguments, target).and_then(|target_id| {
            build_concession(&archive, &target_id, request.author(), text.clone(), *kind)
        }),
    };

    match built.and_then(|record| archive.put_record(&record)) {
        Ok(id) => (StatusCode::OK, Json(SubmitResponse::success(id.as_str()))),
        Err(e) => (
            fault_status(&e),
            Json(SubmitResponse::error(e.to_string())),
        ),
    }
}

// =============================================================================
// RECORD HANDLER
// =============================================================================

/// Resolve a prefix and load the record.
pub async fn record_handler(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> impl IntoResponse {
    let archive = state.archive.read().await;

    let id = match resolve_or_respond(&archive, Collection::Arguments, &prefix) {
        Ok(id) => id,
        Err(resp) => return resp.into_response(),
    };

    match archive.get_record(&id) {
        Ok(Some(record)) => (
            StatusCode::OK,
            Json(RecordResponse {
                id: id.as_str().to_string(),
                kind: record.kind().name().to_string(),
                author: record.author().as_str().to_string(),
                debate: record.debate().as_str().to_string(),
                target: record.target().map(|t| t.as_str().to_string()),
                text: record.text().to_string(),
                created_at: record.created_at(),
            }),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("no record {}", id.short()))),
        )
            .into_response(),
        Err(e) => fault_response(&e).into_response(),
    }
}

// =============================================================================
// CHAIN HANDLER
// =============================================================================

/// Build the relationship chain rooted at a record.
pub async fn chain_handler(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
    Query(params): Query<ChainParams>,
) -> impl IntoResponse {
    let archive = state.archive.read().await;

    let id = match resolve_or_respond(&archive, Collection::Arguments, &prefix) {
        Ok(id) => id,
        Err(resp) => return resp.into_response(),
    };

    let depth = params
        .depth
        .unwrap_or(agon_core::primitives::DEFAULT_CHAIN_DEPTH);

    match archive.build_chain(&id, depth) {
        Ok(Some(chain)) => (StatusCode::OK, Json(ChainResponse::from_chain(&chain))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("no record {}", id.short()))),
        )
            .into_response(),
        Err(e) => fault_response(&e).into_response(),
    }
}

// =============================================================================
// DEBATE HANDLER
// =============================================================================

/// Open a new debate session.
pub async fn open_debate_handler(
    State(state): State<AppState>,
    Json(request): Json<OpenDebateRequest>,
) -> impl IntoResponse {
    let created_at = match now_ts() {
        Ok(ts) => ts,
        Err(e) => {
            return (
                fault_status(&e),
                Json(OpenDebateResponse::error(e.to_string())),
            );
        }
    };

    let participants: Vec<AgentId> = request
        .participants
        .iter()
        .map(|name| AgentId::new(name))
        .collect();
    let session = DebateSession::new(&request.topic, participants, created_at);

    let mut archive = state.archive.write().await;
    match archive.put_session(&session) {
        Ok(id) => (
            StatusCode::OK,
            Json(OpenDebateResponse::success(id.as_str())),
        ),
        Err(e) => (
            fault_status(&e),
            Json(OpenDebateResponse::error(e.to_string())),
        ),
    }
}

// =============================================================================
// CONSENSUS HANDLER
// =============================================================================

/// Consensus status for a debate session.
pub async fn consensus_handler(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
    Query(params): Query<ConsensusParams>,
) -> impl IntoResponse {
    let archive = state.archive.read().await;

    let session_key = match resolve_or_respond(&archive, Collection::Simulations, &prefix) {
        Ok(id) => id,
        Err(resp) => return resp.into_response(),
    };

    let session = match archive.get_session(&session_key) {
        Ok(Some(session)) => session,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!(
                    "no session {}",
                    session_key.short()
                ))),
            )
                .into_response();
        }
        Err(e) => return fault_response(&e).into_response(),
    };

    let rules = match params.quorum {
        Some(quorum_permille) => CloseRules::Majority { quorum_permille },
        None => CloseRules::Unanimity,
    };
    let status = calculate_status(&session.participants, &session.votes, &rules);

    (
        StatusCode::OK,
        Json(ConsensusResponse {
            session: session_key.as_str().to_string(),
            topic: session.topic.clone(),
            status: session.status.name().to_string(),
            total: status.total,
            required: status.required,
            yes_votes: status.yes_votes,
            no_votes: status.no_votes,
            has_consensus: status.has_consensus,
            can_close: status.can_close,
            participation_permille: status.participation_permille,
        }),
    )
        .into_response()
}

// =============================================================================
// VOTE HANDLER
// =============================================================================

/// Cast a closing vote in a debate session.
pub async fn vote_handler(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
    Json(request): Json<VoteRequest>,
) -> impl IntoResponse {
    let mut archive = state.archive.write().await;

    let session_key = match resolve_or_respond(&archive, Collection::Simulations, &prefix) {
        Ok(id) => id,
        Err(resp) => return resp.into_response(),
    };

    let mut session = match archive.get_session(&session_key) {
        Ok(Some(session)) => session,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!(
                    "no session {}",
                    session_key.short()
                ))),
            )
                .into_response();
        }
        Err(e) => return fault_response(&e).into_response(),
    };

    let voter = AgentId::new(&request.agent);
    if let Err(e) = validate_vote(&session.participants, &session.votes, session.status, &voter)
    {
        return fault_response(&e).into_response();
    }

    let cast_at = match now_ts() {
        Ok(ts) => ts,
        Err(e) => return fault_response(&e).into_response(),
    };

    if session.status == SessionStatus::Active
        && session.status.can_transition(SessionStatus::Voting)
    {
        session.status = SessionStatus::Voting;
    }

    let mut vote = CloseVote::new(voter, request.choice, cast_at);
    vote.reason = request.reason.clone();
    session.votes.push(vote);

    if let Err(e) = archive.put_session(&session) {
        return fault_response(&e).into_response();
    }

    let status = calculate_status(&session.participants, &session.votes, &CloseRules::Unanimity);
    (
        StatusCode::OK,
        Json(VoteResponse {
            success: true,
            total: status.total,
            yes_votes: status.yes_votes,
            no_votes: status.no_votes,
            can_close: status.can_close,
        }),
    )
        .into_response()
}
