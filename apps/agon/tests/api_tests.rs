//! Integration tests for the Agon HTTP API.
//!
//! Uses axum-test to exercise the handlers without starting a real
//! server.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use agon::api::{
    AppState, ChainResponse, ConsensusResponse, ErrorResponse, HealthResponse,
    OpenDebateResponse, RecordResponse, StatusResponse, SubmitResponse, VoteResponse,
    create_router,
};
use agon_core::Archive;
use axum_test::TestServer;
use serde_json::json;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Create a test server over a fresh in-memory archive.
fn create_test_server() -> TestServer {
    let archive = Archive::new();
    let state = AppState::new(archive);
    let router = create_router(state);
    TestServer::new(router).unwrap()
}

/// Open a debate with the given participants; returns the session id.
async fn open_debate(server: &TestServer, topic: &str, participants: &[&str]) -> String {
    let response = server
        .post("/debates")
        .json(&json!({ "topic": topic, "participants": participants }))
        .await;
    response.assert_status_ok();
    let body: OpenDebateResponse = response.json();
    assert!(body.success);
    body.id.unwrap()
}

/// Submit an argument; returns its content hash.
async fn submit_argument(server: &TestServer, debate: &str, author: &str, text: &str) -> String {
    let response = server
        .post("/arguments")
        .json(&json!({
            "type": "argument",
            "debate": debate,
            "author": author,
            "text": text,
            "kind": "empirical"
        }))
        .await;
    response.assert_status_ok();
    let body: SubmitResponse = response.json();
    assert!(body.success, "submit failed: {:?}", body.error);
    body.id.unwrap()
}

// =============================================================================
// HEALTH & STATUS
// =============================================================================

#[tokio::test]
async fn health_returns_ok() {
    let server = create_test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: HealthResponse = response.json();
    assert_eq!(body.status, "ok");
    assert!(!body.version.is_empty());
}

#[tokio::test]
async fn status_counts_collections() {
    let server = create_test_server();

    let debate = open_debate(&server, "carbon pricing", &["alice", "bob"]).await;
    submit_argument(&server, &debate, "alice", "carbon pricing shifts demand").await;

    let response = server.get("/status").await;
    response.assert_status_ok();

    let body: StatusResponse = response.json();
    assert_eq!(body.arguments, 1);
    assert_eq!(body.simulations, 1);
    assert_eq!(body.agents, 0);
}

// =============================================================================
// SUBMISSION & RESOLUTION
// =============================================================================

#[tokio::test]
async fn submit_and_resolve_argument() {
    let server = create_test_server();
    let debate = open_debate(&server, "carbon pricing", &["alice", "bob"]).await;

    let id = submit_argument(&server, &debate, "alice", "carbon pricing shifts demand").await;
    assert_eq!(id.len(), 64);

    // Resolve by a short prefix.
    let response = server.get(&format!("/arguments/{}", &id[..10])).await;
    response.assert_status_ok();

    let body: RecordResponse = response.json();
    assert_eq!(body.id, id);
    assert_eq!(body.kind, "argument");
    assert_eq!(body.author, "alice");
    assert_eq!(body.text, "carbon pricing shifts demand");
}

#[tokio::test]
async fn unknown_prefix_is_404() {
    let server = create_test_server();

    let response = server.get("/arguments/0123456").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);

    let body: ErrorResponse = response.json();
    assert!(body.error.contains("no arguments entry"));
}

#[tokio::test]
async fn short_prefix_is_422() {
    let server = create_test_server();

    let response = server.get("/arguments/abc12").await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn empty_text_is_422() {
    let server = create_test_server();
    let debate = open_debate(&server, "carbon pricing", &["alice"]).await;

    let response = server
        .post("/arguments")
        .json(&json!({
            "type": "argument",
            "debate": debate,
            "author": "alice",
            "text": "",
            "kind": "empirical"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn self_rebuttal_is_409() {
    let server = create_test_server();
    let debate = open_debate(&server, "carbon pricing", &["alice", "bob"]).await;
    let target = submit_argument(&server, &debate, "alice", "carbon pricing shifts demand").await;

    let response = server
        .post("/arguments")
        .json(&json!({
            "type": "rebuttal",
            "target": &target[..12],
            "author": "alice",
            "text": "rebutting myself",
            "kind": "logical"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn rebuttal_roundtrip() {
    let server = create_test_server();
    let debate = open_debate(&server, "carbon pricing", &["alice", "bob"]).await;
    let target = submit_argument(&server, &debate, "alice", "carbon pricing shifts demand").await;

    let response = server
        .post("/arguments")
        .json(&json!({
            "type": "rebuttal",
            "target": &target[..12],
            "author": "bob",
            "text": "demand data says otherwise",
            "kind": "empirical"
        }))
        .await;
    response.assert_status_ok();
    let body: SubmitResponse = response.json();
    let reb_id = body.id.unwrap();

    let response = server.get(&format!("/arguments/{}", &reb_id[..10])).await;
    response.assert_status_ok();
    let body: RecordResponse = response.json();
    assert_eq!(body.kind, "rebuttal");
    assert_eq!(body.target.as_deref(), Some(target.as_str()));
}

// =============================================================================
// CHAIN
// =============================================================================

#[tokio::test]
async fn chain_expands_descendants() {
    let server = create_test_server();
    let debate = open_debate(&server, "carbon pricing", &["alice", "bob"]).await;
    let root = submit_argument(&server, &debate, "alice", "carbon pricing shifts demand").await;

    server
        .post("/arguments")
        .json(&json!({
            "type": "rebuttal",
            "target": &root[..12],
            "author": "bob",
            "text": "demand is inelastic here",
            "kind": "empirical"
        }))
        .await
        .assert_status_ok();

    let response = server
        .get(&format!("/arguments/{}/chain?depth=10", &root[..10]))
        .await;
    response.assert_status_ok();

    let body: ChainResponse = response.json();
    assert_eq!(body.total_nodes, 2);
    assert_eq!(body.max_depth_reached, 1);

    let child = &body.nodes[body.nodes[body.root].children[0]];
    assert_eq!(child.edge_kind.as_deref(), Some("rebuts"));
}

// =============================================================================
// CONSENSUS & VOTES
// =============================================================================

#[tokio::test]
async fn consensus_flow() {
    let server = create_test_server();
    let debate = open_debate(&server, "carbon pricing", &["alice", "bob", "carol"]).await;
    let prefix = &debate[..12];

    // Two yes votes: not closable yet.
    for agent in ["alice", "bob"] {
        let response = server
            .post(&format!("/debates/{}/votes", prefix))
            .json(&json!({ "agent": agent, "choice": "yes" }))
            .await;
        response.assert_status_ok();
    }

    let response = server
        .get(&format!("/debates/{}/consensus", prefix))
        .await;
    response.assert_status_ok();
    let body: ConsensusResponse = response.json();
    assert_eq!(body.total, 2);
    assert_eq!(body.required, 3);
    assert!(!body.can_close);
    assert_eq!(body.status, "voting");

    // Third yes completes unanimity.
    let response = server
        .post(&format!("/debates/{}/votes", prefix))
        .json(&json!({ "agent": "carol", "choice": "yes" }))
        .await;
    response.assert_status_ok();
    let body: VoteResponse = response.json();
    assert!(body.can_close);
    assert_eq!(body.yes_votes, 3);
}

#[tokio::test]
async fn duplicate_vote_is_409() {
    let server = create_test_server();
    let debate = open_debate(&server, "carbon pricing", &["alice", "bob"]).await;
    let prefix = &debate[..12];

    server
        .post(&format!("/debates/{}/votes", prefix))
        .json(&json!({ "agent": "alice", "choice": "yes" }))
        .await
        .assert_status_ok();

    let response = server
        .post(&format!("/debates/{}/votes", prefix))
        .json(&json!({ "agent": "alice", "choice": "yes" }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn unregistered_voter_is_409() {
    let server = create_test_server();
    let debate = open_debate(&server, "carbon pricing", &["alice"]).await;

    let response = server
        .post(&format!("/debates/{}/votes", &debate[..12]))
        .json(&json!({ "agent": "mallory", "choice": "yes" }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn dissent_blocks_consensus() {
    let server = create_test_server();
    let debate = open_debate(&server, "carbon pricing", &["alice", "bob"]).await;
    let prefix = &debate[..12];

    server
        .post(&format!("/debates/{}/votes", prefix))
        .json(&json!({ "agent": "alice", "choice": "yes" }))
        .await
        .assert_status_ok();
    server
        .post(&format!("/debates/{}/votes", prefix))
        .json(&json!({ "agent": "bob", "choice": "no", "reason": "open rebuttals" }))
        .await
        .assert_status_ok();

    let response = server
        .get(&format!("/debates/{}/consensus", prefix))
        .await;
    let body: ConsensusResponse = response.json();
    assert!(!body.has_consensus);
    assert!(!body.can_close);
    assert_eq!(body.participation_permille, 1000);
}

// =============================================================================
// MAJORITY RULE
// =============================================================================

#[tokio::test]
async fn majority_quorum_via_query() {
    let server = create_test_server();
    let debate = open_debate(&server, "carbon pricing", &["alice", "bob", "carol", "dave"]).await;
    let prefix = &debate[..12];

    for agent in ["alice", "bob", "carol"] {
        server
            .post(&format!("/debates/{}/votes", prefix))
            .json(&json!({ "agent": agent, "choice": "yes" }))
            .await
            .assert_status_ok();
    }

    // Unanimity: not closable with one outstanding vote.
    let response = server
        .get(&format!("/debates/{}/consensus", prefix))
        .await;
    let body: ConsensusResponse = response.json();
    assert!(!body.can_close);

    // Two-thirds quorum: closable.
    let response = server
        .get(&format!("/debates/{}/consensus?quorum=667", prefix))
        .await;
    let body: ConsensusResponse = response.json();
    assert_eq!(body.required, 3);
    assert!(body.can_close);
}
