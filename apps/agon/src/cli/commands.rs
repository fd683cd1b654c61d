//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! Record construction lives in `crate::authoring`; everything here is
//! resolution, rendering, and session bookkeeping. Raw storage errors
//! never reach the user unformatted — expected outcomes print as
//! structured results.

use crate::api;
use crate::authoring::{
    self, build_argument, build_concession, build_rebuttal, now_ts, resolve_unique,
};
use agon_core::{
    AgentId, AgonError, Archive, ArgumentKind, CloseRules, CloseVote, Collection, ConcessionKind,
    ObjectStore, RebuttalKind, Record, Resolution, SessionStatus, VoteChoice, calculate_status,
    validate_vote,
};
use std::path::{Path, PathBuf};

// =============================================================================
// ARCHIVE LOADING
// =============================================================================

/// Open an archive with the requested backend.
pub fn load_archive(db_path: &Path, backend: &str) -> Result<Archive, AgonError> {
    match backend {
        "redb" => Archive::with_redb(db_path),
        "memory" => Ok(Archive::new()),
        other => Err(AgonError::Validation(format!(
            "unknown backend `{}`; use: redb, memory",
            other
        ))),
    }
}

// =============================================================================
// KIND PARSING
// =============================================================================

fn parse_argument_kind(s: &str) -> Result<ArgumentKind, AgonError> {
    match s {
        "deductive" => Ok(ArgumentKind::Deductive),
        "inductive" => Ok(ArgumentKind::Inductive),
        "empirical" => Ok(ArgumentKind::Empirical),
        "analogical" => Ok(ArgumentKind::Analogical),
        other => Err(AgonError::Validation(format!(
            "unknown argument kind `{}`; use: deductive, inductive, empirical, analogical",
            other
        ))),
    }
}

fn parse_rebuttal_kind(s: &str) -> Result<RebuttalKind, AgonError> {
    match s {
        "logical" => Ok(RebuttalKind::Logical),
        "empirical" => Ok(RebuttalKind::Empirical),
        "contextual" => Ok(RebuttalKind::Contextual),
        other => Err(AgonError::Validation(format!(
            "unknown rebuttal kind `{}`; use: logical, empirical, contextual",
            other
        ))),
    }
}

fn parse_concession_kind(s: &str) -> Result<ConcessionKind, AgonError> {
    match s {
        "full" => Ok(ConcessionKind::Full),
        "partial" => Ok(ConcessionKind::Partial),
        "conditional" => Ok(ConcessionKind::Conditional),
        other => Err(AgonError::Validation(format!(
            "unknown concession kind `{}`; use: full, partial, conditional",
            other
        ))),
    }
}

fn parse_vote_choice(s: &str) -> Result<VoteChoice, AgonError> {
    match s {
        "yes" => Ok(VoteChoice::Yes),
        "no" => Ok(VoteChoice::No),
        other => Err(AgonError::Validation(format!(
            "unknown vote `{}`; use: yes, no",
            other
        ))),
    }
}

/// Render permille as a percentage string without float arithmetic.
fn permille_percent(permille: u16) -> String {
    format!("{}.{}%", permille / 10, permille % 10)
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(
    db_path: &Path,
    backend: &str,
    host: &str,
    port: u16,
) -> Result<(), AgonError> {
    let archive = load_archive(db_path, backend)?;

    println!("Agon Archive Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Backend:  {}", backend);
    println!("  Database: {:?}", db_path);
    println!();
    println!("Endpoints:");
    println!("  GET  /health                      - Health check");
    println!("  GET  /status                      - Archive status");
    println!("  POST /arguments                   - Submit a record");
    println!("  GET  /arguments/{{prefix}}          - Resolve and load a record");
    println!("  GET  /arguments/{{prefix}}/chain    - Relationship chain");
    println!("  GET  /debates/{{prefix}}/consensus  - Consensus status");
    println!("  POST /debates/{{prefix}}/votes      - Cast a closing vote");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, archive).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show archive status.
pub fn cmd_status(db_path: &Path, backend: &str, json_mode: bool) -> Result<(), AgonError> {
    let archive = load_archive(db_path, backend)?;
    let counts = archive.counts()?;

    if json_mode {
        let output = serde_json::json!({
            "database": db_path.to_string_lossy(),
            "backend": backend,
            "arguments": counts.arguments,
            "simulations": counts.simulations,
            "agents": counts.agents
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Agon Archive Status");
    println!("===================");
    println!("Database: {:?}", db_path);
    println!("Backend:  {}", backend);
    println!();
    println!("Arguments:   {}", counts.arguments);
    println!("Simulations: {}", counts.simulations);
    println!("Agents:      {}", counts.agents);

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new database.
pub fn cmd_init(db_path: &PathBuf, backend: &str, force: bool) -> Result<(), AgonError> {
    if db_path.exists() && !force {
        return Err(AgonError::Validation(
            "database already exists; use --force to overwrite".to_string(),
        ));
    }
    if db_path.exists() && force {
        std::fs::remove_file(db_path).map_err(|e| AgonError::storage("init", e))?;
    }

    match backend {
        "redb" => {
            let _archive = Archive::with_redb(db_path)?;
            println!("Initialized new redb archive at {:?}", db_path);
        }
        "memory" => {
            println!("Memory backend is ephemeral; nothing to initialize");
        }
        other => {
            return Err(AgonError::Validation(format!(
                "unknown backend `{}`; use: redb, memory",
                other
            )));
        }
    }

    Ok(())
}

// =============================================================================
// AGENT COMMANDS
// =============================================================================

/// Register a participant profile.
pub fn cmd_enroll(
    db_path: &Path,
    backend: &str,
    _json_mode: bool,
    name: &str,
    stance: Option<String>,
) -> Result<(), AgonError> {
    let mut archive = load_archive(db_path, backend)?;

    let profile = agon_core::AgentProfile::new(name, stance, now_ts()?);
    let id = archive.put_agent(&profile)?;

    println!("Enrolled agent `{}`", name);
    println!("  profile: {}", id.short());
    Ok(())
}

/// List registered participants.
pub fn cmd_agents(db_path: &Path, backend: &str, json_mode: bool) -> Result<(), AgonError> {
    let archive = load_archive(db_path, backend)?;

    let mut profiles = Vec::new();
    for key in archive.list_keys(Collection::Agents)? {
        if let Some(profile) = archive.get_agent(&key)? {
            profiles.push((key, profile));
        }
    }
    profiles.sort_by(|a, b| a.1.name.cmp(&b.1.name));

    if json_mode {
        let output: Vec<serde_json::Value> = profiles
            .iter()
            .map(|(key, p)| {
                serde_json::json!({
                    "id": key.as_str(),
                    "name": p.name,
                    "stance": p.stance,
                    "created_at": p.created_at
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    if profiles.is_empty() {
        println!("No agents enrolled");
        return Ok(());
    }
    println!("Enrolled agents:");
    for (key, profile) in &profiles {
        match &profile.stance {
            Some(stance) => println!("  {}  {} ({})", key.short(), profile.name, stance),
            None => println!("  {}  {}", key.short(), profile.name),
        }
    }
    Ok(())
}

// =============================================================================
// DEBATE COMMANDS
// =============================================================================

/// Open a new debate session.
pub fn cmd_open(
    db_path: &Path,
    backend: &str,
    _json_mode: bool,
    topic: &str,
    participants: &str,
) -> Result<(), AgonError> {
    let mut archive = load_archive(db_path, backend)?;

    let participants: Vec<AgentId> = participants
        .split(',')
        .map(|s| AgentId::new(s.trim()))
        .filter(|a| !a.as_str().is_empty())
        .collect();

    // Unenrolled participants are allowed but worth flagging.
    let mut enrolled = std::collections::BTreeSet::new();
    for key in archive.list_keys(Collection::Agents)? {
        if let Some(profile) = archive.get_agent(&key)? {
            enrolled.insert(profile.agent_id());
        }
    }
    for participant in &participants {
        if !enrolled.contains(participant) {
            tracing::warn!("participant `{}` has no enrolled profile", participant);
        }
    }

    let session = agon_core::DebateSession::new(topic, participants, now_ts()?);
    let key = archive.put_session(&session)?;

    println!("Opened debate `{}`", topic);
    println!("  session: {}", key.short());
    println!("  status:  {}", session.status);
    Ok(())
}

/// List debate sessions.
pub fn cmd_debates(db_path: &Path, backend: &str, json_mode: bool) -> Result<(), AgonError> {
    let archive = load_archive(db_path, backend)?;

    let mut sessions = Vec::new();
    for key in archive.list_keys(Collection::Simulations)? {
        if let Some(session) = archive.get_session(&key)? {
            sessions.push((key, session));
        }
    }
    sessions.sort_by_key(|(_, s)| s.created_at);

    if json_mode {
        let output: Vec<serde_json::Value> = sessions
            .iter()
            .map(|(key, s)| {
                serde_json::json!({
                    "id": key.as_str(),
                    "topic": s.topic,
                    "status": s.status.name(),
                    "participants": s.participants.iter().map(AgentId::as_str).collect::<Vec<_>>(),
                    "votes": s.votes.len(),
                    "created_at": s.created_at
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    if sessions.is_empty() {
        println!("No debates open");
        return Ok(());
    }
    println!("Debates:");
    for (key, session) in &sessions {
        println!(
            "  {}  [{}] {} ({} participants, {} votes)",
            key.short(),
            session.status,
            session.topic,
            session.participants.len(),
            session.votes.len()
        );
    }
    Ok(())
}

// =============================================================================
// AUTHORING COMMANDS
// =============================================================================

/// Submit an argument.
pub fn cmd_argue(
    db_path: &Path,
    backend: &str,
    _json_mode: bool,
    debate: &str,
    author: &str,
    text: &str,
    kind: &str,
    supports: Option<String>,
) -> Result<(), AgonError> {
    let mut archive = load_archive(db_path, backend)?;

    let session_key = resolve_unique(&archive, Collection::Simulations, debate)?;
    let supports = supports
        .map(|prefix| resolve_unique(&archive, Collection::Arguments, &prefix))
        .transpose()?;

    let record = build_argument(
        &archive,
        &session_key,
        AgentId::new(author),
        text.to_string(),
        parse_argument_kind(kind)?,
        supports,
    )?;
    let id = archive.put_record(&record)?;

    println!("Stored argument {}", id.short());
    if let Record::Argument(arg) = &record {
        println!("  sequence: {}", arg.sequence);
    }
    Ok(())
}

/// Submit a rebuttal.
pub fn cmd_rebut(
    db_path: &Path,
    backend: &str,
    _json_mode: bool,
    target: &str,
    author: &str,
    text: &str,
    kind: &str,
) -> Result<(), AgonError> {
    let mut archive = load_archive(db_path, backend)?;

    let target_id = resolve_unique(&archive, Collection::Arguments, target)?;
    let record = build_rebuttal(
        &archive,
        &target_id,
        AgentId::new(author),
        text.to_string(),
        parse_rebuttal_kind(kind)?,
    )?;
    let id = archive.put_record(&record)?;

    println!("Stored rebuttal {} -> {}", id.short(), target_id.short());
    Ok(())
}

/// Submit a concession.
pub fn cmd_concede(
    db_path: &Path,
    backend: &str,
    _json_mode: bool,
    target: &str,
    author: &str,
    text: &str,
    kind: &str,
) -> Result<(), AgonError> {
    let mut archive = load_archive(db_path, backend)?;

    let target_id = resolve_unique(&archive, Collection::Arguments, target)?;
    let record = build_concession(
        &archive,
        &target_id,
        AgentId::new(author),
        text.to_string(),
        parse_concession_kind(kind)?,
    )?;
    let id = archive.put_record(&record)?;

    println!("Stored concession {} -> {}", id.short(), target_id.short());
    Ok(())
}

// =============================================================================
// RESOLUTION COMMANDS
// =============================================================================

/// Resolve a hash prefix.
pub fn cmd_resolve(
    db_path: &Path,
    backend: &str,
    json_mode: bool,
    collection: &str,
    prefix: &str,
) -> Result<(), AgonError> {
    let archive = load_archive(db_path, backend)?;
    let collection = Collection::parse(collection)?;

    let resolution = archive.resolve(collection, prefix)?;

    if json_mode {
        let output = match &resolution {
            Resolution::Unique(hash) => serde_json::json!({
                "outcome": "unique",
                "key": hash.as_str()
            }),
            Resolution::NotFound => serde_json::json!({ "outcome": "not_found" }),
            Resolution::Ambiguous(matches) => serde_json::json!({
                "outcome": "ambiguous",
                "matches": matches.iter().map(|m| m.as_str()).collect::<Vec<_>>()
            }),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    match resolution {
        Resolution::Unique(hash) => println!("{}", hash),
        Resolution::NotFound => println!("No {} entry matches `{}`", collection, prefix),
        Resolution::Ambiguous(matches) => {
            println!("Prefix `{}` is ambiguous:", prefix);
            for m in matches {
                println!("  {}", m);
            }
            println!("Use a longer prefix");
        }
    }
    Ok(())
}

/// Show a record.
pub fn cmd_show(
    db_path: &Path,
    backend: &str,
    json_mode: bool,
    prefix: &str,
) -> Result<(), AgonError> {
    let archive = load_archive(db_path, backend)?;

    let id = resolve_unique(&archive, Collection::Arguments, prefix)?;
    let record = archive
        .get_record(&id)?
        .ok_or_else(|| AgonError::Validation(format!("no record {}", id.short())))?;

    if json_mode {
        let output = serde_json::json!({
            "id": id.as_str(),
            "kind": record.kind().name(),
            "author": record.author().as_str(),
            "debate": record.debate().as_str(),
            "target": record.target().map(|t| t.as_str()),
            "text": record.text(),
            "created_at": record.created_at()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("{} {}", record.kind(), id);
    println!("  author:  {}", record.author());
    println!("  debate:  {}", &record.debate().as_str()[..record.debate().as_str().len().min(12)]);
    if let Some(target) = record.target() {
        println!("  target:  {}", target.short());
    }
    match &record {
        Record::Argument(arg) => {
            println!("  kind:    {}", arg.kind.name());
            println!("  seq:     {}", arg.sequence);
        }
        Record::Rebuttal(reb) => println!("  kind:    {}", reb.kind.name()),
        Record::Concession(con) => println!("  kind:    {}", con.kind.name()),
    }
    println!("  text:    {}", record.text());
    Ok(())
}

// =============================================================================
// CHAIN COMMAND
// =============================================================================

/// Build and render a relationship chain.
pub fn cmd_chain(
    db_path: &Path,
    backend: &str,
    json_mode: bool,
    prefix: &str,
    depth: usize,
) -> Result<(), AgonError> {
    let archive = load_archive(db_path, backend)?;

    let root_id = resolve_unique(&archive, Collection::Arguments, prefix)?;
    let Some(chain) = archive.build_chain(&root_id, depth)? else {
        println!("No record {}", root_id.short());
        return Ok(());
    };

    if json_mode {
        let nodes: Vec<serde_json::Value> = chain
            .nodes
            .iter()
            .map(|n| {
                serde_json::json!({
                    "id": n.id.as_str(),
                    "kind": n.kind.name(),
                    "author": n.author.as_str(),
                    "depth": n.depth,
                    "edge_kind": n.edge.map(|(k, _)| k.name()),
                    "strength_permille": n.edge.map(|(_, s)| s.permille()),
                    "children": n.children
                })
            })
            .collect();
        let output = serde_json::json!({
            "root": chain.root,
            "total_nodes": chain.stats.total_nodes,
            "max_depth_reached": chain.stats.max_depth_reached,
            "nodes": nodes
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    // Depth-first render over the arena with an explicit stack.
    let mut stack = vec![chain.root];
    while let Some(idx) = stack.pop() {
        let node = &chain.nodes[idx];
        let indent = "  ".repeat(node.depth);
        match node.edge {
            Some((kind, strength)) => println!(
                "{}{} {} by {} ({}, {})",
                indent,
                node.kind,
                node.id.short(),
                node.author,
                kind,
                strength
            ),
            None => println!(
                "{}{} {} by {}",
                indent,
                node.kind,
                node.id.short(),
                node.author
            ),
        }
        for &child in node.children.iter().rev() {
            stack.push(child);
        }
    }

    println!();
    println!(
        "{} nodes, max depth {}",
        chain.stats.total_nodes, chain.stats.max_depth_reached
    );
    Ok(())
}

// =============================================================================
// AUDIT COMMAND
// =============================================================================

/// Audit the full derived edge set for cycles.
pub fn cmd_audit(db_path: &Path, backend: &str, json_mode: bool) -> Result<(), AgonError> {
    let archive = load_archive(db_path, backend)?;
    let edges = archive.collect_edges()?;
    let result = agon_core::audit_cycles(&edges);

    if json_mode {
        let output = match &result {
            Ok(()) => serde_json::json!({
                "edges": edges.len(),
                "acyclic": true
            }),
            Err(e) => serde_json::json!({
                "edges": edges.len(),
                "acyclic": false,
                "fault": e.to_string()
            }),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return result;
    }

    println!("Audited {} derived edges", edges.len());
    match &result {
        Ok(()) => println!("No cycles detected"),
        Err(e) => println!("{}", e),
    }
    result
}

// =============================================================================
// VOTING COMMANDS
// =============================================================================

/// Cast a closing vote.
pub fn cmd_vote(
    db_path: &Path,
    backend: &str,
    _json_mode: bool,
    debate: &str,
    agent: &str,
    choice: &str,
    reason: Option<String>,
) -> Result<(), AgonError> {
    let mut archive = load_archive(db_path, backend)?;

    let session_key = resolve_unique(&archive, Collection::Simulations, debate)?;
    let mut session = archive
        .get_session(&session_key)?
        .ok_or_else(|| AgonError::Validation(format!("no session {}", session_key.short())))?;

    let voter = AgentId::new(agent);
    validate_vote(&session.participants, &session.votes, session.status, &voter)?;

    // First vote moves the session into its voting phase.
    if session.status == SessionStatus::Active
        && session.status.can_transition(SessionStatus::Voting)
    {
        session.status = SessionStatus::Voting;
    }

    let mut vote = CloseVote::new(voter, parse_vote_choice(choice)?, now_ts()?);
    vote.reason = reason;
    session.votes.push(vote);
    archive.put_session(&session)?;

    let status = calculate_status(&session.participants, &session.votes, &CloseRules::Unanimity);
    println!(
        "Vote recorded: {} of {} participants have voted ({} yes, {} no)",
        status.total,
        session.participants.len(),
        status.yes_votes,
        status.no_votes
    );
    Ok(())
}

/// Show consensus status, optionally closing the session.
pub fn cmd_consensus(
    db_path: &Path,
    backend: &str,
    json_mode: bool,
    debate: &str,
    quorum: Option<u16>,
    close: bool,
) -> Result<(), AgonError> {
    let mut archive = load_archive(db_path, backend)?;

    let session_key = resolve_unique(&archive, Collection::Simulations, debate)?;
    let mut session = archive
        .get_session(&session_key)?
        .ok_or_else(|| AgonError::Validation(format!("no session {}", session_key.short())))?;

    let rules = match quorum {
        Some(quorum_permille) => CloseRules::Majority { quorum_permille },
        None => CloseRules::Unanimity,
    };
    let status = calculate_status(&session.participants, &session.votes, &rules);

    if json_mode {
        let output = serde_json::json!({
            "session": session_key.as_str(),
            "topic": session.topic,
            "status": session.status.name(),
            "total": status.total,
            "required": status.required,
            "yes_votes": status.yes_votes,
            "no_votes": status.no_votes,
            "has_consensus": status.has_consensus,
            "can_close": status.can_close,
            "participation_permille": status.participation_permille
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        println!("Consensus for `{}`", session.topic);
        println!("  session:       {}", session_key.short());
        println!("  status:        {}", session.status);
        println!(
            "  votes:         {} cast, {} required ({} yes, {} no)",
            status.total, status.required, status.yes_votes, status.no_votes
        );
        println!(
            "  participation: {}",
            permille_percent(status.participation_permille)
        );
        println!("  can close:     {}", status.can_close);
    }

    if close {
        if !status.can_close {
            return Err(AgonError::BusinessRule(
                "consensus rule not satisfied; session stays open".to_string(),
            ));
        }
        if !session.status.can_transition(SessionStatus::Closed) {
            return Err(AgonError::BusinessRule(format!(
                "cannot close from status `{}`",
                session.status
            )));
        }
        session.status = SessionStatus::Closed;
        archive.put_session(&session)?;
        println!("Session closed");
    }

    Ok(())
}

// =============================================================================
// REMOVE COMMAND
// =============================================================================

/// Administratively remove a record.
pub fn cmd_remove(
    db_path: &Path,
    backend: &str,
    collection: &str,
    prefix: &str,
    force: bool,
) -> Result<(), AgonError> {
    if !force {
        return Err(AgonError::Validation(
            "records are immutable in normal operation; pass --force to remove".to_string(),
        ));
    }

    let mut archive = load_archive(db_path, backend)?;
    let collection = Collection::parse(collection)?;
    let id = resolve_unique(&archive, collection, prefix)?;

    if archive.remove(collection, &id)? {
        println!("Removed {} from {}", id.short(), collection);
    } else {
        println!("No {} entry {}", collection, id.short());
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
