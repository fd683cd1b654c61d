//! # Record Construction
//!
//! The "upstream" collaborator: assembles record fields, assigns
//! timestamps and sequence numbers, and runs link validation before
//! anything reaches the archive. The core only hashes and stores.

use agon_core::{
    AgentId, AgonError, Archive, Argument, ArgumentKind, Collection, Concession, ConcessionKind,
    ContentHash, DebateId, ObjectStore, Rebuttal, RebuttalKind, Record, Resolution, validate_link,
};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix timestamp in seconds.
pub fn now_ts() -> Result<u64, AgonError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| AgonError::Validation(format!("system clock before unix epoch: {}", e)))
}

/// Resolve a prefix to its unique key, rendering the expected
/// `NotFound`/`Ambiguous` outcomes as caller-facing validation faults.
pub fn resolve_unique(
    archive: &Archive,
    collection: Collection,
    prefix: &str,
) -> Result<ContentHash, AgonError> {
    match archive.resolve(collection, prefix)? {
        Resolution::Unique(hash) => Ok(hash),
        Resolution::NotFound => Err(AgonError::Validation(format!(
            "no {} entry matches `{}`",
            collection, prefix
        ))),
        Resolution::Ambiguous(matches) => {
            let listing: Vec<&str> = matches.iter().map(|m| m.short()).collect();
            Err(AgonError::Validation(format!(
                "prefix `{}` is ambiguous ({}); use a longer prefix",
                prefix,
                listing.join(", ")
            )))
        }
    }
}

/// Next sequence number for an argument in `debate`: one past the
/// highest sequence currently stored for that session.
pub fn next_sequence(archive: &Archive, debate: &DebateId) -> Result<u64, AgonError> {
    let mut highest = 0u64;
    for key in archive.list_keys(Collection::Arguments)? {
        let Some(record) = archive.get_record(&key).ok().flatten() else {
            continue;
        };
        if let Record::Argument(arg) = &record {
            if arg.debate == *debate {
                highest = highest.max(arg.sequence);
            }
        }
    }
    Ok(highest.saturating_add(1))
}

/// Assemble an argument for the session stored under `session_key`.
///
/// The session must not be closed; an optional `supports` target is
/// link-validated against the new record.
pub fn build_argument(
    archive: &Archive,
    session_key: &ContentHash,
    author: AgentId,
    text: String,
    kind: ArgumentKind,
    supports: Option<ContentHash>,
) -> Result<Record, AgonError> {
    let session = archive
        .get_session(session_key)?
        .ok_or_else(|| AgonError::Validation(format!("no session {}", session_key.short())))?;
    if session.status.is_terminal() {
        return Err(AgonError::BusinessRule(
            "debate is closed; no further arguments accepted".to_string(),
        ));
    }

    let debate = DebateId::new(session_key.as_str());
    let record = Record::Argument(Argument {
        text,
        kind,
        sequence: next_sequence(archive, &debate)?,
        supports: supports.clone(),
        author,
        debate,
        created_at: now_ts()?,
    });

    if let Some(target_id) = &supports {
        let target = archive.get_record(target_id)?.ok_or_else(|| {
            AgonError::Validation(format!("supported argument {} not found", target_id.short()))
        })?;
        validate_link(&record, &target)?;
    }

    Ok(record)
}

/// Assemble a rebuttal of the record stored under `target_id`.
///
/// The debate is inherited from the target; cross-author validation
/// runs before the record is returned.
pub fn build_rebuttal(
    archive: &Archive,
    target_id: &ContentHash,
    author: AgentId,
    text: String,
    kind: RebuttalKind,
) -> Result<Record, AgonError> {
    let target = archive
        .get_record(target_id)?
        .ok_or_else(|| AgonError::Validation(format!("no record {}", target_id.short())))?;

    let record = Record::Rebuttal(Rebuttal {
        target: target_id.clone(),
        text,
        kind,
        author,
        debate: target.debate().clone(),
        created_at: now_ts()?,
    });
    validate_link(&record, &target)?;
    Ok(record)
}

/// Assemble a concession to the record stored under `target_id`.
pub fn build_concession(
    archive: &Archive,
    target_id: &ContentHash,
    author: AgentId,
    text: String,
    kind: ConcessionKind,
) -> Result<Record, AgonError> {
    let target = archive
        .get_record(target_id)?
        .ok_or_else(|| AgonError::Validation(format!("no record {}", target_id.short())))?;

    let record = Record::Concession(Concession {
        target: target_id.clone(),
        kind,
        text,
        author,
        debate: target.debate().clone(),
        created_at: now_ts()?,
    });
    validate_link(&record, &target)?;
    Ok(record)
}

// =============================================================================
// TESTS
// =============================================================================
