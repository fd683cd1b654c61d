//! # Archive Facade
//!
//! High-level interface combining a storage backend with the typed
//! record, resolution, chain, and session-repository operations.
//!
//! ## Storage Backends
//!
//! The archive supports two backends behind one type:
//! - `InMemory`: BTreeMap-backed `MemoryStore` (fast, volatile)
//! - `Persistent`: `RedbStore` for disk-backed ACID storage

use crate::chain::{self, Chain, Edge};
use crate::records::{AgentProfile, DebateSession, Record};
use crate::resolver::{self, Resolution};
use crate::store::{Collection, MemoryStore, ObjectStore, RedbStore};
use crate::types::{AgonError, ContentHash};
use std::path::Path;

/// Storage backend for an Archive.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory store (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

// NOTE: StorageBackend does NOT implement Clone.
// RedbStore (database handle) cannot be safely cloned.

/// Per-collection entry counts, for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArchiveCounts {
    pub arguments: usize,
    pub simulations: usize,
    pub agents: usize,
}

/// The archive: one storage backend plus the typed operations the
/// upstream CLI/API layer calls.
#[derive(Debug, Default)]
pub struct Archive {
    backend: StorageBackend,
}

impl Archive {
    /// Create a new empty archive with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an archive over an existing in-memory store.
    #[must_use]
    pub fn with_memory(store: MemoryStore) -> Self {
        Self {
            backend: StorageBackend::InMemory(store),
        }
    }

    /// Create an archive with persistent redb storage.
    ///
    /// Opens or creates a database at the given path; all writes are
    /// persisted to disk.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, AgonError> {
        let store = RedbStore::open(path)?;
        Ok(Self {
            backend: StorageBackend::Persistent(store),
        })
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    // =========================================================================
    // RECORDS (arguments collection)
    // =========================================================================

    /// Validate, hash, encode, and store a record. Returns its
    /// content-addressed identity. Idempotent by construction: the key
    /// is the hash of the canonical payload.
    pub fn put_record(&mut self, record: &Record) -> Result<ContentHash, AgonError> {
        record.validate()?;
        let hash = record.content_hash()?;
        let bytes = record.encode()?;
        self.put(Collection::Arguments, &hash, &bytes)?;
        Ok(hash)
    }

    /// Load and decode a record. Absence is `Ok(None)`; an
    /// undecodable payload is surfaced as a deserialization fault
    /// (unlike chain expansion, which degrades).
    pub fn get_record(&self, id: &ContentHash) -> Result<Option<Record>, AgonError> {
        match self.get(Collection::Arguments, id)? {
            Some(bytes) => Ok(Some(Record::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    // =========================================================================
    // RESOLUTION
    // =========================================================================

    /// Resolve a hash prefix within a collection.
    pub fn resolve(
        &self,
        collection: Collection,
        prefix: &str,
    ) -> Result<Resolution, AgonError> {
        match &self.backend {
            StorageBackend::InMemory(store) => resolver::resolve(store, collection, prefix),
            StorageBackend::Persistent(store) => resolver::resolve(store, collection, prefix),
        }
    }

    // =========================================================================
    // RELATIONSHIP GRAPH
    // =========================================================================

    /// Find all edges directed at `target`.
    pub fn derive_edges(&self, target: &ContentHash) -> Result<Vec<Edge>, AgonError> {
        match &self.backend {
            StorageBackend::InMemory(store) => chain::derive_edges(store, target),
            StorageBackend::Persistent(store) => chain::derive_edges(store, target),
        }
    }

    /// Derive the archive's full edge set.
    pub fn collect_edges(&self) -> Result<Vec<Edge>, AgonError> {
        match &self.backend {
            StorageBackend::InMemory(store) => chain::collect_edges(store),
            StorageBackend::Persistent(store) => chain::collect_edges(store),
        }
    }

    /// Build the bounded-depth chain rooted at `root`.
    pub fn build_chain(
        &self,
        root: &ContentHash,
        max_depth: usize,
    ) -> Result<Option<Chain>, AgonError> {
        match &self.backend {
            StorageBackend::InMemory(store) => chain::build_chain(store, root, max_depth),
            StorageBackend::Persistent(store) => chain::build_chain(store, root, max_depth),
        }
    }

    /// Audit the full derived edge set for cycles.
    pub fn audit(&self) -> Result<(), AgonError> {
        let edges = self.collect_edges()?;
        chain::audit_cycles(&edges)
    }

    // =========================================================================
    // SESSION REPOSITORY (simulations collection)
    // =========================================================================

    /// Persist a session under its stable identity key. Status and
    /// vote updates rewrite the payload under the same key.
    pub fn put_session(&mut self, session: &DebateSession) -> Result<ContentHash, AgonError> {
        session.validate()?;
        let hash = session.identity_hash()?;
        let bytes = session.encode()?;
        self.put(Collection::Simulations, &hash, &bytes)?;
        Ok(hash)
    }

    /// Load a session by identity key.
    pub fn get_session(&self, id: &ContentHash) -> Result<Option<DebateSession>, AgonError> {
        match self.get(Collection::Simulations, id)? {
            Some(bytes) => Ok(Some(DebateSession::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    // =========================================================================
    // AGENT REPOSITORY (agents collection)
    // =========================================================================

    /// Persist an agent profile under its content hash.
    pub fn put_agent(&mut self, profile: &AgentProfile) -> Result<ContentHash, AgonError> {
        profile.validate()?;
        let hash = profile.content_hash()?;
        let bytes = profile.encode()?;
        self.put(Collection::Agents, &hash, &bytes)?;
        Ok(hash)
    }

    /// Load an agent profile by content hash.
    pub fn get_agent(&self, id: &ContentHash) -> Result<Option<AgentProfile>, AgonError> {
        match self.get(Collection::Agents, id)? {
            Some(bytes) => Ok(Some(AgentProfile::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    // =========================================================================
    // METRICS
    // =========================================================================

    /// Entry counts per collection.
    pub fn counts(&self) -> Result<ArchiveCounts, AgonError> {
        Ok(ArchiveCounts {
            arguments: self.count(Collection::Arguments)?,
            simulations: self.count(Collection::Simulations)?,
            agents: self.count(Collection::Agents)?,
        })
    }
}

// The archive is itself an object store: every raw operation
// dispatches to the active backend. Typed helpers above build on this.
impl ObjectStore for Archive {
    fn put(
        &mut self,
        collection: Collection,
        key: &ContentHash,
        payload: &[u8],
    ) -> Result<(), AgonError> {
        match &mut self.backend {
            StorageBackend::InMemory(store) => store.put(collection, key, payload),
            StorageBackend::Persistent(store) => store.put(collection, key, payload),
        }
    }

    fn get(
        &self,
        collection: Collection,
        key: &ContentHash,
    ) -> Result<Option<Vec<u8>>, AgonError> {
        match &self.backend {
            StorageBackend::InMemory(store) => store.get(collection, key),
            StorageBackend::Persistent(store) => store.get(collection, key),
        }
    }

    fn exists(&self, collection: Collection, key: &ContentHash) -> Result<bool, AgonError> {
        match &self.backend {
            StorageBackend::InMemory(store) => store.exists(collection, key),
            StorageBackend::Persistent(store) => store.exists(collection, key),
        }
    }

    fn list_keys(&self, collection: Collection) -> Result<Vec<ContentHash>, AgonError> {
        match &self.backend {
            StorageBackend::InMemory(store) => store.list_keys(collection),
            StorageBackend::Persistent(store) => store.list_keys(collection),
        }
    }

    fn remove(&mut self, collection: Collection, key: &ContentHash) -> Result<bool, AgonError> {
        match &mut self.backend {
            StorageBackend::InMemory(store) => store.remove(collection, key),
            StorageBackend::Persistent(store) => store.remove(collection, key),
        }
    }

    fn count(&self, collection: Collection) -> Result<usize, AgonError> {
        match &self.backend {
            StorageBackend::InMemory(store) => store.count(collection),
            StorageBackend::Persistent(store) => store.count(collection),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Argument, ArgumentKind};
    use crate::types::{AgentId, DebateId};

    fn sample_record(sequence: u64) -> Record {
        Record::Argument(Argument {
            text: "carbon pricing shifts demand".to_string(),
            kind: ArgumentKind::Empirical,
            sequence,
            supports: None,
            author: AgentId::new("alice"),
            debate: DebateId::new("debate-1"),
            created_at: 1_700_000_000,
        })
    }

    #[test]
    fn store_retrieve_restore_is_stable() {
        let mut archive = Archive::new();
        let record = sample_record(1);

        let first_id = archive.put_record(&record).expect("put");
        let loaded = archive
            .get_record(&first_id)
            .expect("get")
            .expect("present");
        assert_eq!(loaded, record);

        let second_id = archive.put_record(&record).expect("re-put");
        assert_eq!(first_id, second_id, "idempotent by content hash");
        assert_eq!(archive.counts().expect("counts").arguments, 1);

        let reloaded = archive
            .get_record(&first_id)
            .expect("get")
            .expect("present");
        assert_eq!(reloaded, record);
    }

    #[test]
    fn invalid_record_never_stored() {
        let mut archive = Archive::new();
        let mut record = sample_record(1);
        if let Record::Argument(arg) = &mut record {
            arg.text = String::new();
        }

        assert!(archive.put_record(&record).is_err());
        assert_eq!(archive.counts().expect("counts").arguments, 0);
    }

    #[test]
    fn resolve_through_archive() {
        let mut archive = Archive::new();
        let id = archive.put_record(&sample_record(1)).expect("put");

        let prefix = &id.as_str()[..8];
        let result = archive
            .resolve(Collection::Arguments, prefix)
            .expect("resolve");
        assert_eq!(result, Resolution::Unique(id));
    }

    #[test]
    fn session_update_keeps_key() {
        let mut archive = Archive::new();
        let mut session = DebateSession::new(
            "carbon pricing",
            vec![AgentId::new("alice"), AgentId::new("bob")],
            1_700_000_000,
        );

        let key = archive.put_session(&session).expect("put");

        session.status = crate::consensus::SessionStatus::Voting;
        let updated_key = archive.put_session(&session).expect("update");

        assert_eq!(key, updated_key);
        let loaded = archive.get_session(&key).expect("get").expect("present");
        assert_eq!(loaded.status, crate::consensus::SessionStatus::Voting);
        assert_eq!(archive.counts().expect("counts").simulations, 1);
    }

    #[test]
    fn agent_profile_roundtrip() {
        let mut archive = Archive::new();
        let profile = AgentProfile::new("alice", None, 1_700_000_000);

        let id = archive.put_agent(&profile).expect("put");
        let loaded = archive.get_agent(&id).expect("get").expect("present");
        assert_eq!(loaded, profile);
    }

    #[test]
    fn persistent_backend_matches_memory_semantics() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut archive = Archive::with_redb(dir.path().join("agon.db")).expect("open");
        assert!(archive.is_persistent());

        let record = sample_record(1);
        let id = archive.put_record(&record).expect("put");

        let loaded = archive.get_record(&id).expect("get").expect("present");
        assert_eq!(loaded, record);

        let resolved = archive
            .resolve(Collection::Arguments, &id.as_str()[..10])
            .expect("resolve");
        assert_eq!(resolved, Resolution::Unique(id));
    }

    #[test]
    fn audit_runs_over_derived_edges() {
        let mut archive = Archive::new();
        archive.put_record(&sample_record(1)).expect("put");
        assert!(archive.audit().is_ok());
    }
}
