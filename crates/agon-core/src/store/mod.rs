//! # Object Store
//!
//! Durable key/value persistence keyed by content hash, partitioned
//! into named collections.
//!
//! The `ObjectStore` trait is implemented by two backends:
//! - [`MemoryStore`]: BTreeMap-backed, fast, volatile
//! - [`RedbStore`]: disk-backed redb database, ACID, persistent
//!
//! The store is deliberately dumb: it never inspects payloads, never
//! enforces cross-collection references, and never retries. I/O
//! failures surface as `AgonError::Storage` carrying the failing
//! operation name; an absent key on read is a normal `Ok(None)`.

pub mod redb_store;

pub use redb_store::RedbStore;

use crate::types::{AgonError, ContentHash};
use std::collections::BTreeMap;

// =============================================================================
// COLLECTIONS
// =============================================================================

/// Named partition of the object store.
///
/// Within a collection, keys (content hashes) are unique. Enumeration
/// order is unspecified; ordering between records is carried by the
/// explicit `sequence` field inside argument payloads, never by the
/// store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    /// Argument, rebuttal, and concession records.
    Arguments,
    /// Debate session records.
    Simulations,
    /// Agent profile records.
    Agents,
}

impl Collection {
    /// Every collection, for enumeration and status reporting.
    pub const ALL: [Collection; 3] = [Self::Arguments, Self::Simulations, Self::Agents];

    /// Wire name of the collection.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Arguments => "arguments",
            Self::Simulations => "simulations",
            Self::Agents => "agents",
        }
    }

    /// Parse a collection from its wire name.
    pub fn parse(name: &str) -> Result<Self, AgonError> {
        match name {
            "arguments" => Ok(Self::Arguments),
            "simulations" => Ok(Self::Simulations),
            "agents" => Ok(Self::Agents),
            other => Err(AgonError::Validation(format!(
                "unknown collection `{}`; use: arguments, simulations, agents",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// OBJECTSTORE TRAIT
// =============================================================================

/// The object store contract.
///
/// All fallible operations return `Result<T, AgonError>` so in-memory
/// and persistent backends behave uniformly.
pub trait ObjectStore {
    /// Write `payload` durably under `key` within `collection`.
    ///
    /// Idempotent: re-storing identical content under the same key is
    /// a no-op success, since key = hash(content) for archive records.
    fn put(
        &mut self,
        collection: Collection,
        key: &ContentHash,
        payload: &[u8],
    ) -> Result<(), AgonError>;

    /// Exact-key lookup. An absent key is `Ok(None)`, not a fault.
    fn get(&self, collection: Collection, key: &ContentHash)
    -> Result<Option<Vec<u8>>, AgonError>;

    /// Whether `key` is present in `collection`.
    fn exists(&self, collection: Collection, key: &ContentHash) -> Result<bool, AgonError>;

    /// Enumerate every key currently present in `collection`.
    ///
    /// Order is unspecified; callers must not rely on it.
    fn list_keys(&self, collection: Collection) -> Result<Vec<ContentHash>, AgonError>;

    /// Administrative deletion. Returns whether the key was present.
    ///
    /// Not used by the core workflows; records are immutable in normal
    /// operation.
    fn remove(&mut self, collection: Collection, key: &ContentHash) -> Result<bool, AgonError>;

    /// Number of entries in `collection`.
    fn count(&self, collection: Collection) -> Result<usize, AgonError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory object store.
///
/// BTreeMap per collection for deterministic enumeration. Used for
/// tests and ephemeral sessions; the persistent twin is [`RedbStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    arguments: BTreeMap<ContentHash, Vec<u8>>,
    simulations: BTreeMap<ContentHash, Vec<u8>>,
    agents: BTreeMap<ContentHash, Vec<u8>>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, collection: Collection) -> &BTreeMap<ContentHash, Vec<u8>> {
        match collection {
            Collection::Arguments => &self.arguments,
            Collection::Simulations => &self.simulations,
            Collection::Agents => &self.agents,
        }
    }

    fn table_mut(&mut self, collection: Collection) -> &mut BTreeMap<ContentHash, Vec<u8>> {
        match collection {
            Collection::Arguments => &mut self.arguments,
            Collection::Simulations => &mut self.simulations,
            Collection::Agents => &mut self.agents,
        }
    }
}

impl ObjectStore for MemoryStore {
    fn put(
        &mut self,
        collection: Collection,
        key: &ContentHash,
        payload: &[u8],
    ) -> Result<(), AgonError> {
        let table = self.table_mut(collection);
        if table.get(key).is_some_and(|existing| existing == payload) {
            return Ok(());
        }
        table.insert(key.clone(), payload.to_vec());
        Ok(())
    }

    fn get(
        &self,
        collection: Collection,
        key: &ContentHash,
    ) -> Result<Option<Vec<u8>>, AgonError> {
        Ok(self.table(collection).get(key).cloned())
    }

    fn exists(&self, collection: Collection, key: &ContentHash) -> Result<bool, AgonError> {
        Ok(self.table(collection).contains_key(key))
    }

    fn list_keys(&self, collection: Collection) -> Result<Vec<ContentHash>, AgonError> {
        Ok(self.table(collection).keys().cloned().collect())
    }

    fn remove(&mut self, collection: Collection, key: &ContentHash) -> Result<bool, AgonError> {
        Ok(self.table_mut(collection).remove(key).is_some())
    }

    fn count(&self, collection: Collection) -> Result<usize, AgonError> {
        Ok(self.table(collection).len())
    }
}

// =============================================================================
// TESTS
// =============================================================================
