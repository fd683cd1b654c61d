//! # redb-backed Object Store
//!
//! Disk-backed persistence using the redb embedded database:
//! - ACID transactions
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//! - Zero configuration
//!
//! One table per collection; keys are the 64-char hex content hashes,
//! values the canonical postcard payloads. The single-writer model
//! matches the archive's concurrency contract: one local process, no
//! concurrent writers to the same store at a given instant.

use crate::store::{Collection, ObjectStore};
use crate::types::{AgonError, ContentHash};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for argument records: hex key -> canonical payload bytes.
const ARGUMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("arguments");

/// Table for debate session records.
const SIMULATIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("simulations");

/// Table for agent profile records.
const AGENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("agents");

fn table_def(collection: Collection) -> TableDefinition<'static, &'static str, &'static [u8]> {
    match collection {
        Collection::Arguments => ARGUMENTS,
        Collection::Simulations => SIMULATIONS,
        Collection::Agents => AGENTS,
    }
}

/// A disk-backed object store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create an archive database at the given path.
    ///
    /// All three collection tables are created up front so later reads
    /// never race table creation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AgonError> {
        let db = Database::create(path.as_ref()).map_err(|e| AgonError::storage("open", e))?;

        {
            let write_txn = db
                .begin_write()
                .map_err(|e| AgonError::storage("open", e))?;
            for collection in Collection::ALL {
                let _ = write_txn
                    .open_table(table_def(collection))
                    .map_err(|e| AgonError::storage("open", e))?;
            }
            write_txn
                .commit()
                .map_err(|e| AgonError::storage("open", e))?;
        }

        Ok(Self { db })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), AgonError> {
        self.db
            .compact()
            .map_err(|e| AgonError::storage("compact", e))?;
        Ok(())
    }
}

impl ObjectStore for RedbStore {
    fn put(
        &mut self,
        collection: Collection,
        key: &ContentHash,
        payload: &[u8],
    ) -> Result<(), AgonError> {
        // Idempotence: identical content under the same key is a no-op
        // success, skipping the write transaction entirely.
        if self
            .get(collection, key)?
            .is_some_and(|existing| existing == payload)
        {
            return Ok(());
        }

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| AgonError::storage("put", e))?;
        {
            let mut table = write_txn
                .open_table(table_def(collection))
                .map_err(|e| AgonError::storage("put", e))?;
            table
                .insert(key.as_str(), payload)
                .map_err(|e| AgonError::storage("put", e))?;
        }
        write_txn
            .commit()
            .map_err(|e| AgonError::storage("put", e))?;
        Ok(())
    }

    fn get(
        &self,
        collection: Collection,
        key: &ContentHash,
    ) -> Result<Option<Vec<u8>>, AgonError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| AgonError::storage("get", e))?;
        let table = read_txn
            .open_table(table_def(collection))
            .map_err(|e| AgonError::storage("get", e))?;

        Ok(table
            .get(key.as_str())
            .map_err(|e| AgonError::storage("get", e))?
            .map(|guard| guard.value().to_vec()))
    }

    fn exists(&self, collection: Collection, key: &ContentHash) -> Result<bool, AgonError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| AgonError::storage("exists", e))?;
        let table = read_txn
            .open_table(table_def(collection))
            .map_err(|e| AgonError::storage("exists", e))?;

        Ok(table
            .get(key.as_str())
            .map_err(|e| AgonError::storage("exists", e))?
            .is_some())
    }

    fn list_keys(&self, collection: Collection) -> Result<Vec<ContentHash>, AgonError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| AgonError::storage("list_keys", e))?;
        let table = read_txn
            .open_table(table_def(collection))
            .map_err(|e| AgonError::storage("list_keys", e))?;

        let mut keys = Vec::new();
        for entry in table
            .iter()
            .map_err(|e| AgonError::storage("list_keys", e))?
        {
            let (key, _) = entry.map_err(|e| AgonError::storage("list_keys", e))?;
            // Keys were validated hex at write time.
            keys.push(ContentHash::trusted(key.value().to_string()));
        }
        Ok(keys)
    }

    fn remove(&mut self, collection: Collection, key: &ContentHash) -> Result<bool, AgonError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| AgonError::storage("remove", e))?;
        let was_present;
        {
            let mut table = write_txn
                .open_table(table_def(collection))
                .map_err(|e| AgonError::storage("remove", e))?;
            was_present = table
                .remove(key.as_str())
                .map_err(|e| AgonError::storage("remove", e))?
                .is_some();
        }
        write_txn
            .commit()
            .map_err(|e| AgonError::storage("remove", e))?;
        Ok(was_present)
    }

    fn count(&self, collection: Collection) -> Result<usize, AgonError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| AgonError::storage("count", e))?;
        let table = read_txn
            .open_table(table_def(collection))
            .map_err(|e| AgonError::storage("count", e))?;

        Ok(table.len().map_err(|e| AgonError::storage("count", e))? as usize)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing;

    fn temp_store() -> (tempfile::TempDir, RedbStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RedbStore::open(dir.path().join("agon.db")).expect("open");
        (dir, store)
    }

    #[test]
    fn put_get_roundtrip() {
        let (_dir, mut store) = temp_store();
        let key = hashing::hash_bytes(b"claim");

        store.put(Collection::Arguments, &key, b"claim").expect("put");

        assert_eq!(
            store.get(Collection::Arguments, &key).expect("get"),
            Some(b"claim".to_vec())
        );
        assert!(store.exists(Collection::Arguments, &key).expect("exists"));
    }

    #[test]
    fn missing_key_is_none() {
        let (_dir, store) = temp_store();
        let key = hashing::hash_bytes(b"absent");
        assert_eq!(store.get(Collection::Simulations, &key).expect("get"), None);
    }

    #[test]
    fn idempotent_re_put() {
        let (_dir, mut store) = temp_store();
        let key = hashing::hash_bytes(b"claim");

        store.put(Collection::Arguments, &key, b"claim").expect("put");
        store
            .put(Collection::Arguments, &key, b"claim")
            .expect("re-put");

        assert_eq!(store.count(Collection::Arguments).expect("count"), 1);
    }

    #[test]
    fn keys_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("agon.db");
        let key = hashing::hash_bytes(b"durable");

        {
            let mut store = RedbStore::open(&path).expect("open");
            store
                .put(Collection::Agents, &key, b"durable")
                .expect("put");
        }

        let store = RedbStore::open(&path).expect("reopen");
        assert_eq!(
            store.get(Collection::Agents, &key).expect("get"),
            Some(b"durable".to_vec())
        );
        assert_eq!(store.count(Collection::Agents).expect("count"), 1);
    }

    #[test]
    fn remove_reports_presence() {
        let (_dir, mut store) = temp_store();
        let key = hashing::hash_bytes(b"ephemeral");

        store
            .put(Collection::Arguments, &key, b"ephemeral")
            .expect("put");
        assert!(store.remove(Collection::Arguments, &key).expect("remove"));
        assert!(!store.remove(Collection::Arguments, &key).expect("remove"));
    }

    #[test]
    fn collections_are_isolated() {
        let (_dir, mut store) = temp_store();
        let key = hashing::hash_bytes(b"payload");

        store
            .put(Collection::Arguments, &key, b"payload")
            .expect("put");
        assert!(!store.exists(Collection::Agents, &key).expect("exists"));
        assert_eq!(store.count(Collection::Simulations).expect("count"), 0);
    }
}
