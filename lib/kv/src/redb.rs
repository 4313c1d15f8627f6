use std::path::Path;
use std::sync::Arc;

use redb::{Database, TableDefinition, WriteTransaction};
use tracing::debug;

use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// Writable KVStore backed by redb, a pure-Rust embedded B-tree database.
///
/// This is the DB layer under the overlay: sessions, announcement overrides
/// and other runtime state land here. Nothing in it is read-only.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open the database file, creating it and the single `kv` table on
    /// first use.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        let db = Database::create(path).map_err(KVError::storage)?;

        let txn = db.begin_write().map_err(KVError::storage)?;
        drop(txn.open_table(TABLE).map_err(KVError::storage)?);
        txn.commit().map_err(KVError::storage)?;

        debug!(path = %path.display(), "redb opened");
        Ok(Self { db: Arc::new(db) })
    }

    fn begin(&self) -> Result<WriteTransaction, KVError> {
        self.db.begin_write().map_err(KVError::storage)
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let txn = self.db.begin_read().map_err(KVError::storage)?;
        let table = txn.open_table(TABLE).map_err(KVError::storage)?;
        let hit = table.get(key).map_err(KVError::storage)?;
        Ok(hit.map(|guard| guard.value().to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let txn = self.begin()?;
        let mut table = txn.open_table(TABLE).map_err(KVError::storage)?;
        table.insert(key, value).map_err(KVError::storage)?;
        drop(table);
        txn.commit().map_err(KVError::storage)
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        let txn = self.begin()?;
        let mut table = txn.open_table(TABLE).map_err(KVError::storage)?;
        table.remove(key).map_err(KVError::storage)?;
        drop(table);
        txn.commit().map_err(KVError::storage)
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let txn = self.db.begin_read().map_err(KVError::storage)?;
        let table = txn.open_table(TABLE).map_err(KVError::storage)?;

        let mut out = Vec::new();
        for entry in table.range(prefix..).map_err(KVError::storage)? {
            let (key, value) = entry.map_err(KVError::storage)?;
            let key = key.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            out.push((key, value.value().to_vec()));
        }
        Ok(out)
    }

    fn is_readonly(&self, _key: &str) -> bool {
        false
    }
}
