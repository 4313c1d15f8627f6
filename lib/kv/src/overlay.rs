use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::KVError;
use crate::traits::KVStore;

/// Two layers of keys behind one `KVStore` face.
///
/// The *file layer* holds the reference YAML entries loaded once at startup.
/// It is read-only and shadows everything below it. The *DB layer* is the
/// writable store the overlay wraps (redb in production) and takes all
/// writes.
///
/// Reads check the file layer first. Writes and deletes against a file-layer
/// key are refused with `KVError::ReadOnly`; changing those entries means
/// editing the YAML and restarting. `scan` returns the union of both layers,
/// file layer winning on duplicate keys.
pub struct OverlayKV<DB: KVStore> {
    file_layer: RwLock<BTreeMap<String, Vec<u8>>>,
    db: DB,
}

impl<DB: KVStore> OverlayKV<DB> {
    /// Wrap a writable backend with an empty file layer.
    pub fn new(db: DB) -> Self {
        Self {
            file_layer: RwLock::new(BTreeMap::new()),
            db,
        }
    }

    /// Seed one entry into the read-only file layer. FileLoader calls this
    /// while booting; nothing else writes the file layer.
    pub fn insert_file_entry(&self, key: String, value: Vec<u8>) {
        self.file_layer.write().unwrap().insert(key, value);
    }

    /// Number of entries in the file layer.
    pub fn file_layer_len(&self) -> usize {
        self.file_layer.read().unwrap().len()
    }

    fn guard_writable(&self, key: &str) -> Result<(), KVError> {
        if self.is_readonly(key) {
            return Err(KVError::ReadOnly(key.to_string()));
        }
        Ok(())
    }
}

impl<DB: KVStore> KVStore for OverlayKV<DB> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        if let Some(hit) = self.file_layer.read().unwrap().get(key) {
            return Ok(Some(hit.clone()));
        }
        self.db.get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        self.guard_writable(key)?;
        self.db.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        self.guard_writable(key)?;
        self.db.delete(key)
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        // DB entries first, then the file layer on top so it wins duplicates.
        // BTreeMap keeps the merged view sorted.
        let mut merged: BTreeMap<String, Vec<u8>> =
            self.db.scan(prefix)?.into_iter().collect();

        let layer = self.file_layer.read().unwrap();
        for (key, value) in layer.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            merged.insert(key.clone(), value.clone());
        }

        Ok(merged.into_iter().collect())
    }

    fn is_readonly(&self, key: &str) -> bool {
        self.file_layer.read().unwrap().contains_key(key)
    }
}
