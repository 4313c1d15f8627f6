use crate::error::KVError;

/// Interface over the layered key-value store.
///
/// Keys are namespaced strings: `config:software-rules`, `config:policy`,
/// `session:{sid}` and so on. Entries loaded from reference YAML files are
/// read-only; everything written at runtime is not.
pub trait KVStore: Send + Sync {
    /// Look up one key. `None` when absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Write one key. Refused with `KVError::ReadOnly` for file-layer keys.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Remove one key. Refused with `KVError::ReadOnly` for file-layer keys.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Every entry whose key starts with `prefix`, sorted by key. Layered
    /// implementations merge all layers into one view.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;

    /// Whether the key lives in a read-only layer.
    fn is_readonly(&self, key: &str) -> bool;
}
