use crate::error::BlobError;

/// What `list` reports for each stored blob.
#[derive(Debug, Clone)]
pub struct BlobMeta {
    pub key: String,
    pub size: u64,
}

/// Binary object storage for uploaded supporting documents and exported
/// reports.
///
/// Keys read like relative paths (`surat/{requestId}.pdf`,
/// `export/report.csv`) and every path segment is validated before it
/// touches the filesystem. `FileStore` keeps blobs as plain local files; an
/// S3-style backend would implement the same trait.
pub trait BlobStore: Send + Sync {
    /// Write a blob, replacing any previous value under the key.
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError>;

    /// Read a blob back. `None` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError>;

    /// Remove a blob. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), BlobError>;

    /// Whether the key currently holds a blob.
    fn exists(&self, key: &str) -> Result<bool, BlobError>;

    /// Metadata for every blob under the prefix, sorted by key.
    fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>, BlobError>;
}
