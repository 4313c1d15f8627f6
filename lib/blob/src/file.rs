use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::BlobError;
use crate::traits::{BlobMeta, BlobStore};

/// BlobStore on the local filesystem.
///
/// A key maps straight to a path under the root: `surat/req1.pdf` lands at
/// `{root}/surat/req1.pdf`, with parent directories created on `put`. Key
/// segments are validated up front, so nothing path-like from a client can
/// climb out of the root.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: &Path) -> Result<Self, BlobError> {
        fs::create_dir_all(root).map_err(BlobError::io)?;
        debug!(dir = %root.display(), "blob store opened");
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Turn a key into a path under the root.
    ///
    /// Every `/`-separated segment must be a plain file name: no empties
    /// (which also rules out absolute keys and doubled slashes), no `.` or
    /// `..`, no backslashes.
    fn checked_path(&self, key: &str) -> Result<PathBuf, BlobError> {
        if key.is_empty() {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        let mut path = self.root.clone();
        for segment in key.split('/') {
            let plain = !segment.is_empty()
                && segment != "."
                && segment != ".."
                && !segment.contains('\\');
            if !plain {
                return Err(BlobError::InvalidKey(key.to_string()));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

impl BlobStore for FileStore {
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError> {
        let path = self.checked_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(BlobError::io)?;
        }
        fs::write(&path, data).map_err(BlobError::io)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError> {
        let path = self.checked_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BlobError::io(e)),
        }
    }

    fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = self.checked_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobError::io(e)),
        }
    }

    fn exists(&self, key: &str) -> Result<bool, BlobError> {
        Ok(self.checked_path(key)?.is_file())
    }

    fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>, BlobError> {
        // Iterative walk with an explicit stack; the tree is shallow.
        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir).map_err(BlobError::io)? {
                let entry = entry.map_err(BlobError::io)?;
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Ok(rel) = path.strip_prefix(&self.root) else {
                    continue;
                };
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if key.starts_with(prefix) {
                    let size = entry.metadata().map_err(BlobError::io)?.len();
                    found.push(BlobMeta { key, size });
                }
            }
        }

        found.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(found)
    }
}
