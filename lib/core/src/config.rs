use std::path::PathBuf;

/// Where the embedded stores keep their files.
///
/// The server binary fills this in from its TOML config and hands it to
/// storage initialization. Every path is optional; anything left out is
/// resolved relative to `data_dir`, so a bare `data_dir` is enough for a
/// working deployment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base data directory. Reference YAML files are expected under
    /// `{data_dir}/reference/` and end up in the read-only KV file layer.
    pub data_dir: Option<PathBuf>,

    /// redb database file. Falls back to `{data_dir}/data.redb`.
    pub db_path: Option<PathBuf>,

    /// SQLite database file. Falls back to `{data_dir}/data.sqlite`.
    pub sqlite_path: Option<PathBuf>,

    /// Directory for supporting-document blobs. Falls back to
    /// `{data_dir}/blobs/`.
    pub blob_dir: Option<PathBuf>,

    /// Listen address for the HTTP server.
    pub listen: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_path: None,
            sqlite_path: None,
            blob_dir: None,
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Effective redb database path.
    pub fn resolve_db_path(&self) -> PathBuf {
        match &self.db_path {
            Some(explicit) => explicit.clone(),
            None => self.under_data_dir("data.redb"),
        }
    }

    /// Effective SQLite database path.
    pub fn resolve_sqlite_path(&self) -> PathBuf {
        match &self.sqlite_path {
            Some(explicit) => explicit.clone(),
            None => self.under_data_dir("data.sqlite"),
        }
    }

    /// Effective blob storage directory.
    pub fn resolve_blob_dir(&self) -> PathBuf {
        match &self.blob_dir {
            Some(explicit) => explicit.clone(),
            None => self.under_data_dir("blobs"),
        }
    }

    /// Directory holding the read-only reference YAML files. Always lives
    /// under `data_dir`; there is no override for it.
    pub fn resolve_reference_dir(&self) -> PathBuf {
        self.under_data_dir("reference")
    }

    fn under_data_dir(&self, leaf: &str) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.join(leaf),
            None => PathBuf::from(leaf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_data_dir() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        assert_eq!(config.resolve_db_path(), PathBuf::from("/data/data.redb"));
        assert_eq!(
            config.resolve_sqlite_path(),
            PathBuf::from("/data/data.sqlite")
        );
        assert_eq!(config.resolve_blob_dir(), PathBuf::from("/data/blobs"));
        assert_eq!(
            config.resolve_reference_dir(),
            PathBuf::from("/data/reference")
        );
    }

    #[test]
    fn explicit_paths_win() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            sqlite_path: Some(PathBuf::from("/elsewhere/lab.sqlite")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_sqlite_path(),
            PathBuf::from("/elsewhere/lab.sqlite")
        );
        assert_eq!(config.resolve_db_path(), PathBuf::from("/data/data.redb"));
    }

    #[test]
    fn no_data_dir_means_relative_paths() {
        let config = ServiceConfig::default();
        assert_eq!(config.resolve_sqlite_path(), PathBuf::from("data.sqlite"));
        assert_eq!(config.resolve_reference_dir(), PathBuf::from("reference"));
    }
}
