//! Server configuration.
//!
//! A context name resolves to `/etc/labkom/<name>.toml`; anything with a
//! `/` or `.` is treated as a literal path.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub server: ServerOverrides,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Base data directory. Holds the SQLite and redb files, the blob
    /// directory and the read-only `reference/` YAML files.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expire_secs")]
    pub expire_secs: i64,
}

/// The bootstrap admin account, seeded on first start. The stored
/// account wins afterwards; changing this section does not rotate a
/// live password.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    #[serde(default = "default_admin_nama")]
    pub nama: String,
    /// argon2id PHC string. Generate one with `labkomd --hash-password`.
    pub password_hash: String,
}

/// Optional operational overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerOverrides {
    /// Per-request deadline in seconds; falls back to the policy file.
    pub request_timeout_secs: Option<u64>,
    /// Expiry sweep interval in seconds.
    pub sweep_interval_secs: Option<u64>,
}

fn default_expire_secs() -> i64 {
    86400
}

fn default_admin_nama() -> String {
    "Admin".to_string()
}

impl ServerConfig {
    /// Resolve a context name or literal path to a config file path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from("/etc/labkom").join(format!("{name_or_path}.toml"))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }
}
