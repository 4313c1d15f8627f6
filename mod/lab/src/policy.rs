use serde::Deserialize;
use tracing::warn;

use labkom_kv::KVStore;

/// Operational knobs from `reference/policy.yaml` (key `config:policy`).
///
/// A missing or unparsable file falls back to the defaults below, so a
/// fresh deployment serves without any reference data in place.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    /// Days of access granted when the research room is the access type.
    pub research_room_expire_days: i64,
    /// Days of access granted for everything else.
    pub default_expire_days: i64,
    /// How far in the future the start date may lie.
    pub max_start_ahead_days: i64,
    /// Upload size cap for supporting documents, in bytes.
    pub max_upload_bytes: usize,
    /// Accepted upload extensions, lowercase, without the dot.
    pub allowed_upload_exts: Vec<String>,
    /// Per-request handling deadline in seconds.
    pub request_timeout_secs: u64,
    /// Room name that triggers the short expiry window.
    pub research_room: String,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            research_room_expire_days: 14,
            default_expire_days: 30,
            max_start_ahead_days: 7,
            max_upload_bytes: 3 * 1024 * 1024,
            allowed_upload_exts: vec![
                "pdf".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
            ],
            request_timeout_secs: 15,
            research_room: "Ruang Penelitian".to_string(),
        }
    }
}

impl Policy {
    /// Load from the KV file layer, falling back to defaults.
    pub fn load(kv: &dyn KVStore) -> Self {
        match kv.get("config:policy") {
            Ok(Some(raw)) => match serde_yaml::from_slice(&raw) {
                Ok(policy) => policy,
                Err(e) => {
                    warn!("config:policy is not valid YAML, using defaults: {e}");
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("config:policy unavailable, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Whether an uploaded file name carries an accepted extension.
    pub fn extension_allowed(&self, file_name: &str) -> bool {
        let ext = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
            _ => return false,
        };
        self.allowed_upload_exts.iter().any(|e| *e == ext)
    }
}
