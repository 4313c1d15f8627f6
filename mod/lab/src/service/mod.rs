pub mod allocator;
pub mod catalog;
pub mod feedback;
pub mod maintenance;
pub mod request;

use std::sync::Arc;

use tracing::warn;

use labkom_blob::BlobStore;
use labkom_core::ServiceError;
use labkom_kv::KVStore;
use labkom_sql::SQLStore;

use crate::policy::Policy;
use crate::rules::SoftwareRules;
use crate::store::LabStore;

/// Lab service: request lifecycle, computer inventory, maintenance,
/// reference data and questionnaire feedback.
///
/// Rules and policy come from the read-only file layer and are loaded
/// once at construction; the file layer never changes while running.
pub struct LabService {
    pub(crate) store: LabStore,
    pub(crate) kv: Arc<dyn KVStore>,
    pub(crate) blob: Arc<dyn BlobStore>,
    pub(crate) rules: SoftwareRules,
    pub(crate) policy: Policy,
}

impl LabService {
    pub fn new(
        sql: Arc<dyn SQLStore>,
        kv: Arc<dyn KVStore>,
        blob: Arc<dyn BlobStore>,
    ) -> Result<Self, ServiceError> {
        let store = LabStore::new(sql)?;
        let rules = SoftwareRules::load(kv.as_ref());
        let policy = Policy::load(kv.as_ref());
        let svc = Self {
            store,
            kv,
            blob,
            rules,
            policy,
        };
        svc.sync_inventory()?;
        Ok(svc)
    }

    /// Read a YAML string list from the file layer, empty when absent.
    pub(crate) fn reference_list(&self, key: &str) -> Vec<String> {
        match self.kv.get(key) {
            Ok(Some(raw)) => match serde_yaml::from_slice(&raw) {
                Ok(list) => list,
                Err(e) => {
                    warn!("{key} is not a valid YAML list: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("{key} unavailable: {e}");
                Vec::new()
            }
        }
    }
}
