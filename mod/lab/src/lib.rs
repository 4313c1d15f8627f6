pub mod api;
pub mod model;
pub mod policy;
pub mod rules;
pub mod service;
pub mod store;
pub mod validate;
pub mod worker;

use std::sync::Arc;

use axum::Router;

use labkom_blob::BlobStore;
use labkom_core::Module;
use labkom_kv::KVStore;
use labkom_sql::SQLStore;

use service::LabService;
use worker::SweepConfig;

/// The Lab module — request intake, approval lifecycle, computer
/// inventory, maintenance tracking and the post-usage questionnaire.
///
/// Software rules, policy knobs and reference lists come from the KV
/// store's read-only file layer; requests, computers, tasks and feedback
/// live in SQL; uploaded documents land in the blob store.
pub struct LabModule {
    service: Arc<LabService>,
    sweep_cancel: tokio_util::sync::CancellationToken,
}

impl LabModule {
    /// Create the lab module, initialise storage, and start the expiry
    /// sweep. Must run inside a tokio runtime.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        kv: Arc<dyn KVStore>,
        blob: Arc<dyn BlobStore>,
    ) -> Result<Self, labkom_core::ServiceError> {
        Self::with_config(sql, kv, blob, SweepConfig::default())
    }

    /// Create with explicit sweep configuration.
    pub fn with_config(
        sql: Arc<dyn SQLStore>,
        kv: Arc<dyn KVStore>,
        blob: Arc<dyn BlobStore>,
        sweep_config: SweepConfig,
    ) -> Result<Self, labkom_core::ServiceError> {
        let service = Arc::new(LabService::new(sql, kv, blob)?);
        let cancel = worker::start(Arc::clone(&service), sweep_config);

        Ok(Self {
            service,
            sweep_cancel: cancel,
        })
    }

    /// Get a reference to the LabService for programmatic use.
    pub fn service(&self) -> &Arc<LabService> {
        &self.service
    }

    /// Stop the expiry sweep. Called on server shutdown.
    pub fn shutdown(&self) {
        self.sweep_cancel.cancel();
    }
}

impl Module for LabModule {
    fn name(&self) -> &str {
        "lab"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
