pub mod api;
pub mod model;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;

use labkom_core::{Module, Notifier};
use labkom_sql::SQLStore;

use service::AgendaService;

/// The Agenda module — room scheduling and reminder broadcasts.
///
/// Reminders leave through the [`Notifier`] injected at startup; the
/// default wiring logs them.
pub struct AgendaModule {
    service: Arc<AgendaService>,
}

impl AgendaModule {
    pub fn new(
        sql: Arc<dyn SQLStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, labkom_core::ServiceError> {
        let service = Arc::new(AgendaService::new(sql, notifier)?);
        Ok(Self { service })
    }

    pub fn service(&self) -> &Arc<AgendaService> {
        &self.service
    }
}

impl Module for AgendaModule {
    fn name(&self) -> &str {
        "agenda"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
