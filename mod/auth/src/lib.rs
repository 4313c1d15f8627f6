pub mod api;
pub mod model;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;

use labkom_core::Module;
use labkom_sql::SQLStore;

use service::{AuthConfig, AuthService};

/// The Auth module — admin login, token verification and logout.
///
/// Accounts are seeded from server configuration; the server's auth
/// middleware calls [`AuthService::verify_token`] for every guarded
/// route.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    pub fn new(sql: Arc<dyn SQLStore>, config: AuthConfig) -> Result<Self, labkom_core::ServiceError> {
        let service = Arc::new(AuthService::new(sql, config)?);
        Ok(Self { service })
    }

    /// Get a reference to the AuthService, for the middleware and for
    /// account seeding at startup.
    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
