use axum::Router;

/// One mountable slice of the service.
///
/// auth, lab and agenda each implement this; the binary collects them
/// and merges their routers flat under `/api/v1`. Routers arrive with
/// their state already applied, so merging needs no further wiring.
pub trait Module: Send + Sync {
    /// Short name, for startup logging.
    fn name(&self) -> &str;

    /// The module's routes, ready to merge.
    fn routes(&self) -> Router;
}
