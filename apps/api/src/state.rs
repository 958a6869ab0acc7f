use crate::matching::service::MatchService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the model client and the process-wide model pool.
    pub matcher: MatchService,
}
