use leadscope_client::Engine;
use leadscope_core::config::ScraperConfig;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    /// Cloned into every batch; each request launches its own session.
    pub config: ScraperConfig,
    pub engine: Engine,
}
