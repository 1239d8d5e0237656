use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::layout::{MeasurementProvider, PaginationEngine};
use crate::preview::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pagination with the configured layout and measurement provider.
    /// Default provider: TextMetricsProvider (static Helvetica metrics).
    pub engine: PaginationEngine,
    pub previews: SessionStore,
}

impl AppState {
    pub fn new(config: &Config, provider: Arc<dyn MeasurementProvider>) -> Result<Self, AppError> {
        let engine = PaginationEngine::new(provider, config.page.clone(), config.measure_ready_timeout)?;
        Ok(Self {
            engine,
            previews: SessionStore::new(config.preview_idle_ttl),
        })
    }
}
