use std::sync::Arc;

use crate::config::Config;
use crate::insights::service::InsightService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub insights: Arc<InsightService>,
    pub config: Config,
}
