pub mod health;

use axum::{middleware, routing::get, Router};

use crate::auth::require_gateway_secret;
use crate::insights::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/v1/insights", get(handlers::handle_get_insight))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_gateway_secret,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(api)
        .with_state(state)
}
