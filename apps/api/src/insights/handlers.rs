//! Axum route handlers for the Insights API.

use axum::{extract::State, Json};

use crate::auth::CallerIdentity;
use crate::errors::AppError;
use crate::models::insight::IndustryInsight;
use crate::state::AppState;

/// GET /api/v1/insights
///
/// Returns the insight for the caller's industry, generating it on first request.
/// 401 without an identity, 404 when the identity has no profile.
pub async fn handle_get_insight(
    State(state): State<AppState>,
    identity: Option<CallerIdentity>,
) -> Result<Json<IndustryInsight>, AppError> {
    let insight = state
        .insights
        .get_industry_insight(identity.as_ref())
        .await?;
    Ok(Json(insight))
}
