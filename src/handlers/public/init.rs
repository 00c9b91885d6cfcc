// handlers/public/init.rs - POST /api/init/seed handler

use axum::extract::State;

use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::seed::{seed, SeedReport};
use crate::state::AppState;

/// Creates the bootstrap admin and sample organization.
/// Refused unless the seed endpoint is enabled in configuration.
pub async fn seed_post(State(state): State<AppState>) -> ApiResult<SeedReport> {
    if !config::config().api.enable_seed_endpoint {
        return Err(ApiError::forbidden("Seed endpoint is disabled"));
    }

    let report = seed(state.store.as_ref()).await?;
    Ok(ApiResponse::success(report))
}
