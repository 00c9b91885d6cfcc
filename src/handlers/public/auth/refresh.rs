// handlers/public/auth/refresh.rs - POST /api/auth/refresh handler

use axum::{extract::State, http::HeaderMap};
use serde_json::{json, Value};

use crate::auth::{decode_token, issue_token, TokenKind};
use crate::config;
use crate::error::ApiError;
use crate::middleware::{extract_bearer_token, ApiResponse, ApiResult};
use crate::state::AppState;

/// Trades a refresh token (Bearer) for a new access token.
/// The user must still exist and be active.
pub async fn refresh_post(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Value> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;
    let claims = decode_token(&token, TokenKind::Refresh)?;
    let user_id = claims.user_id()?;

    let user = {
        let mut uow = state.store.begin().await?;
        uow.user_by_id(user_id).await?
    };
    let user = user.ok_or_else(|| ApiError::unauthorized("User not found"))?;
    if !user.is_active {
        return Err(ApiError::forbidden("User account is inactive"));
    }

    let access_token = issue_token(user.id, TokenKind::Access)?;
    tracing::debug!("Issued refreshed access token for user {}", user.id);

    Ok(ApiResponse::success(json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": config::config().security.access_token_minutes * 60
    })))
}
