// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::{require, require_text, JsonBody};
use crate::audit::Origin;
use crate::auth::{issue_token_pair, verify_password_async, TokenPair};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
}

/**
 * POST /api/auth/login - Authenticate and receive tokens
 *
 * Expected Output (Success):
 * ```json
 * {
 *   "success": true,
 *   "data": {
 *     "access_token": "eyJhbGciOiJIUzI1NiI...",
 *     "refresh_token": "eyJhbGciOiJIUzI1NiI...",
 *     "token_type": "Bearer",
 *     "expires_in": 3600,
 *     "user": { "id": 1, "email": "...", "role": "org_admin", ... }
 *   }
 * }
 * ```
 *
 * Unknown email and wrong password both answer 401 with the same message.
 * The hash is checked on the blocking pool with no unit of work open.
 */
pub async fn login_post(
    State(state): State<AppState>,
    origin: Origin,
    JsonBody(body): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = require_text("email", body.email)?;
    let password = require("password", body.password)?;

    let found = {
        let mut uow = state.store.begin().await?;
        uow.user_by_email(&email).await?
    };

    let Some(found) = found else {
        tracing::warn!("Login failed: unknown email {}", email);
        state.audit.login_failed(None, "unknown_email", &origin).await;
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    if !verify_password_async(password, found.password_hash.clone()).await? {
        tracing::warn!("Login failed: wrong password for user {}", found.id);
        state.audit.login_failed(Some(found.id), "invalid_password", &origin).await;
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    if !found.is_active {
        tracing::warn!("Login refused: user {} is inactive", found.id);
        state.audit.login_failed(Some(found.id), "account_inactive", &origin).await;
        return Err(ApiError::forbidden("User account is inactive"));
    }

    let tokens = issue_token_pair(found.id)?;

    // Re-read so the last_login write does not clobber a concurrent edit
    let mut uow = state.store.begin().await?;
    let mut user = uow
        .user_by_id(found.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;
    let now = Utc::now();
    user.last_login = Some(now);
    user.updated_at = now;
    uow.update_user(&user).await?;
    uow.commit().await?;

    tracing::info!("User {} logged in", user.id);
    state.audit.login_success(user.id, &origin).await;

    Ok(ApiResponse::success(LoginResponse { tokens, user }))
}
