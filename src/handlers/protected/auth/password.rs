// handlers/protected/auth/password.rs - PUT /api/auth/change-password handler

use axum::{extract::State, Extension};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{require, JsonBody};
use crate::auth::{hash_password_async, verify_password_async};
use crate::error::ApiError;
use crate::handlers::protected::utils::load_user;
use crate::handlers::public::auth::register::validate_password;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

pub async fn change_password_put(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    JsonBody(body): JsonBody<ChangePasswordRequest>,
) -> ApiResult<Value> {
    let current_password = require("current_password", body.current_password)?;
    let new_password = require("new_password", body.new_password)?;
    validate_password(&new_password).map_err(|_| {
        ApiError::field_error("new_password", "New password must be at least 8 characters")
    })?;

    let stored_hash = {
        let mut uow = state.store.begin().await?;
        let user = load_user(uow.as_mut(), current.user.id).await?;
        user.password_hash
    };

    if !verify_password_async(current_password, stored_hash.clone()).await? {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }
    let new_hash = hash_password_async(new_password).await?;

    let mut uow = state.store.begin().await?;
    let mut user = load_user(uow.as_mut(), current.user.id).await?;
    if user.password_hash != stored_hash {
        return Err(ApiError::conflict("Password was changed by another request"));
    }
    user.password_hash = new_hash;
    user.updated_at = Utc::now();
    uow.update_user(&user).await?;
    uow.commit().await?;

    tracing::info!("User {} changed their password", user.id);
    Ok(ApiResponse::success(json!({ "message": "Password changed successfully" })))
}
