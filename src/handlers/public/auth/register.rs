// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{parse_field, require, require_text, JsonBody};
use crate::audit::Origin;
use crate::auth::{hash_password_async, password::MIN_PASSWORD_LENGTH};
use crate::config;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub organization_id: Option<i64>,
}

/**
 * POST /api/auth/register - Create a new account
 *
 * Expected Input:
 * ```json
 * {
 *   "email": "string",          // Required, unique
 *   "password": "string",       // Required, at least 8 characters
 *   "full_name": "string",      // Required
 *   "role": "string"            // Required, any role except super_admin/org_admin
 * }
 * ```
 *
 * Self-registered accounts start outside every organization. Sending
 * `organization_id` is refused with 403; an administrator attaches the user
 * to a tenant afterwards.
 */
pub async fn register_post(
    State(state): State<AppState>,
    origin: Origin,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> ApiResult<Value> {
    if !config::config().security.allow_registration {
        return Err(ApiError::forbidden("Registration is disabled"));
    }

    let email = require_text("email", body.email)?;
    let password = require("password", body.password)?;
    let full_name = require_text("full_name", body.full_name)?;
    let role = require("role", parse_field::<Role>("role", body.role.as_deref())?)?;

    validate_email(&email)?;
    validate_password(&password)?;

    if matches!(role, Role::SuperAdmin | Role::OrgAdmin) {
        return Err(ApiError::forbidden(format!("Role '{}' cannot be self-assigned", role)));
    }
    if body.organization_id.is_some() {
        return Err(ApiError::forbidden("Organization membership must be granted by an administrator"));
    }

    let password_hash = hash_password_async(password).await?;

    let mut uow = state.store.begin().await?;

    if uow.user_by_email(&email).await?.is_some() {
        return Err(ApiError::field_error("email", "Email already registered"));
    }

    let user = uow
        .insert_user(NewUser {
            email,
            password_hash,
            full_name,
            role,
            organization_id: None,
            is_active: true,
            is_verified: false,
        })
        .await?;
    uow.commit().await?;

    tracing::info!("User registered: {} ({}) as {}", user.email, user.id, user.role);
    state.audit.user_registered(user.id, &origin).await;

    Ok(ApiResponse::created(json!({
        "message": "User registered successfully",
        "user": user
    })))
}

pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ApiError::field_error("email", "Invalid email address")),
    }
}

pub(crate) fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::field_error(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    Ok(())
}
