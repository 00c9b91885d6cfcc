// handlers/protected/users/create.rs - POST /api/users handler

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::access::{can_assign_role, ensure, role_required, USER_MANAGERS};
use crate::api::{parse_field, require, require_text, JsonBody};
use crate::audit::Origin;
use crate::auth::hash_password_async;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::handlers::protected::utils::load_organization;
use crate::handlers::public::auth::register::{validate_email, validate_password};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub organization_id: Option<i64>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

/**
 * POST /api/users - Create a user on behalf of an administrator
 *
 * An org_admin always creates users inside their own organization; the
 * `organization_id` field is only honoured for super_admin.
 */
pub async fn user_create(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    origin: Origin,
    JsonBody(body): JsonBody<CreateUserRequest>,
) -> ApiResult<Value> {
    let actor = current.actor;
    ensure(role_required(USER_MANAGERS, &actor), "Insufficient permissions")?;

    let email = require_text("email", body.email)?;
    let password = require("password", body.password)?;
    let full_name = require_text("full_name", body.full_name)?;
    let role = require("role", parse_field::<Role>("role", body.role.as_deref())?)?;

    validate_email(&email)?;
    validate_password(&password)?;
    ensure(can_assign_role(&actor, role), "Insufficient permissions to assign this role")?;

    let organization_id = if actor.is_super_admin() {
        body.organization_id
    } else {
        match actor.organization_id {
            Some(own) => Some(own),
            None => return Err(ApiError::forbidden("You must belong to an organization to create users")),
        }
    };

    let password_hash = hash_password_async(password).await?;

    let mut uow = state.store.begin().await?;

    if uow.user_by_email(&email).await?.is_some() {
        return Err(ApiError::field_error("email", "Email already registered"));
    }
    if let Some(id) = organization_id {
        load_organization(uow.as_mut(), id).await?;
    }

    let user = uow
        .insert_user(NewUser {
            email,
            password_hash,
            full_name,
            role,
            organization_id,
            is_active: body.is_active.unwrap_or(true),
            is_verified: body.is_verified.unwrap_or(false),
        })
        .await?;
    uow.commit().await?;

    tracing::info!("User {} created user {} as {}", actor.id, user.id, user.role);
    state.audit.user_created(actor.id, user.id, &origin).await;

    Ok(ApiResponse::created(json!({
        "message": "User created successfully",
        "user": user
    })))
}
