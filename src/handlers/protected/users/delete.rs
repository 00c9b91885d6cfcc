// handlers/protected/users/delete.rs - DELETE /api/users/:id handler

use axum::{extract::State, Extension};
use chrono::Utc;
use serde_json::{json, Value};

use crate::access::{can_modify_user, ensure, role_required, USER_MANAGERS};
use crate::api::ResourceId;
use crate::error::ApiError;
use crate::handlers::protected::utils::load_user;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::Role;

/// Soft delete: the account is deactivated, never removed
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<Value> {
    let actor = current.actor;
    ensure(role_required(USER_MANAGERS, &actor), "Insufficient permissions")?;

    if actor.id == id {
        return Err(ApiError::bad_request("Cannot delete your own account"));
    }

    let mut uow = state.store.begin().await?;
    let mut user = load_user(uow.as_mut(), id).await?;
    ensure(can_modify_user(&actor, &user), "Insufficient permissions")?;
    ensure(
        user.role != Role::SuperAdmin || actor.is_super_admin(),
        "Only super_admin can modify a super_admin",
    )?;

    user.is_active = false;
    user.updated_at = Utc::now();
    uow.update_user(&user).await?;
    uow.commit().await?;

    tracing::info!("User {} deactivated user {}", actor.id, user.id);
    Ok(ApiResponse::success(json!({ "message": "User deactivated successfully" })))
}
