// handlers/protected/users/update.rs - PUT /api/users/:id handler

use axum::{extract::State, Extension};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::access::{can_assign_role, can_manage_users, can_modify_user, ensure, Actor};
use crate::api::{optional_text, parse_field, JsonBody, ResourceId};
use crate::error::ApiError;
use crate::handlers::protected::utils::{load_organization, load_user};
use crate::handlers::public::auth::register::validate_email;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::Role;

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
    pub organization_id: Option<i64>,
}

impl UpdateUserRequest {
    /// Names of the manager-only fields present in the request
    fn managed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.email.is_some() {
            fields.push("email");
        }
        if self.role.is_some() {
            fields.push("role");
        }
        if self.is_active.is_some() {
            fields.push("is_active");
        }
        if self.is_verified.is_some() {
            fields.push("is_verified");
        }
        fields
    }
}

/// Rejects any field the caller may not change on this user
fn check_field_permissions(actor: &Actor, body: &UpdateUserRequest) -> Result<(), ApiError> {
    if !can_manage_users(actor) {
        if let Some(field) = body.managed_fields().first() {
            return Err(ApiError::forbidden(format!("Insufficient permissions to modify {}", field)));
        }
    }
    if body.organization_id.is_some() && !actor.is_super_admin() {
        return Err(ApiError::forbidden("Only super_admin can change a user's organization"));
    }
    Ok(())
}

pub async fn user_update(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    ResourceId(id): ResourceId,
    JsonBody(body): JsonBody<UpdateUserRequest>,
) -> ApiResult<Value> {
    let actor = current.actor;
    let mut uow = state.store.begin().await?;
    let mut user = load_user(uow.as_mut(), id).await?;

    ensure(can_modify_user(&actor, &user), "Insufficient permissions")?;
    ensure(
        user.role != Role::SuperAdmin || actor.is_super_admin(),
        "Only super_admin can modify a super_admin",
    )?;
    check_field_permissions(&actor, &body)?;

    if let Some(full_name) = body.full_name.clone() {
        user.full_name = optional_text(Some(full_name))
            .ok_or_else(|| ApiError::field_error("full_name", "full_name must not be empty"))?;
    }

    if let Some(email) = optional_text(body.email.clone()) {
        validate_email(&email)?;
        if let Some(existing) = uow.user_by_email(&email).await? {
            if existing.id != user.id {
                return Err(ApiError::field_error("email", "Email already registered"));
            }
        }
        user.email = email;
    }

    if let Some(role) = parse_field::<Role>("role", body.role.as_deref())? {
        ensure(can_assign_role(&actor, role), "Insufficient permissions to assign this role")?;
        user.role = role;
    }

    if let Some(is_active) = body.is_active {
        user.is_active = is_active;
    }
    if let Some(is_verified) = body.is_verified {
        user.is_verified = is_verified;
    }

    if let Some(organization_id) = body.organization_id {
        load_organization(uow.as_mut(), organization_id).await?;
        user.organization_id = Some(organization_id);
    }

    user.updated_at = Utc::now();
    uow.update_user(&user).await?;
    uow.commit().await?;

    tracing::info!("User {} updated user {}", actor.id, user.id);
    Ok(ApiResponse::success(json!({
        "message": "User updated successfully",
        "user": user
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor {
            id: 5,
            role,
            organization_id: Some(1),
            is_active: true,
        }
    }

    #[test]
    fn members_may_only_rename_themselves() {
        let rename = UpdateUserRequest {
            full_name: Some("New Name".into()),
            ..Default::default()
        };
        assert!(check_field_permissions(&actor(Role::Viewer), &rename).is_ok());

        let promote = UpdateUserRequest {
            role: Some("org_admin".into()),
            ..Default::default()
        };
        let err = check_field_permissions(&actor(Role::Viewer), &promote).unwrap_err();
        assert_eq!(err.message(), "Insufficient permissions to modify role");
        assert!(check_field_permissions(&actor(Role::OrgAdmin), &promote).is_ok());
    }

    #[test]
    fn organization_moves_are_super_admin_only() {
        let moved = UpdateUserRequest {
            organization_id: Some(2),
            ..Default::default()
        };
        assert!(check_field_permissions(&actor(Role::OrgAdmin), &moved).is_err());
        assert!(check_field_permissions(&actor(Role::SuperAdmin), &moved).is_ok());
    }
}
