// handlers/protected/auth/session.rs - GET /api/auth/me and POST /api/auth/logout

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::audit::Origin;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidatedUser};
use crate::state::AppState;

/// The caller's profile together with their organization, if any
pub async fn me_get(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
) -> ApiResult<Value> {
    let organization = match current.user.organization_id {
        Some(id) => {
            let mut uow = state.store.begin().await?;
            uow.organization_by_id(id).await?
        }
        None => None,
    };

    Ok(ApiResponse::success(json!({
        "user": current.user,
        "organization": organization
    })))
}

/// Tokens are stateless; logout only leaves an audit trail
pub async fn logout_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Extension(current): Extension<ValidatedUser>,
    origin: Origin,
) -> ApiResult<Value> {
    tracing::info!("User {} logged out (token {})", current.user.id, auth.jti);
    state.audit.logout(current.user.id, &origin).await;

    Ok(ApiResponse::success(json!({ "message": "Logged out successfully" })))
}
