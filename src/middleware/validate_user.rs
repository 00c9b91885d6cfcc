use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::access::{role_required, Actor, USER_MANAGERS};
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// The stored user behind the token, checked to exist and be active
#[derive(Clone, Debug)]
pub struct ValidatedUser {
    pub user: User,
    pub actor: Actor,
}

/// Middleware that resolves the token's user from the store.
/// Unknown users are unauthenticated; inactive users are refused.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Get AuthUser from JWT middleware
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    // The unit of work is dropped before the handler runs
    let user = {
        let mut uow = state.store.begin().await?;
        uow.user_by_id(auth_user.user_id).await?
    };

    let user = user.ok_or_else(|| {
        tracing::warn!("User validation failed: user {} not found", auth_user.user_id);
        ApiError::unauthorized("User not found")
    })?;

    if !user.is_active {
        tracing::warn!("User validation failed: user {} is inactive", user.id);
        return Err(ApiError::forbidden("User account is inactive"));
    }

    tracing::debug!("User validation successful: {} ({}) as {}", user.email, user.id, user.role);

    let actor = Actor::from(&user);
    request.extensions_mut().insert(ValidatedUser { user, actor });

    Ok(next.run(request).await)
}

/// Gate for the elevated tier: only super_admin and org_admin pass
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let allowed = request
        .extensions()
        .get::<ValidatedUser>()
        .map(|current| role_required(USER_MANAGERS, &current.actor))
        .ok_or_else(|| ApiError::unauthorized("User validation required before role check"))?;

    if !allowed {
        return Err(ApiError::forbidden("Administrator role required"));
    }

    Ok(next.run(request).await)
}
