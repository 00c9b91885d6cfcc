// handlers/protected/users/show.rs - GET /api/users/:id handler

use axum::{extract::State, Extension};

use crate::access::{can_view_user, ensure};
use crate::api::ResourceId;
use crate::database::models::User;
use crate::handlers::protected::utils::load_user;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;

pub async fn user_show(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<User> {
    let mut uow = state.store.begin().await?;
    let user = load_user(uow.as_mut(), id).await?;

    ensure(can_view_user(&current.actor, &user), "Insufficient permissions")?;

    Ok(ApiResponse::success(user))
}
