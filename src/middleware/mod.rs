pub mod auth;
pub mod response;
pub mod validate_user;

pub use auth::{extract_bearer_token, jwt_auth_middleware, AuthUser};
pub use response::{ApiResponse, ApiResult};
pub use validate_user::{require_admin_middleware, validate_user_middleware, ValidatedUser};
