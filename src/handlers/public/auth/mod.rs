// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints. Every outcome of a login attempt is audited.

pub mod login;    // POST /api/auth/login - authenticate and get tokens
pub mod refresh;  // POST /api/auth/refresh - trade a refresh token for an access token
pub mod register; // POST /api/auth/register - create new account

pub use login::login_post;
pub use refresh::refresh_post;
pub use register::register_post;

// AUTHENTICATION FLOW:
//
// 1. **Register**: POST /api/auth/register
//    - Input: { "email", "password", "full_name", "role" }
//    - Privileged roles and organization membership cannot be self-assigned
//    - Disabled when registration is turned off
//
// 2. **Login**: POST /api/auth/login
//    - Input: { "email", "password" }
//    - Returns: access token + refresh token + user
//
// 3. **Refresh**: POST /api/auth/refresh
//    - Input: Authorization: Bearer <refresh token>
//    - Returns: a new access token
//
// Access tokens are the only tokens accepted on /api/* protected routes.
