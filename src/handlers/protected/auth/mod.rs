// handlers/protected/auth/mod.rs - Authenticated account endpoints

pub mod password; // PUT /api/auth/change-password
pub mod session;  // GET /api/auth/me, POST /api/auth/logout

pub use password::change_password_put;
pub use session::{logout_post, me_get};
