// handlers/protected/users/mod.rs - User management handlers
//
// Listing, creating and deleting users is reserved to super_admin and
// org_admin. Anyone may read and edit their own profile name.

pub mod create; // POST /api/users
pub mod delete; // DELETE /api/users/:id
pub mod list;   // GET /api/users
pub mod show;   // GET /api/users/:id
pub mod update; // PUT /api/users/:id

pub use create::user_create;
pub use delete::user_delete;
pub use list::user_list;
pub use show::user_show;
pub use update::user_update;
