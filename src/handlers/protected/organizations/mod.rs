// handlers/protected/organizations/mod.rs - Organization (tenant) handlers

pub mod create; // POST /api/organizations
pub mod delete; // DELETE /api/organizations/:id
pub mod list;   // GET /api/organizations
pub mod show;   // GET /api/organizations/:id
pub mod update; // PUT /api/organizations/:id

pub use create::organization_create;
pub use delete::organization_delete;
pub use list::organization_list;
pub use show::organization_show;
pub use update::organization_update;
