// handlers/protected/content/mod.rs - Campaign content handlers
//
// Content moves draft/pending_review → approved → published. Approval and
// publication are gated by role on top of campaign access.

pub mod create;     // POST /api/campaigns/:id/content
pub mod list;       // GET /api/campaigns/:id/content
pub mod show;       // GET /api/content/:id
pub mod transition; // PUT /api/content/:id/approve, PUT /api/content/:id/publish

pub use create::content_create;
pub use list::content_list;
pub use show::content_show;
pub use transition::{content_approve, content_publish};
