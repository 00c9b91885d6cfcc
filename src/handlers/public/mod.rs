// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service information, token acquisition and the development seed endpoint.
//
// Security Level: None
// Route Prefix: / and /api/auth/*, /api/init/*
// Middleware: None

pub mod auth;
pub mod init;
pub mod root;

pub use auth::*;
pub use init::seed_post;
pub use root::{health_get, root_get};
