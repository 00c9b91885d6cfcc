// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: valid access token + existing, active user
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware → validate_user_middleware
//
// Every handler receives the caller as `Extension<ValidatedUser>` and asks
// the access module for a decision before touching anything.

pub mod ai;
pub mod auth;
pub mod campaigns;
pub mod content;
pub mod organizations;
pub mod users;
pub mod utils;
