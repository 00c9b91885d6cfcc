// handlers/elevated/mod.rs - Elevated handlers (administrators only)
//
// Security Level: valid access token + active super_admin or org_admin
// Route Prefix: /api/audit-logs
// Middleware: jwt_auth_middleware → validate_user_middleware → require_admin_middleware

pub mod audit_logs; // GET /api/audit-logs

pub use audit_logs::audit_log_list;
