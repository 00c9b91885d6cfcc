// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (access token + active user) → Elevated (administrators)

pub mod elevated;  // Tier 3: super_admin / org_admin only (/api/audit-logs)
pub mod protected; // Tier 2: JWT authentication required (/api/*)
pub mod public;    // Tier 1: No authentication required (/, /health, /api/auth/*)
