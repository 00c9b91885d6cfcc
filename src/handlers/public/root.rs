// handlers/public/root.rs - GET / and GET /health handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::middleware::ApiResponse;
use crate::state::AppState;

pub async fn root_get() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": "Civic API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Multi-tenant backend for civic organizations, campaigns and AI-assisted content",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "public_auth": "/api/auth/register, /api/auth/login, /api/auth/refresh (public)",
            "auth": "/api/auth/me, /api/auth/logout, /api/auth/change-password (protected)",
            "users": "/api/users[/:id] (protected)",
            "organizations": "/api/organizations[/:id] (protected)",
            "campaigns": "/api/campaigns[/:id][/analytics|/content] (protected)",
            "ai": "/api/ai/* (protected)",
            "content": "/api/content/:id[/approve|/publish] (protected)",
            "audit": "/api/audit-logs (restricted to administrators)",
        }
    }))
}

/// Reports store connectivity; 503 when the store cannot be reached
pub async fn health_get(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
