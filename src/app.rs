use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::{self, Environment};
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin_middleware, validate_user_middleware};
use crate::state::AppState;

/// Full router with global middleware applied
pub fn app(state: AppState) -> Router {
    let max_body = config::config().api.max_request_size_bytes;

    Router::new()
        // Public
        .merge(public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        // Administrators
        .merge(elevated_routes(state.clone()))
        .with_state(state)
        // Global middleware
        .layer(DefaultBodyLimit::max(max_body))
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root_get))
        .route("/health", get(public::health_get))
        .route("/api/auth/register", post(public::register_post))
        .route("/api/auth/login", post(public::login_post))
        .route("/api/auth/refresh", post(public::refresh_post))
        .route("/api/init/seed", post(public::seed_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{ai, auth, campaigns, content, organizations, users};

    Router::new()
        // Session
        .route("/api/auth/me", get(auth::me_get))
        .route("/api/auth/logout", post(auth::logout_post))
        .route("/api/auth/change-password", put(auth::change_password_put))
        // Users
        .route("/api/users", get(users::user_list).post(users::user_create))
        .route(
            "/api/users/:id",
            get(users::user_show).put(users::user_update).delete(users::user_delete),
        )
        // Organizations
        .route(
            "/api/organizations",
            get(organizations::organization_list).post(organizations::organization_create),
        )
        .route(
            "/api/organizations/:id",
            get(organizations::organization_show)
                .put(organizations::organization_update)
                .delete(organizations::organization_delete),
        )
        // Campaigns
        .route("/api/campaigns", get(campaigns::campaign_list).post(campaigns::campaign_create))
        .route(
            "/api/campaigns/:id",
            get(campaigns::campaign_show)
                .put(campaigns::campaign_update)
                .delete(campaigns::campaign_delete),
        )
        .route(
            "/api/campaigns/:id/analytics",
            get(campaigns::analytics_get).post(campaigns::analytics_post),
        )
        .route(
            "/api/campaigns/:id/content",
            get(content::content_list).post(content::content_create),
        )
        // AI agents
        .route("/api/ai/narrative-architect", post(ai::narrative_architect_post))
        .route("/api/ai/content-synthesizer", post(ai::content_synthesizer_post))
        .route("/api/ai/distribution-optimizer", post(ai::distribution_optimizer_post))
        .route("/api/ai/feedback-intelligence", post(ai::feedback_intelligence_post))
        .route(
            "/api/ai/recommendations",
            get(ai::recommendation_list).post(ai::recommendation_create),
        )
        .route("/api/ai/recommendations/:id", get(ai::recommendation_show))
        .route("/api/ai/recommendations/:id/approve", put(ai::recommendation_approve))
        .route("/api/ai/recommendations/:id/reject", put(ai::recommendation_reject))
        .route("/api/ai/recommendations/:id/review", put(ai::recommendation_review))
        // Content
        .route("/api/content/:id", get(content::content_show))
        .route("/api/content/:id/approve", put(content::content_approve))
        .route("/api/content/:id/publish", put(content::content_publish))
        // Last layer added runs first: token, then user
        .route_layer(middleware::from_fn_with_state(state, validate_user_middleware))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn elevated_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/audit-logs", get(elevated::audit_log_list))
        .route_layer(middleware::from_fn(require_admin_middleware))
        .route_layer(middleware::from_fn_with_state(state, validate_user_middleware))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let config = config::config();
    if matches!(config.environment, Environment::Development) {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
