//! Application setup and server configuration.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    create_issue_handler, get_issue_handler, health_handler, list_issues_handler, me_handler,
    request_otp_handler, transition_status_handler, upload_handler, verify_otp_handler,
    MAX_FILES_PER_UPLOAD,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    /// Directory served under /uploads
    pub upload_dir: PathBuf,
    /// Per-file byte limit for photo uploads
    pub upload_limit: usize,
}

impl AppState {
    pub fn new(deps: ServerDeps, upload_dir: PathBuf, upload_limit: usize) -> Self {
        Self {
            deps: Arc::new(deps),
            upload_dir,
            upload_limit,
        }
    }
}

/// Build the router with every route and middleware except rate limiting.
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - allow any origin, the API is bearer-token based
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let jwt_service = state.deps.jwt_service.clone();
    // Multipart framing overhead on top of the photos themselves
    let upload_body_limit = state.upload_limit * MAX_FILES_PER_UPLOAD + 64 * 1024;

    Router::new()
        // Auth
        .route("/api/auth/request-otp", post(request_otp_handler))
        .route("/api/auth/verify-otp", post(verify_otp_handler))
        .route("/api/auth/me", get(me_handler))
        // Issues
        .route(
            "/api/issues",
            get(list_issues_handler).post(create_issue_handler),
        )
        .route("/api/issues/:id", get(get_issue_handler))
        .route("/api/issues/:id/status", patch(transition_status_handler))
        // Photo evidence
        .route(
            "/api/uploads",
            post(upload_handler).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .nest_service("/uploads", ServeDir::new(&state.upload_dir))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build the Axum application: full router plus per-IP rate limiting.
///
/// Must be served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_app(state: AppState) -> anyhow::Result<Router> {
    // 10 requests per second per IP with bursts of 20
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .use_headers() // Extract IP from X-Forwarded-For header
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    Ok(build_router(state).layer(GovernorLayer {
        config: rate_limit_config,
    }))
}
