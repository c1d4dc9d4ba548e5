use crate::common::AuthError;
use crate::domains::auth::{JwtService, Role};
use axum::{middleware::Next, response::Response, Extension};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Authenticated user information from JWT
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub identity: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::AdminRequired)
        }
    }
}

/// Unwrap the optional extension set by `jwt_auth_middleware`.
pub fn require_user(user: Option<Extension<AuthUser>>) -> Result<AuthUser, AuthError> {
    user.map(|Extension(user)| user)
        .ok_or(AuthError::AuthenticationRequired)
}

/// JWT authentication middleware
///
/// Extracts JWT token from Authorization header, verifies it, and adds AuthUser to request extensions.
/// If no token or invalid token, request continues without AuthUser (public access).
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_user = extract_auth_user(&request, &jwt_service);

    if let Some(user) = auth_user {
        debug!("Authenticated user: {} (role: {})", user.identity, user.role);
        request.extensions_mut().insert(user);
    } else {
        debug!("No valid authentication token");
    }

    next.run(request).await
}

/// Extract and verify JWT token from request
fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    // Get Authorization header
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Extract token (handle both "Bearer <token>" and raw token)
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    // Verify token
    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        identity: claims.sub,
        role: claims.role,
    })
}
