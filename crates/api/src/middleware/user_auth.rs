//! User JWT authentication middleware.
//!
//! Tokens are issued by the external identity system; this service verifies
//! them and extracts the caller's user ID.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;
use shared::jwt::{self, JwtVerifier};

/// Authenticated user information extracted from the JWT.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// JWT ID (jti) for session correlation.
    pub jti: String,
}

impl UserAuth {
    /// Validates an access token and returns the caller's identity.
    pub fn validate(verifier: &JwtVerifier, token: &str) -> Result<Self, String> {
        let claims = verifier
            .verify_access_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let user_id =
            jwt::extract_user_id(&claims).map_err(|_| "Invalid user ID in token".to_string())?;

        Ok(UserAuth {
            user_id,
            jti: claims.jti,
        })
    }
}

/// Middleware that requires JWT user authentication.
///
/// Validates the Bearer token in the Authorization header and rejects
/// requests without a valid JWT. The caller's identity is stored in request
/// extensions for downstream handlers.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    match UserAuth::validate(&state.jwt, token) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("JWT validation failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = json!({
        "error": "unauthorized",
        "message": message,
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
