use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::AppState;

/// Static-token authentication middleware.
///
/// Every request must carry `Authorization: Bearer <token>` matching the
/// configured `AUTH_TOKEN`. The bare token without a scheme is accepted too,
/// since older admin clients send it that way.
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::trim);

    let presented = match auth_header {
        Some(value) if !value.is_empty() => value.strip_prefix("Bearer ").unwrap_or(value),
        _ => {
            return AppError::Unauthorized("Authorization header is required".into())
                .into_response()
        }
    };

    if presented == state.config.auth_token {
        next.run(req).await
    } else {
        tracing::debug!(path = %req.uri().path(), "Rejected request with invalid token");
        AppError::Unauthorized("Invalid authorization token".into()).into_response()
    }
}
