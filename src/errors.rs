use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Failures of the statistics queries.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("{0}")]
    InvalidWindow(String),

    #[error("aggregation failed: {0}")]
    AggregationFailed(#[source] anyhow::Error),

    #[error("no wager data found for the specified time period")]
    NoDataInPeriod,

    #[error("user not found in wager data for the specified time period")]
    UserNotFound,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<StatsError> for AppError {
    fn from(e: StatsError) -> Self {
        match e {
            StatsError::InvalidWindow(msg) => {
                AppError::BadRequest(format!("Invalid date parameters: {msg}"))
            }
            StatsError::NoDataInPeriod | StatsError::UserNotFound => {
                AppError::NotFound(e.to_string())
            }
            StatsError::AggregationFailed(inner) => AppError::Internal(inner),
        }
    }
}
