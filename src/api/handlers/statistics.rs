use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{DailyWagerVolume, GrossGamingRevenue, UserWagerPercentile};
use crate::stats::window::DATE_FORMAT;
use crate::stats::QueryWindow;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TimeRangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct GgrReport {
    pub from: String,
    pub to: String,
    pub gross_gaming_revenue: Vec<GrossGamingRevenue>,
}

#[derive(Serialize)]
pub struct DailyVolumeReport {
    pub from: String,
    pub to: String,
    pub daily_wager_volume: Vec<DailyWagerVolume>,
}

#[derive(Serialize)]
pub struct PercentileReport {
    pub from: String,
    pub to: String,
    pub user_percentile: UserWagerPercentile,
}

fn parse_window(state: &AppState, query: &TimeRangeQuery) -> Result<QueryWindow, AppError> {
    match (query.from.as_deref(), query.to.as_deref()) {
        (Some(from), Some(to)) => Ok(state.stats.window(from, to)?),
        _ => Err(AppError::BadRequest(
            "Invalid date parameters: from and to are required (YYYY-MM-DD)".into(),
        )),
    }
}

fn bounds(window: &QueryWindow) -> (String, String) {
    (
        window.from().format(DATE_FORMAT).to_string(),
        window.to().format(DATE_FORMAT).to_string(),
    )
}

/// GET /gross_gaming_rev
pub async fn gross_gaming_revenue(
    State(state): State<AppState>,
    Query(query): Query<TimeRangeQuery>,
) -> Result<Json<ApiResponse<GgrReport>>, AppError> {
    let window = parse_window(&state, &query)?;
    let results = state.stats.gross_gaming_revenue(&window).await?;
    let (from, to) = bounds(&window);

    Ok(Json(ApiResponse {
        success: true,
        data: GgrReport {
            from,
            to,
            gross_gaming_revenue: results,
        },
    }))
}

/// GET /daily_wager_volume
pub async fn daily_wager_volume(
    State(state): State<AppState>,
    Query(query): Query<TimeRangeQuery>,
) -> Result<Json<ApiResponse<DailyVolumeReport>>, AppError> {
    let window = parse_window(&state, &query)?;
    let results = state.stats.daily_wager_volume(&window).await?;
    let (from, to) = bounds(&window);

    Ok(Json(ApiResponse {
        success: true,
        data: DailyVolumeReport {
            from,
            to,
            daily_wager_volume: results,
        },
    }))
}

/// GET /user/:user_id/wager_percentile
pub async fn user_wager_percentile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<TimeRangeQuery>,
) -> Result<Json<ApiResponse<PercentileReport>>, AppError> {
    let user_id = Uuid::parse_str(&user_id).map_err(|_| {
        AppError::BadRequest("Invalid user ID format: expected a UUID".into())
    })?;

    let window = parse_window(&state, &query)?;
    let result = state.stats.user_wager_percentile(&window, user_id).await?;
    let (from, to) = bounds(&window);

    Ok(Json(ApiResponse {
        success: true,
        data: PercentileReport {
            from,
            to,
            user_percentile: result,
        },
    }))
}
