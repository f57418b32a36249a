//! Week API endpoints
//!
//! Updates replace the whole record; every field is required.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use planner_core::week::{Week, WeekInput};

use crate::error::{api_error, ApiResult};
use crate::extract::Body;
use crate::state::AppState;

/// GET /weeks - List all weeks
async fn list_weeks(State(state): State<AppState>) -> ApiResult<Json<Vec<Week>>> {
    let weeks = state.planner().list_weeks().await.map_err(api_error)?;
    Ok(Json(weeks))
}

/// POST /weeks - Create a week
async fn create_week(
    State(state): State<AppState>,
    Body(body): Body,
) -> ApiResult<(StatusCode, Json<Week>)> {
    let input = WeekInput::from_json(&body).map_err(api_error)?;
    let week = state.planner().create_week(input).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(week)))
}

/// PUT /weeks/:id - Replace a week
async fn update_week(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Body(body): Body,
) -> ApiResult<Json<Week>> {
    let input = WeekInput::from_json(&body).map_err(api_error)?;
    let week = state
        .planner()
        .update_week(&id, input)
        .await
        .map_err(api_error)?;
    Ok(Json(week))
}

/// DELETE /weeks/:id - Delete a week, returning it
async fn delete_week(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Week>> {
    let week = state.planner().delete_week(&id).await.map_err(api_error)?;
    Ok(Json(week))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/weeks", get(list_weeks).post(create_week))
        .route("/weeks/{id}", put(update_week).delete(delete_week))
}
