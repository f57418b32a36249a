//! Task API endpoints
//!
//! RESTful API for task CRUD operations. Updates merge only the supplied
//! fields, matching the GraphQL `updateTask` mutation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use planner_core::input::Fields;
use planner_core::task::{BulkTaskUpdate, NewTask, Task, TaskPatch};

use crate::error::{api_error, ApiResult};
use crate::extract::Body;
use crate::state::AppState;

/// GET /tasks - List all tasks
async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.planner().list_tasks().await.map_err(api_error)?;
    Ok(Json(tasks))
}

/// POST /tasks - Create a new task
async fn create_task(
    State(state): State<AppState>,
    Body(body): Body,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = NewTask::from_json(&body).map_err(api_error)?;
    let created = state.planner().create_task(task).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /tasks/:id - Merge the supplied fields into a task
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Body(body): Body,
) -> ApiResult<Json<Task>> {
    let patch = TaskPatch::from_json(&body).map_err(api_error)?;
    let updated = state
        .planner()
        .update_task(&id, patch)
        .await
        .map_err(api_error)?;
    Ok(Json(updated))
}

/// PUT /tasks - Merge fields into the task named by `id` in the body
async fn update_tasks(
    State(state): State<AppState>,
    Body(body): Body,
) -> ApiResult<Json<Task>> {
    let update = BulkTaskUpdate::from_json(&body).map_err(api_error)?;
    let updated = state
        .planner()
        .update_tasks(update)
        .await
        .map_err(api_error)?;
    Ok(Json(updated))
}

/// DELETE /tasks/:id - Delete a task, returning it
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let deleted = state.planner().delete_task(&id).await.map_err(api_error)?;
    Ok(Json(deleted))
}

/// PUT /tasks/:id/file - Attach a previously uploaded file
async fn bind_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Body(body): Body,
) -> ApiResult<Json<Task>> {
    let file = Fields::new(&body)
        .and_then(|fields| fields.string("file"))
        .map_err(api_error)?;
    let task = state
        .binder()
        .bind(&id, &file)
        .await
        .map_err(api_error)?;
    Ok(Json(task))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/tasks",
            get(list_tasks).post(create_task).put(update_tasks),
        )
        .route("/tasks/{id}", put(update_task).delete(delete_task))
        .route("/tasks/{id}/file", put(bind_file))
}
