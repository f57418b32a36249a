//! File upload endpoint
//!
//! Stores the `file` field under its original name. Attaching the file to
//! a task is a separate call (`PUT /tasks/:id/file`).

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Router,
};

use planner_core::Error;

use crate::error::{api_error, ApiResult};
use crate::state::AppState;

/// POST /tasks/upload - Store a single uploaded file
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, String)> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut task_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(Error::Validation(format!("Multipart error: {}", e))))?
    {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| api_error(Error::Validation(format!("Read error: {}", e))))?;
                file = Some((name, data.to_vec()));
            }
            Some("taskId") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| api_error(Error::Validation(format!("Read error: {}", e))))?;
                task_id = Some(value).filter(|v| !v.trim().is_empty());
            }
            _ => {}
        }
    }

    let (name, data) = file.ok_or_else(|| {
        api_error(Error::Validation(
            "Missing file in multipart form".to_string(),
        ))
    })?;

    let stored = state
        .binder()
        .files()
        .save(&name, &data)
        .await
        .map_err(api_error)?;
    state.binder().acknowledge(task_id, stored);

    let dir = state.binder().files().dir().display().to_string();
    Ok((
        StatusCode::OK,
        format!("File uploaded and saved to the \"{}\" folder.", dir),
    ))
}

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/tasks/upload",
        post(upload_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
    )
}
