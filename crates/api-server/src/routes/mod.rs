//! Route handlers

pub mod health;
pub mod task;
pub mod upload;
pub mod week;

use axum::Router;

use crate::config::Config;
use crate::graphql;
use crate::state::AppState;

/// Every HTTP route: REST, uploads, GraphQL and health
pub fn router(config: &Config) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(week::router())
        .merge(task::router())
        .merge(upload::router(config.upload_max_bytes))
        .merge(graphql::router(&config.graphql_path))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use planner_core::store::MemoryStore;

    use crate::config::Config;
    use crate::state::AppState;

    pub fn build_state() -> (AppState, Config, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            store_uri: "memory://".to_string(),
            upload_dir: temp_dir.path().join("files"),
            ..Config::default()
        };
        let state = AppState::new(std::sync::Arc::new(MemoryStore::new()), &config);
        (state, config, temp_dir)
    }

    pub fn app(state: &AppState, config: &Config) -> Router {
        super::router(config).with_state(state.clone())
    }

    pub async fn send_json(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        match body {
            Some(body) => send_raw(app, method, uri, "application/json", body.to_string()).await,
            None => {
                let request = Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap();
                read_response(app, request).await
            }
        }
    }

    pub async fn send_raw(
        app: Router,
        method: &str,
        uri: &str,
        content_type: &str,
        body: String,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap();
        read_response(app, request).await
    }

    async fn read_response(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, payload)
    }
}
