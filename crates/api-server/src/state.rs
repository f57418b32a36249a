//! Application state

use std::sync::Arc;

use planner_core::attachment::{AttachmentBinder, AttachmentStore};
use planner_core::notify::ConnectionRegistry;
use planner_core::store::RecordStore;
use planner_core::Planner;

use crate::config::Config;
use crate::graphql::{build_schema, PlannerSchema};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    planner: Planner,
    binder: AttachmentBinder,
    connections: ConnectionRegistry,
    schema: PlannerSchema,
    graphql_path: String,
}

impl AppState {
    /// Wire the command layer, attachments and GraphQL schema onto one store
    pub fn new(store: Arc<dyn RecordStore>, config: &Config) -> Self {
        let planner = Planner::new(store);
        let binder = AttachmentBinder::new(
            AttachmentStore::new(config.upload_dir.clone()),
            planner.clone(),
        );
        let schema = build_schema(planner.clone(), binder.clone());

        Self {
            inner: Arc::new(AppStateInner {
                planner,
                binder,
                connections: ConnectionRegistry::new(),
                schema,
                graphql_path: config.graphql_path.clone(),
            }),
        }
    }

    pub fn planner(&self) -> &Planner {
        &self.inner.planner
    }

    pub fn binder(&self) -> &AttachmentBinder {
        &self.inner.binder
    }

    pub fn connections(&self) -> &ConnectionRegistry {
        &self.inner.connections
    }

    pub fn schema(&self) -> &PlannerSchema {
        &self.inner.schema
    }

    pub fn graphql_path(&self) -> &str {
        &self.inner.graphql_path
    }
}
