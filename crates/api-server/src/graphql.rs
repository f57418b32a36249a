//! GraphQL endpoint
//!
//! Exposes the same command layer as the REST routes. Argument and field
//! names keep their snake_case spelling (`time_start`, `time_end`) so both
//! surfaces describe records identically.

use async_graphql::http::GraphiQLSource;
use async_graphql::{
    BatchRequest, BatchResponse, Context, EmptySubscription, ErrorExtensions, MaybeUndefined,
    Object, Schema, SimpleObject, ID,
};
use axum::{
    extract::State,
    response::Html,
    routing::get,
    Json, Router,
};

use planner_core::attachment::AttachmentBinder;
use planner_core::task::{NewTask, Task, TaskPatch};
use planner_core::week::{Week, WeekInput};
use planner_core::{Error, ErrorKind, Planner};

use crate::state::AppState;

pub type PlannerSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(planner: Planner, binder: AttachmentBinder) -> PlannerSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(planner)
        .data(binder)
        .finish()
}

/// Convert a core error into a field error carrying a machine-readable code
fn field_error(e: Error) -> async_graphql::Error {
    let code = match e.kind() {
        ErrorKind::Validation => "VALIDATION_ERROR",
        ErrorKind::NotFound => "NOT_FOUND",
        ErrorKind::Store => {
            tracing::warn!("Store failure: {}", e);
            "STORE_ERROR"
        }
    };
    async_graphql::Error::new(e.to_string()).extend_with(|_, ext| ext.set("code", code))
}

#[derive(SimpleObject)]
#[graphql(name = "Week")]
pub struct WeekObject {
    id: ID,
    year: i32,
    numweek: i32,
    color: String,
    description: String,
    priority: i32,
    link: String,
}

impl From<Week> for WeekObject {
    fn from(week: Week) -> Self {
        Self {
            id: ID(week.id),
            year: week.year,
            numweek: week.numweek,
            color: week.color,
            description: week.description,
            priority: week.priority,
            link: week.link,
        }
    }
}

#[derive(SimpleObject)]
#[graphql(name = "Task", rename_fields = "snake_case")]
pub struct TaskObject {
    id: ID,
    yearweek: String,
    dayofweek: String,
    name: String,
    description: String,
    color: String,
    time_start: String,
    time_end: String,
    finished: i32,
    priority: i32,
    file: Option<String>,
}

impl From<Task> for TaskObject {
    fn from(task: Task) -> Self {
        Self {
            id: ID(task.id),
            yearweek: task.yearweek,
            dayofweek: task.dayofweek,
            name: task.name,
            description: task.description,
            color: task.color,
            time_start: task.time_start,
            time_end: task.time_end,
            finished: task.finished,
            priority: task.priority,
            file: task.file,
        }
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn weeks(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<WeekObject>> {
        let weeks = ctx
            .data::<Planner>()?
            .list_weeks()
            .await
            .map_err(field_error)?;
        Ok(weeks.into_iter().map(WeekObject::from).collect())
    }

    async fn tasks(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<TaskObject>> {
        let tasks = ctx
            .data::<Planner>()?
            .list_tasks()
            .await
            .map_err(field_error)?;
        Ok(tasks.into_iter().map(TaskObject::from).collect())
    }
}

pub struct MutationRoot;

#[allow(clippy::too_many_arguments)]
#[Object(rename_args = "snake_case")]
impl MutationRoot {
    async fn create_week(
        &self,
        ctx: &Context<'_>,
        year: i32,
        numweek: i32,
        color: String,
        description: String,
        priority: i32,
        link: String,
    ) -> async_graphql::Result<WeekObject> {
        let input = WeekInput {
            year,
            numweek,
            color,
            description,
            priority,
            link,
        };
        let week = ctx
            .data::<Planner>()?
            .create_week(input)
            .await
            .map_err(field_error)?;
        Ok(week.into())
    }

    async fn update_week(
        &self,
        ctx: &Context<'_>,
        id: ID,
        year: i32,
        numweek: i32,
        color: String,
        description: String,
        priority: i32,
        link: String,
    ) -> async_graphql::Result<WeekObject> {
        let input = WeekInput {
            year,
            numweek,
            color,
            description,
            priority,
            link,
        };
        let week = ctx
            .data::<Planner>()?
            .update_week(&id, input)
            .await
            .map_err(field_error)?;
        Ok(week.into())
    }

    async fn delete_week(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<WeekObject> {
        let week = ctx
            .data::<Planner>()?
            .delete_week(&id)
            .await
            .map_err(field_error)?;
        Ok(week.into())
    }

    async fn create_task(
        &self,
        ctx: &Context<'_>,
        yearweek: String,
        dayofweek: String,
        name: String,
        description: String,
        color: String,
        time_start: String,
        time_end: String,
        finished: i32,
        priority: i32,
        file: Option<String>,
    ) -> async_graphql::Result<TaskObject> {
        let task = NewTask {
            yearweek,
            dayofweek,
            name,
            description,
            color,
            time_start,
            time_end,
            finished,
            priority,
            file,
        };
        let task = ctx
            .data::<Planner>()?
            .create_task(task)
            .await
            .map_err(field_error)?;
        Ok(task.into())
    }

    async fn update_task(
        &self,
        ctx: &Context<'_>,
        id: ID,
        yearweek: Option<String>,
        dayofweek: Option<String>,
        name: Option<String>,
        description: Option<String>,
        color: Option<String>,
        time_start: Option<String>,
        time_end: Option<String>,
        finished: Option<i32>,
        priority: Option<i32>,
        file: MaybeUndefined<String>,
    ) -> async_graphql::Result<TaskObject> {
        let file = match file {
            MaybeUndefined::Undefined => None,
            MaybeUndefined::Null => Some(None),
            MaybeUndefined::Value(file) => Some(Some(file)),
        };
        let patch = TaskPatch {
            yearweek,
            dayofweek,
            name,
            description,
            color,
            time_start,
            time_end,
            finished,
            priority,
            file,
        };
        let task = ctx
            .data::<Planner>()?
            .update_task(&id, patch)
            .await
            .map_err(field_error)?;
        Ok(task.into())
    }

    async fn delete_task(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<TaskObject> {
        let task = ctx
            .data::<Planner>()?
            .delete_task(&id)
            .await
            .map_err(field_error)?;
        Ok(task.into())
    }

    /// Attach a previously uploaded file to a task
    async fn bind_file(
        &self,
        ctx: &Context<'_>,
        id: ID,
        file: String,
    ) -> async_graphql::Result<TaskObject> {
        let task = ctx
            .data::<AttachmentBinder>()?
            .bind(&id, &file)
            .await
            .map_err(field_error)?;
        Ok(task.into())
    }
}

/// POST <graphql path> - Execute a single or batched operation
async fn graphql_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> Json<BatchResponse> {
    Json(state.schema().execute_batch(req).await)
}

/// GET <graphql path> - Interactive explorer
async fn graphiql(State(state): State<AppState>) -> Html<String> {
    Html(
        GraphiQLSource::build()
            .endpoint(state.graphql_path())
            .finish(),
    )
}

pub fn router(path: &str) -> Router<AppState> {
    Router::new().route(path, get(graphiql).post(graphql_handler))
}
