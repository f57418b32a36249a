//! Task model definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::input::Fields;
use crate::store::Document;
use crate::{Error, Result};

/// A task scheduled on one day of a week
///
/// `yearweek` correlates the task with a week by value only; it is never
/// checked against the stored weeks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub yearweek: String,
    pub dayofweek: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub time_start: String,
    pub time_end: String,
    pub finished: i32,
    pub priority: i32,
    #[serde(default)]
    pub file: Option<String>,
}

/// Fields for a new task; only `file` is optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub yearweek: String,
    pub dayofweek: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub time_start: String,
    pub time_end: String,
    pub finished: i32,
    pub priority: i32,
    pub file: Option<String>,
}

impl NewTask {
    /// Decode a JSON body, coercing field types
    pub fn from_json(body: &Value) -> Result<Self> {
        let fields = Fields::new(body)?;
        Ok(Self {
            yearweek: fields.string("yearweek")?,
            dayofweek: fields.string("dayofweek")?,
            name: fields.string("name")?,
            description: fields.string("description")?,
            color: fields.string("color")?,
            time_start: fields.string("time_start")?,
            time_end: fields.string("time_end")?,
            finished: fields.int("finished")?,
            priority: fields.int("priority")?,
            file: fields.opt_string("file")?,
        })
    }
}

/// Partial update of a task. `None` leaves a field unchanged.
///
/// `file` is doubly optional: `Some(None)` clears the attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub yearweek: Option<String>,
    pub dayofweek: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    pub finished: Option<i32>,
    pub priority: Option<i32>,
    pub file: Option<Option<String>>,
}

impl TaskPatch {
    pub fn from_json(body: &Value) -> Result<Self> {
        let fields = Fields::new(body)?;
        Ok(Self {
            yearweek: fields.opt_string("yearweek")?,
            dayofweek: fields.opt_string("dayofweek")?,
            name: fields.opt_string("name")?,
            description: fields.opt_string("description")?,
            color: fields.opt_string("color")?,
            time_start: fields.opt_string("time_start")?,
            time_end: fields.opt_string("time_end")?,
            finished: fields.opt_int("finished")?,
            priority: fields.opt_int("priority")?,
            file: fields.nullable_string("file")?,
        })
    }

    /// Attach or detach a stored file
    pub fn file(file: Option<String>) -> Self {
        Self {
            file: Some(file),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// The supplied fields as a document suitable for a store-level merge
    pub fn to_document(&self) -> Document {
        let mut doc = Map::new();
        let strings = [
            ("yearweek", &self.yearweek),
            ("dayofweek", &self.dayofweek),
            ("name", &self.name),
            ("description", &self.description),
            ("color", &self.color),
            ("time_start", &self.time_start),
            ("time_end", &self.time_end),
        ];
        for (key, value) in strings {
            if let Some(v) = value {
                doc.insert(key.to_string(), Value::String(v.clone()));
            }
        }
        for (key, value) in [("finished", self.finished), ("priority", self.priority)] {
            if let Some(v) = value {
                doc.insert(key.to_string(), Value::from(v));
            }
        }
        if let Some(file) = &self.file {
            doc.insert(
                "file".to_string(),
                file.clone().map(Value::String).unwrap_or(Value::Null),
            );
        }
        doc
    }
}

/// A partial update whose target is named inside the payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkTaskUpdate {
    pub id: String,
    pub patch: TaskPatch,
}

impl BulkTaskUpdate {
    /// Decode a body carrying `id` (or `_id`) next to the patch fields
    pub fn from_json(body: &Value) -> Result<Self> {
        let fields = Fields::new(body)?;
        let id = match fields.opt_string("id")? {
            Some(id) => id,
            None => fields.opt_string("_id")?.ok_or_else(|| {
                Error::Validation("Missing required field: id".to_string())
            })?,
        };
        Ok(Self {
            id,
            patch: TaskPatch::from_json(body)?,
        })
    }
}
