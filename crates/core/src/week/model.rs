//! Week model definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::input::Fields;
use crate::Result;

/// A stored week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub id: String,
    pub year: i32,
    pub numweek: i32,
    pub color: String,
    pub description: String,
    pub priority: i32,
    pub link: String,
}

/// Every field of a week. Used for both create and full-replace update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekInput {
    pub year: i32,
    pub numweek: i32,
    pub color: String,
    pub description: String,
    pub priority: i32,
    pub link: String,
}

impl WeekInput {
    /// Decode a JSON body, coercing field types; every field is required
    pub fn from_json(body: &Value) -> Result<Self> {
        let fields = Fields::new(body)?;
        Ok(Self {
            year: fields.int("year")?,
            numweek: fields.int("numweek")?,
            color: fields.string("color")?,
            description: fields.string("description")?,
            priority: fields.int("priority")?,
            link: fields.string("link")?,
        })
    }
}
