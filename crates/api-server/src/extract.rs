//! Request body extraction for the REST routes
//!
//! Accepts JSON and `application/x-www-form-urlencoded` bodies and hands
//! both to the same coercion stage as an untyped JSON object. Decoding
//! failures come back as validation errors in the usual error body.

use std::collections::HashMap;

use axum::{
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde_json::{Map, Value};

use planner_core::Error;

use crate::error::{api_error, ApiError};

/// An untyped request body, decoded from JSON or a urlencoded form
#[derive(Debug)]
pub struct Body(pub Value);

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

impl<S> FromRequest<S> for Body
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| api_error(Error::Validation(e.body_text())))?;
            let obj: Map<String, Value> = fields
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            return Ok(Self(Value::Object(obj)));
        }

        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| api_error(Error::Validation(e.body_text())))?;
        Ok(Self(value))
    }
}
