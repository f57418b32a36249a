//! Request decoding with type coercion
//!
//! Untyped JSON bodies are turned into typed inputs here, before anything
//! reaches a repository. Coercion follows the document store's casting rules:
//! numeric strings become integers, numbers become strings, and booleans
//! become 0/1 when an integer is expected.

use serde_json::{Map, Value};

use crate::{Error, Result};

/// Typed view over the fields of a JSON object body
pub struct Fields<'a> {
    obj: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn new(body: &'a Value) -> Result<Self> {
        body.as_object()
            .map(|obj| Self { obj })
            .ok_or_else(|| Error::Validation("Request body must be a JSON object".to_string()))
    }

    fn present(&self, name: &str) -> Option<&'a Value> {
        self.obj.get(name).filter(|v| !v.is_null())
    }

    pub fn int(&self, name: &str) -> Result<i32> {
        self.opt_int(name)?.ok_or_else(|| missing(name))
    }

    pub fn opt_int(&self, name: &str) -> Result<Option<i32>> {
        self.present(name).map(|v| coerce_int(name, v)).transpose()
    }

    pub fn string(&self, name: &str) -> Result<String> {
        self.opt_string(name)?.ok_or_else(|| missing(name))
    }

    pub fn opt_string(&self, name: &str) -> Result<Option<String>> {
        self.present(name).map(|v| coerce_string(name, v)).transpose()
    }

    /// Absent yields `None`, explicit `null` yields `Some(None)`
    pub fn nullable_string(&self, name: &str) -> Result<Option<Option<String>>> {
        match self.obj.get(name) {
            None => Ok(None),
            Some(Value::Null) => Ok(Some(None)),
            Some(v) => coerce_string(name, v).map(|s| Some(Some(s))),
        }
    }
}

fn missing(name: &str) -> Error {
    Error::Validation(format!("Missing required field: {}", name))
}

fn invalid(name: &str, expected: &str, value: &Value) -> Error {
    Error::Validation(format!(
        "Field {} expected {}, got {}",
        name, expected, value
    ))
}

fn coerce_int(name: &str, value: &Value) -> Result<i32> {
    let wide = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.is_finite() => f as i64,
                _ => return Err(invalid(name, "an integer", value)),
            },
        },
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(name, "an integer", value))?,
        Value::Bool(b) => i64::from(*b),
        _ => return Err(invalid(name, "an integer", value)),
    };
    i32::try_from(wide).map_err(|_| invalid(name, "a 32-bit integer", value))
}

fn coerce_string(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        // Integral floats render without a fraction, as `1.0` -> "1"
        Value::Number(n) => Ok(match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        }),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(invalid(name, "a string", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_coercion() {
        let body = json!({"a": 7, "b": "2024", "c": " 3 ", "d": true, "e": 4.0});
        let fields = Fields::new(&body).unwrap();
        assert_eq!(fields.int("a").unwrap(), 7);
        assert_eq!(fields.int("b").unwrap(), 2024);
        assert_eq!(fields.int("c").unwrap(), 3);
        assert_eq!(fields.int("d").unwrap(), 1);
        assert_eq!(fields.int("e").unwrap(), 4);
    }

    #[test]
    fn test_int_rejects_garbage() {
        let body = json!({"a": "soon", "b": 1.5, "c": [1], "d": 99999999999i64});
        let fields = Fields::new(&body).unwrap();
        for name in ["a", "b", "c", "d"] {
            assert!(matches!(fields.int(name), Err(Error::Validation(_))), "{}", name);
        }
    }

    #[test]
    fn test_string_coercion() {
        let body = json!({"a": "x", "b": 12, "c": false, "d": {"k": 1}, "e": 1.0, "f": 2.5});
        let fields = Fields::new(&body).unwrap();
        assert_eq!(fields.string("a").unwrap(), "x");
        assert_eq!(fields.string("b").unwrap(), "12");
        assert_eq!(fields.string("e").unwrap(), "1");
        assert_eq!(fields.string("f").unwrap(), "2.5");
        assert_eq!(fields.string("c").unwrap(), "false");
        assert!(matches!(fields.string("d"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_missing_and_null_required_fields() {
        let body = json!({"a": null});
        let fields = Fields::new(&body).unwrap();
        for name in ["a", "b"] {
            match fields.string(name) {
                Err(Error::Validation(msg)) => assert!(msg.contains(name)),
                other => panic!("Expected Validation error, got: {:?}", other),
            }
        }
        assert_eq!(fields.opt_int("a").unwrap(), None);
    }

    #[test]
    fn test_nullable_string() {
        let body = json!({"file": null, "other": "x.pdf"});
        let fields = Fields::new(&body).unwrap();
        assert_eq!(fields.nullable_string("file").unwrap(), Some(None));
        assert_eq!(
            fields.nullable_string("other").unwrap(),
            Some(Some("x.pdf".to_string()))
        );
        assert_eq!(fields.nullable_string("absent").unwrap(), None);
    }

    #[test]
    fn test_body_must_be_object() {
        assert!(matches!(Fields::new(&json!([1])), Err(Error::Validation(_))));
    }
}
