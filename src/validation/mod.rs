//! Request body validation.
//!
//! Bodies are read into a [`Body`], identity-shaped fields are dropped, and a
//! [`Validate`] implementation pulls typed fields out while collecting every
//! violation. Nothing reaches the repository unless all fields pass.

pub mod extract;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub use extract::ValidatedJson;

/// Fields a client might use to claim an identity. They are removed before
/// any schema check runs.
pub const IDENTITY_FIELDS: &[&str] = &["userId", "user_id", "ownerId", "owner_id"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct InvalidInput {
    pub message: String,
    pub details: Vec<FieldError>,
}

impl InvalidInput {
    pub fn new(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self { message: message.into(), details }
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            "Invalid request",
            vec![FieldError { field: field.into(), message: message.into() }],
        )
    }

    /// Names of the violated fields, in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.details.iter().map(|d| d.field.as_str()).collect()
    }
}

/// A typed input produced from a request body.
pub trait Validate: Sized {
    fn validate(body: Body) -> Result<Self, InvalidInput>;
}

/// A JSON object body being validated.
#[derive(Debug)]
pub struct Body {
    map: Map<String, Value>,
    errors: Vec<FieldError>,
}

impl Body {
    pub fn parse(bytes: &[u8]) -> Result<Self, InvalidInput> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(InvalidInput::field("body", "request body is required"));
        }
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| InvalidInput::field("body", format!("malformed JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, InvalidInput> {
        match value {
            Value::Object(mut map) => {
                for field in IDENTITY_FIELDS {
                    if map.remove(*field).is_some() {
                        tracing::debug!(field = *field, "Dropped client-supplied identity field");
                    }
                }
                Ok(Self { map, errors: Vec::new() })
            }
            _ => Err(InvalidInput::field("body", "expected a JSON object")),
        }
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError { field: field.to_string(), message: message.into() });
    }

    pub fn has(&self, field: &str) -> bool {
        self.map.contains_key(field)
    }

    /// Present, a string, and not blank.
    pub fn required_str(&mut self, field: &str) -> Option<String> {
        match self.map.remove(field) {
            None | Some(Value::Null) => {
                self.error(field, "is required");
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.error(field, "must not be empty");
                None
            }
            Some(Value::String(s)) => Some(s),
            Some(_) => {
                self.error(field, "must be a string");
                None
            }
        }
    }

    /// Absent or null is `None`; present must be a string.
    pub fn optional_str(&mut self, field: &str) -> Option<String> {
        match self.map.remove(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => {
                self.error(field, "must be a string");
                None
            }
        }
    }

    /// For patches: absent is `None`, explicit null is `Some(None)`.
    pub fn nullable_str(&mut self, field: &str) -> Option<Option<String>> {
        match self.map.remove(field) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(Value::String(s)) => Some(Some(s)),
            Some(_) => {
                self.error(field, "must be a string or null");
                None
            }
        }
    }

    /// Absent is `None`; present must be a non-blank string.
    pub fn optional_non_empty_str(&mut self, field: &str) -> Option<String> {
        if !self.has(field) {
            return None;
        }
        self.required_str(field)
    }

    pub fn optional_bool(&mut self, field: &str) -> Option<bool> {
        match self.map.remove(field) {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(b),
            Some(_) => {
                self.error(field, "must be a boolean");
                None
            }
        }
    }

    pub fn required_bool(&mut self, field: &str) -> Option<bool> {
        match self.map.remove(field) {
            None | Some(Value::Null) => {
                self.error(field, "is required");
                None
            }
            Some(Value::Bool(b)) => Some(b),
            Some(_) => {
                self.error(field, "must be a boolean");
                None
            }
        }
    }

    /// A whole number in `1..=i32::MAX`.
    pub fn required_positive_int(&mut self, field: &str) -> Option<i32> {
        match self.map.remove(field) {
            None | Some(Value::Null) => {
                self.error(field, "is required");
                None
            }
            Some(Value::Number(n)) => match n.as_i64() {
                Some(v) if v > 0 && v <= i32::MAX as i64 => Some(v as i32),
                _ => {
                    self.error(field, "must be a positive integer");
                    None
                }
            },
            Some(_) => {
                self.error(field, "must be a positive integer");
                None
            }
        }
    }

    pub fn optional_uuid(&mut self, field: &str) -> Option<Uuid> {
        match self.map.remove(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => match Uuid::parse_str(&s) {
                Ok(u) => Some(u),
                Err(_) => {
                    self.error(field, "must be a UUID");
                    None
                }
            },
            Some(_) => {
                self.error(field, "must be a UUID");
                None
            }
        }
    }

    pub fn optional_object(&mut self, field: &str) -> Option<Value> {
        match self.map.remove(field) {
            None | Some(Value::Null) => None,
            Some(v @ Value::Object(_)) => Some(v),
            Some(_) => {
                self.error(field, "must be an object");
                None
            }
        }
    }

    /// First present field among `aliases`, required and non-blank. Errors
    /// are reported under the first alias.
    pub fn required_str_alias(&mut self, aliases: &[&str]) -> Option<String> {
        let field = aliases.iter().copied().find(|f| self.has(f)).unwrap_or(aliases[0]);
        let value = self.required_str(field);
        if value.is_none() && field != aliases[0] {
            if let Some(last) = self.errors.last_mut() {
                last.field = aliases[0].to_string();
            }
        }
        value
    }

    /// Builds the input if no violation was recorded.
    pub fn finish<T>(self, build: impl FnOnce() -> T) -> Result<T, InvalidInput> {
        if self.errors.is_empty() {
            Ok(build())
        } else {
            Err(InvalidInput::new("Invalid request", self.errors))
        }
    }
}
