//! Serverless-style handlers backed by the GoREST users API
//!
//! A handler receives the decoded event and context and returns the JSON it
//! would hand back to the platform. The context is accepted but unused.

use async_trait::async_trait;
use gorest::users::UsersApi;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("event is missing required key '{0}'")]
    MissingKey(String),

    #[error("event field '{key}' must be an integer, got {value}")]
    InvalidField { key: String, value: Value },

    #[error("event must be a JSON object, got {0}")]
    InvalidEvent(Value),

    #[error(transparent)]
    Client(#[from] gorest::Error),
}

/// A named entry point invoked with `(event, context)`
#[async_trait]
pub trait Handler: Send + Sync {
    async fn invoke(
        &self,
        event: Option<Value>,
        context: Option<Value>,
    ) -> Result<Value, HandlerError>;
}

/// Lists users, optionally paged by `page` and `limit`
pub struct ListUsersHandler {
    api: Arc<dyn UsersApi>,
}

impl ListUsersHandler {
    pub fn new(api: Arc<dyn UsersApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Handler for ListUsersHandler {
    async fn invoke(
        &self,
        event: Option<Value>,
        _context: Option<Value>,
    ) -> Result<Value, HandlerError> {
        // An empty event means "no paging": the API picks its own defaults.
        let (page, limit) = match event.filter(is_truthy) {
            None => (None, None),
            Some(event) => {
                let fields = as_object(&event)?;
                (
                    paging_field(fields, "page", DEFAULT_PAGE)?,
                    paging_field(fields, "limit", DEFAULT_LIMIT)?,
                )
            }
        };

        Ok(self.api.fetch_all(page, limit).await?)
    }
}

/// Reads a single user by the event's `id`
pub struct ReadUserHandler {
    api: Arc<dyn UsersApi>,
}

impl ReadUserHandler {
    pub fn new(api: Arc<dyn UsersApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Handler for ReadUserHandler {
    async fn invoke(
        &self,
        event: Option<Value>,
        _context: Option<Value>,
    ) -> Result<Value, HandlerError> {
        let event = event.ok_or_else(|| HandlerError::MissingKey("id".to_string()))?;
        let id = as_object(&event)?
            .get("id")
            .ok_or_else(|| HandlerError::MissingKey("id".to_string()))
            .and_then(|value| integer("id", value))?;

        Ok(self.api.fetch(id).await?)
    }
}

/// JSON truthiness: null, false, 0, "", [] and {} are falsy
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn as_object(event: &Value) -> Result<&Map<String, Value>, HandlerError> {
    event
        .as_object()
        .ok_or_else(|| HandlerError::InvalidEvent(event.clone()))
}

/// A missing paging key takes its default; an explicit null drops the parameter
fn paging_field(
    fields: &Map<String, Value>,
    key: &str,
    default: i64,
) -> Result<Option<i64>, HandlerError> {
    match fields.get(key) {
        None => Ok(Some(default)),
        Some(Value::Null) => Ok(None),
        Some(value) => integer(key, value).map(Some),
    }
}

fn integer(key: &str, value: &Value) -> Result<i64, HandlerError> {
    value.as_i64().ok_or_else(|| HandlerError::InvalidField {
        key: key.to_string(),
        value: value.clone(),
    })
}
