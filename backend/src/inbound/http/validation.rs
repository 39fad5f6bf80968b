//! Shared validation helpers for inbound HTTP adapters.
//!
//! Field failures are reported as `422 Unprocessable Entity` with a
//! `details.errors` map keyed by field name, which is the shape the floor
//! terminals already render.

use std::collections::BTreeMap;

use actix_web::{HttpRequest, error::JsonPayloadError, error::QueryPayloadError, web};
use serde_json::json;
use tracing::debug;

use crate::domain::{AccountId, Error};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

/// `Validation failed` error carrying per-field messages.
pub(crate) fn field_errors(errors: &BTreeMap<String, Vec<String>>) -> Error {
    Error::unprocessable("Validation failed").with_details(json!({ "errors": errors }))
}

/// `Validation failed` error for a single field.
pub(crate) fn field_error(field: FieldName, message: impl Into<String>) -> Error {
    let mut errors = BTreeMap::new();
    errors.insert(field.as_str().to_owned(), vec![message.into()]);
    field_errors(&errors)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(field, format!("The {} field is required.", field.as_str()))
}

/// Return the trimmed value of a required text field.
pub(crate) fn require_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| missing_field_error(field))
}

/// Parse an account id taken from the request path.
pub(crate) fn parse_account_id(raw: String) -> Result<AccountId, Error> {
    AccountId::new(raw).map_err(|_| Error::not_found("User not found"))
}

/// Caller address as seen by the server, honouring `X-Forwarded-For`.
pub(crate) fn caller_ip(req: &HttpRequest) -> Option<String> {
    req.connection_info()
        .realip_remote_addr()
        .map(str::to_owned)
}

/// JSON extractor configuration that reports malformed bodies as 422.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!(error = %err, "rejected JSON payload");
        let message = match &err {
            JsonPayloadError::ContentType => "Content-Type must be application/json".to_owned(),
            JsonPayloadError::Deserialize(inner) => inner.to_string(),
            other => other.to_string(),
        };
        Error::unprocessable("Validation failed")
            .with_details(json!({ "errors": { "body": [message] } }))
            .into()
    })
}

/// Query-string extractor configuration that reports bad queries as 422.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        debug!(error = %err, "rejected query string");
        let message = match &err {
            QueryPayloadError::Deserialize(inner) => inner.to_string(),
            other => other.to_string(),
        };
        Error::unprocessable("Validation failed")
            .with_details(json!({ "errors": { "query": [message] } }))
            .into()
    })
}
