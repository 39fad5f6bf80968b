//! Caller-facing failures of ERP-backed operations.
//!
//! These are rendered as `{ success: false, message, error_type?,
//! error_details? }` with their own status code, so they are data rather
//! than domain [`Error`](super::Error) values.

use serde_json::{Value, json};

use super::{ErpErrorType, ErpVerdict, IdentityError, SubmissionValidationError};

/// Generic message for faults not attributable to the ERP's answer.
pub const UNHANDLED_FAILURE_MESSAGE: &str = "Error creating Good Receipt";

/// A failed ERP-backed operation as reported to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} (HTTP {status})")]
pub struct ErpOperationFailure {
    /// Status code returned to the caller.
    pub status: u16,
    /// User-facing message.
    pub message: String,
    /// Machine-readable classification.
    pub error_type: Option<ErpErrorType>,
    /// Extra context.
    pub details: Option<Value>,
}

impl ErpOperationFailure {
    /// Failure with no classification.
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error_type: None,
            details: None,
        }
    }

    /// Attach a classification.
    #[must_use]
    pub fn with_error_type(mut self, error_type: ErpErrorType) -> Self {
        self.error_type = Some(error_type);
        self
    }

    /// Attach details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Structural validation failure.
    #[must_use]
    pub fn validation(errors: &SubmissionValidationError) -> Self {
        Self::new(422, "Validation failed").with_details(json!({ "errors": errors.errors() }))
    }

    /// Request body that could not be decoded at all.
    #[must_use]
    pub fn malformed_body(error: &str) -> Self {
        Self::new(422, "Validation failed")
            .with_details(json!({ "errors": { "body": [error] } }))
    }

    /// Failure produced by an interpreted ERP answer; `None` for successes.
    #[must_use]
    pub fn from_verdict(verdict: &ErpVerdict, fallback_message: &str) -> Option<Self> {
        let error_type = verdict.error_type()?;
        let message = match verdict {
            ErpVerdict::TransportFailure { message, .. }
            | ErpVerdict::BusinessFailure { message, .. } => message.clone(),
            ErpVerdict::Succeeded { .. } => fallback_message.to_owned(),
        };
        let mut failure =
            Self::new(verdict.http_status(), message).with_error_type(error_type);
        failure.details = verdict.error_details();
        Some(failure)
    }

    /// ERP did not answer in time.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(503, "ERP service did not respond in time. Please try again later.")
            .with_error_type(ErpErrorType::ServiceUnavailable)
            .with_details(json!({ "erp_status": 503, "original_message": message.into() }))
    }

    /// Unclassified internal fault with a generic message.
    #[must_use]
    pub fn unhandled(message: impl Into<String>) -> Self {
        Self::new(500, message).with_error_type(ErpErrorType::UnknownError)
    }
}

impl From<IdentityError> for ErpOperationFailure {
    fn from(value: IdentityError) -> Self {
        Self::new(value.http_status(), value.to_string())
    }
}
