//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or lacks a precondition.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// Field validation failed.
    #[schema(rename = "unprocessable_entity")]
    UnprocessableEntity,
    /// A backing store is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Always `false`.
    #[schema(example = false)]
    success: bool,
    /// Stable machine-readable error code.
    #[schema(example = "unprocessable_entity")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Validation failed")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary details, such as per-field messages under `errors`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::ErpOperationFailure`].
///
/// Failure envelope for calls that reached, or tried to reach, the ERP.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErpOperationFailure)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErpFailureSchema {
    /// Always `false`.
    #[schema(example = false)]
    success: bool,
    /// Message extracted from the ERP reply.
    #[schema(example = "Plant 1000 not found")]
    message: String,
    /// Failure classification.
    #[schema(example = "SAP_PROCESSING_ERROR")]
    error_type: Option<String>,
    /// ERP status and original message where available.
    error_details: Option<serde_json::Value>,
}
