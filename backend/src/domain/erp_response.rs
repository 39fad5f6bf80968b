//! Classification of ERP responses into transport failures, embedded business
//! failures, and genuine successes.
//!
//! The ERP signals failure in several places and spells the same field in
//! several ways, so every lookup walks a fixed list of candidate keys. The
//! checks run in a strict order and the first match wins:
//!
//! 1. non-2xx status: [`ErpVerdict::TransportFailure`];
//! 2. `type`/`TYPE` equal to `E`: [`ErpVerdict::BusinessFailure`];
//! 3. `status`/`STATUS` equal to `ERROR`: [`ErpVerdict::BusinessFailure`];
//! 4. anything else: [`ErpVerdict::Succeeded`].

use std::fmt;

use chrono::NaiveDate;
use serde_json::{Value, json};

use super::erp_request::ERP_DATE_FORMAT;

/// HTTP status used for embedded business failures.
pub const BUSINESS_FAILURE_STATUS: u16 = 422;

const MESSAGE_KEYS: [&str; 2] = ["message", "MESSAGE"];
const RETURN_KEYS: [&str; 2] = ["RETURN", "return"];
const TYPE_KEYS: [&str; 2] = ["type", "TYPE"];
const STATUS_KEYS: [&str; 2] = ["status", "STATUS"];
const DOC_NO_KEYS: [&str; 2] = ["mat_doc", "material_doc_no"];
const DOC_YEAR_KEYS: [&str; 2] = ["doc_year", "year"];

/// Raw reply received from the ERP.
#[derive(Debug, Clone, PartialEq)]
pub struct ErpReply {
    /// HTTP status code.
    pub status: u16,
    /// Decoded JSON body, if the body was JSON.
    pub body: Option<Value>,
    /// Body text as received.
    pub raw_body: String,
}

impl ErpReply {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Snapshot suitable for persisting: the JSON body, or the raw text.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        self.body
            .clone()
            .unwrap_or_else(|| Value::String(self.raw_body.clone()))
    }
}

/// Machine-readable classification reported to callers as `error_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErpErrorType {
    /// ERP answered 400.
    InvalidRequest,
    /// ERP answered 401.
    AuthenticationError,
    /// ERP answered 403.
    AuthorizationError,
    /// ERP answered 404.
    NotFound,
    /// ERP answered 500.
    SapServerError,
    /// ERP answered 503 or did not answer in time.
    ServiceUnavailable,
    /// Any other status, or an unclassified fault.
    UnknownError,
    /// ERP answered 2xx but rejected the document.
    SapProcessingError,
}

impl ErpErrorType {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::AuthenticationError => "AUTHENTICATION_ERROR",
            Self::AuthorizationError => "AUTHORIZATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::SapServerError => "SAP_SERVER_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::SapProcessingError => "SAP_PROCESSING_ERROR",
        }
    }

    /// Classify a non-2xx ERP status.
    #[must_use]
    pub const fn from_transport_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 => Self::AuthenticationError,
            403 => Self::AuthorizationError,
            404 => Self::NotFound,
            500 => Self::SapServerError,
            503 => Self::ServiceUnavailable,
            _ => Self::UnknownError,
        }
    }
}

impl fmt::Display for ErpErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interpreted outcome of one ERP call.
#[derive(Debug, Clone, PartialEq)]
pub enum ErpVerdict {
    /// HTTP-level failure; the ERP status is passed through.
    TransportFailure {
        /// ERP status code.
        status: u16,
        /// Classification derived from the status.
        error_type: ErpErrorType,
        /// User-facing message.
        message: String,
        /// Message as extracted before any rewording.
        original_message: String,
        /// Response snapshot.
        response: Value,
    },
    /// 2xx response whose body reports a rejection.
    BusinessFailure {
        /// User-facing message.
        message: String,
        /// Response snapshot.
        response: Value,
    },
    /// The ERP accepted the document.
    Succeeded {
        /// ERP-assigned material document number.
        material_doc_no: Option<String>,
        /// Fiscal year of the material document.
        doc_year: Option<String>,
        /// Effective posting date.
        posting_date: NaiveDate,
        /// Response snapshot.
        response: Value,
    },
}

impl ErpVerdict {
    /// Status code the caller should see.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::TransportFailure { status, .. } => *status,
            Self::BusinessFailure { .. } => BUSINESS_FAILURE_STATUS,
            Self::Succeeded { .. } => 200,
        }
    }

    /// Classification, absent for successes.
    #[must_use]
    pub fn error_type(&self) -> Option<ErpErrorType> {
        match self {
            Self::TransportFailure { error_type, .. } => Some(*error_type),
            Self::BusinessFailure { .. } => Some(ErpErrorType::SapProcessingError),
            Self::Succeeded { .. } => None,
        }
    }

    /// Whether the ERP accepted the document.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Response snapshot carried by every variant.
    #[must_use]
    pub fn response(&self) -> &Value {
        match self {
            Self::TransportFailure { response, .. }
            | Self::BusinessFailure { response, .. }
            | Self::Succeeded { response, .. } => response,
        }
    }

    /// Caller-facing details for failures.
    #[must_use]
    pub fn error_details(&self) -> Option<Value> {
        match self {
            Self::TransportFailure {
                status,
                original_message,
                response,
                ..
            } => Some(json!({
                "erp_status": status,
                "original_message": original_message,
                "response": response,
            })),
            Self::BusinessFailure { response, .. } => Some(json!({
                "erp_status": BUSINESS_FAILURE_STATUS,
                "response": response,
            })),
            Self::Succeeded { .. } => None,
        }
    }
}

/// Interpret an ERP reply to a goods-receipt post.
///
/// `submitted_post_date` is used when the ERP does not echo a posting date.
#[must_use]
pub fn interpret_erp_reply(reply: &ErpReply, submitted_post_date: NaiveDate) -> ErpVerdict {
    if !reply.is_success() {
        return transport_failure(reply);
    }

    let body = reply.body.as_ref();
    if field_equals_ignore_case(body, &TYPE_KEYS, "E")
        || field_equals_ignore_case(body, &STATUS_KEYS, "ERROR")
    {
        let message = embedded_message(body)
            .unwrap_or_else(|| "ERP rejected the goods receipt".to_owned());
        return ErpVerdict::BusinessFailure {
            message,
            response: reply.snapshot(),
        };
    }

    ErpVerdict::Succeeded {
        material_doc_no: first_scalar(body, &DOC_NO_KEYS),
        doc_year: first_scalar(body, &DOC_YEAR_KEYS),
        posting_date: first_scalar(body, &["posting_date"])
            .and_then(|raw| NaiveDate::parse_from_str(&raw, ERP_DATE_FORMAT).ok())
            .unwrap_or(submitted_post_date),
        response: reply.snapshot(),
    }
}

/// Classified non-2xx ERP reply.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportFault {
    /// ERP status code.
    pub status: u16,
    /// Classification derived from the status.
    pub error_type: ErpErrorType,
    /// User-facing message.
    pub message: String,
    /// Message as extracted before any rewording.
    pub original_message: String,
    /// Response snapshot.
    pub response: Value,
}

impl TransportFault {
    /// Classify a reply by status and extract its message.
    ///
    /// # Examples
    /// ```
    /// use gr_backend::domain::{ErpErrorType, ErpReply, TransportFault};
    ///
    /// let fault = TransportFault::classify(&ErpReply {
    ///     status: 404,
    ///     body: None,
    ///     raw_body: String::new(),
    /// });
    /// assert_eq!(fault.error_type, ErpErrorType::NotFound);
    /// assert_eq!(fault.message, "ERP error (HTTP 404)");
    /// ```
    #[must_use]
    pub fn classify(reply: &ErpReply) -> Self {
        let original_message = extract_error_message(reply.body.as_ref(), reply.status);
        let message = if reply.status == 500 {
            specialise_server_error(&original_message)
        } else {
            original_message.clone()
        };
        Self {
            status: reply.status,
            error_type: ErpErrorType::from_transport_status(reply.status),
            message,
            original_message,
            response: reply.snapshot(),
        }
    }

    /// Caller-facing details.
    #[must_use]
    pub fn error_details(&self) -> Value {
        json!({
            "erp_status": self.status,
            "original_message": self.original_message,
            "response": self.response,
        })
    }
}

impl From<TransportFault> for ErpVerdict {
    fn from(fault: TransportFault) -> Self {
        Self::TransportFailure {
            status: fault.status,
            error_type: fault.error_type,
            message: fault.message,
            original_message: fault.original_message,
            response: fault.response,
        }
    }
}

/// Build the transport-failure verdict for a non-2xx reply.
#[must_use]
pub fn transport_failure(reply: &ErpReply) -> ErpVerdict {
    TransportFault::classify(reply).into()
}

/// Best-effort message extraction from an ERP error body.
///
/// Tries, in order: the OData `error.message.value`, a string
/// `error.message`, flat `message`/`MESSAGE`, and the joined messages of a
/// `RETURN` list. Falls back to `ERP error (HTTP <status>)`.
#[must_use]
pub fn extract_error_message(body: Option<&Value>, status: u16) -> String {
    let odata = body.and_then(|value| {
        value
            .pointer("/error/message/value")
            .or_else(|| value.pointer("/error/message"))
            .and_then(Value::as_str)
            .map(str::to_owned)
    });

    odata
        .or_else(|| embedded_message(body))
        .unwrap_or_else(|| format!("ERP error (HTTP {status})"))
}

/// Reword known ERP server failures into user-facing phrasing.
#[must_use]
pub fn specialise_server_error(message: &str) -> String {
    let lowered = message.to_lowercase();
    let phrase = if lowered.contains("posting period") {
        "Posting period is closed. Please contact finance to open the posting period."
    } else if lowered.contains("authorization") {
        "Insufficient ERP authorization to post this goods receipt. Please contact the ERP administrator."
    } else if lowered.contains("plant") && lowered.contains("material") {
        "Material is not maintained for the selected plant. Please verify the material master data."
    } else if lowered.contains("database") {
        "ERP database error. Please try again later."
    } else {
        "ERP server error. Please try again later or contact support."
    };
    phrase.to_owned()
}

fn embedded_message(body: Option<&Value>) -> Option<String> {
    first_text(body, &MESSAGE_KEYS).or_else(|| return_messages(body))
}

fn return_messages(body: Option<&Value>) -> Option<String> {
    let entries = RETURN_KEYS
        .iter()
        .find_map(|key| body?.get(*key)?.as_array())?;
    let messages: Vec<String> = entries
        .iter()
        .filter_map(|entry| first_text(Some(entry), &MESSAGE_KEYS))
        .collect();
    (!messages.is_empty()).then(|| messages.join("; "))
}

fn first_text(body: Option<&Value>, keys: &[&str]) -> Option<String> {
    let object = body?.as_object()?;
    keys.iter().find_map(|key| {
        object
            .get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned)
    })
}

fn first_scalar(body: Option<&Value>, keys: &[&str]) -> Option<String> {
    let object = body?.as_object()?;
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn field_equals_ignore_case(body: Option<&Value>, keys: &[&str], expected: &str) -> bool {
    let Some(object) = body.and_then(Value::as_object) else {
        return false;
    };
    keys.iter().any(|key| {
        object
            .get(*key)
            .and_then(Value::as_str)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case(expected))
    })
}

#[cfg(test)]
#[path = "erp_response_tests.rs"]
mod tests;
