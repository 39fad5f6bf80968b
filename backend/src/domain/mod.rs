//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed goods-receipt entities and the services
//! that post, audit, and query them. Nothing here depends on actix, diesel,
//! or reqwest; adapters reach the domain only through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Account (alias to `account::Account`): operator account and credential.
//! - ReceiptSubmission (alias to `receipt_submission::ReceiptSubmission`):
//!   validated goods-receipt batch.
//! - ErpVerdict (alias to `erp_response::ErpVerdict`): interpreted ERP reply.
//! - GoodsReceiptService: end-to-end posting workflow.

pub mod account;
pub mod account_admin;
mod account_admin_service;
pub mod activity;
mod activity_auditor;
pub mod auth;
mod authentication_service;
pub mod erp_failure;
pub mod erp_request;
pub mod erp_response;
pub mod error;
mod goods_receipt_service;
pub mod identity;
pub mod ports;
pub mod purchase_order;
mod purchase_order_service;
pub mod receipt_ledger;
mod receipt_history_service;
pub mod receipt_submission;
pub mod trace_id;

pub use self::account::{
    ACCOUNT_ID_PREFIX, ADMIN_DEPARTMENT, Account, AccountId, AccountStatus,
    AccountValidationError, Credential, compose_full_name,
};
pub use self::account_admin::{
    AccountFormError, AccountPatch, MAX_EMAIL_LEN, MAX_LABEL_LEN, MAX_NAME_LEN,
    MIN_PASSWORD_LEN, NewAccount, NewAccountForm, validate_password,
};
pub use self::account_admin_service::{ACCESS_DENIED_MESSAGE, AccountAdminService};
pub use self::activity::{
    ActivityAction, ActivityRecord, ActivityType, ActorSnapshot, BusinessKeys,
    UnknownActivityType, action_for_activity,
};
pub use self::activity_auditor::{ActivityAuditor, ActivityEntry};
pub use self::auth::{LoginCredentials, LoginValidationError, tap_login};
pub use self::authentication_service::AuthenticationService;
pub use self::erp_failure::{ErpOperationFailure, UNHANDLED_FAILURE_MESSAGE};
pub use self::erp_request::{
    ERP_DATE_FORMAT, ErpBatchLine, ErpBatchPayload, LINE_NO_WIDTH, build_erp_line,
    build_erp_payload, erp_date, pad_line_no,
};
pub use self::erp_response::{
    BUSINESS_FAILURE_STATUS, ErpErrorType, ErpReply, ErpVerdict, TransportFault,
    extract_error_message, interpret_erp_reply, specialise_server_error, transport_failure,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::goods_receipt_service::{GoodsReceiptService, POSTED_MESSAGE};
pub use self::identity::{IdentityError, IdentityVerifier, VerificationError, resolve_principal};
pub use self::purchase_order::{MAX_PO_NO_LEN, PurchaseOrderNumber, PurchaseOrderNumberError};
pub use self::purchase_order_service::{
    PURCHASE_ORDER_ERROR_MESSAGE, PURCHASE_ORDER_FAILED_MESSAGE, PURCHASE_ORDER_MESSAGE,
    PurchaseOrderService,
};
pub use self::receipt_history_service::{ReceiptHistoryService, dropdown_values};
pub use self::receipt_ledger::{
    PENDING_MESSAGE, PendingReceiptLine, PostedReceipt, PostingProvenance, ReceiptBatch,
    ReceiptFinalization, ReceiptLineStatus, ReceiptOutcome,
};
pub use self::receipt_submission::{
    DISPLAY_DATE_FORMAT, MAX_BATCH_NO_LEN, MAX_DELIVERY_NOTE_LEN, MAX_LINE_NO_LEN,
    MAX_PLANT_LEN, MAX_SLOC_LEN, MIN_LINE_QUANTITY, MIN_TAP_CREDENTIAL_LEN, ReceiptLine,
    ReceiptLineDraft, ReceiptSubmission, ReceiptSubmissionDraft, SubmissionValidationError,
    parse_display_date,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use gr_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("Access denied. IT department only."))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
