//! Driving port for posting goods receipts.
//!
//! Inbound adapters hand over the raw submission plus request context; every
//! failure comes back as an [`ErpOperationFailure`] ready to render.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{AccountId, ErpOperationFailure, ReceiptSubmissionDraft};

/// Goods-receipt posting request.
#[derive(Debug, Clone, PartialEq)]
pub struct PostGoodsReceiptRequest {
    /// Account stored in the caller's session, if any.
    pub session_user: Option<AccountId>,
    /// Caller address for the audit log.
    pub caller_ip: Option<String>,
    /// Raw submission.
    pub submission: ReceiptSubmissionDraft,
    /// Request body as received, for the audit log.
    pub request_snapshot: Value,
}

/// Request body that could not be decoded into a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedGoodsReceipt {
    /// Caller address for the audit log.
    pub caller_ip: Option<String>,
    /// Decoder error text.
    pub error: String,
    /// Request body as received.
    pub request_snapshot: Value,
}

/// Successful posting summary.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedGoodsReceipt {
    /// ERP response body.
    pub erp_response: Value,
    /// Number of lines posted.
    pub items_processed: usize,
    /// External id of the session account.
    pub logged_in_user: String,
    /// Credential tapped for the posting.
    pub posted_by_rfid: String,
    /// ERP material document number.
    pub material_doc_no: Option<String>,
    /// Fiscal year of the document.
    pub doc_year: Option<String>,
}

/// Domain use-case port for posting goods receipts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GoodsReceiptCommand: Send + Sync {
    /// Verify, post, and record one goods-receipt submission.
    async fn post_goods_receipt(
        &self,
        request: PostGoodsReceiptRequest,
    ) -> Result<PostedGoodsReceipt, ErpOperationFailure>;

    /// Audit a body that failed to decode and return the 422 to render.
    async fn reject_malformed(&self, request: MalformedGoodsReceipt) -> ErpOperationFailure;
}

/// Fixture command that accepts every submission without calling anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGoodsReceiptCommand;

#[async_trait]
impl GoodsReceiptCommand for FixtureGoodsReceiptCommand {
    async fn post_goods_receipt(
        &self,
        request: PostGoodsReceiptRequest,
    ) -> Result<PostedGoodsReceipt, ErpOperationFailure> {
        Ok(PostedGoodsReceipt {
            erp_response: serde_json::json!({}),
            items_processed: request.submission.items.len(),
            logged_in_user: request
                .session_user
                .map(|id| id.to_string())
                .unwrap_or_default(),
            posted_by_rfid: request.submission.credential,
            material_doc_no: None,
            doc_year: None,
        })
    }

    async fn reject_malformed(&self, request: MalformedGoodsReceipt) -> ErpOperationFailure {
        ErpOperationFailure::malformed_body(&request.error)
    }
}
