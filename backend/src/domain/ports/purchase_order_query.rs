//! Driving port for purchase order lookups.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{AccountId, ErpOperationFailure, PurchaseOrderNumber};

/// Purchase order lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOrderRequest {
    /// Account stored in the caller's session.
    pub session_user: Option<AccountId>,
    /// Caller address for the audit log.
    pub caller_ip: Option<String>,
    /// Validated purchase order number.
    pub po_no: PurchaseOrderNumber,
}

/// Purchase order as returned by the ERP.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseOrderResponse {
    /// ERP body, passed through.
    pub data: Value,
}

/// Domain use-case port for purchase order lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PurchaseOrderQuery: Send + Sync {
    /// Fetch one purchase order from the ERP.
    async fn fetch_purchase_order(
        &self,
        request: PurchaseOrderRequest,
    ) -> Result<PurchaseOrderResponse, ErpOperationFailure>;
}

/// Fixture query answering with an empty line list.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePurchaseOrderQuery;

#[async_trait]
impl PurchaseOrderQuery for FixturePurchaseOrderQuery {
    async fn fetch_purchase_order(
        &self,
        _request: PurchaseOrderRequest,
    ) -> Result<PurchaseOrderResponse, ErpOperationFailure> {
        Ok(PurchaseOrderResponse {
            data: serde_json::json!({ "value": [] }),
        })
    }
}
