//! Driven port for the external ERP.
//!
//! The gateway owns transport only: it returns whatever status and body the
//! ERP produced and leaves classification to the domain.

use async_trait::async_trait;

use crate::domain::{ErpBatchPayload, ErpReply};

use super::define_port_error;

define_port_error! {
    /// Faults raised before any ERP reply was received.
    pub enum ErpGatewayError {
        /// The ERP did not answer within the configured timeout.
        Timeout { message: String } => "ERP request timed out: {message}",
        /// The request could not be sent or the reply could not be read.
        Transport { message: String } => "ERP transport failed: {message}",
    }
}

/// Port for calling the ERP.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ErpGateway: Send + Sync {
    /// URL used for goods-receipt posts, recorded in the ledger and audit log.
    fn goods_receipt_endpoint(&self) -> String;

    /// URL used to fetch one purchase order.
    fn purchase_order_endpoint(&self, po_no: &str) -> String;

    /// Post a goods-receipt batch.
    async fn post_goods_receipt(
        &self,
        payload: &ErpBatchPayload,
    ) -> Result<ErpReply, ErpGatewayError>;

    /// Fetch purchase order details.
    async fn fetch_purchase_order(&self, po_no: &str) -> Result<ErpReply, ErpGatewayError>;
}

/// Fixture gateway answering every call with an empty success.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureErpGateway;

#[async_trait]
impl ErpGateway for FixtureErpGateway {
    fn goods_receipt_endpoint(&self) -> String {
        "fixture://erp/goods-receipts".to_owned()
    }

    fn purchase_order_endpoint(&self, po_no: &str) -> String {
        format!("fixture://erp/purchase-orders/{po_no}")
    }

    async fn post_goods_receipt(
        &self,
        _payload: &ErpBatchPayload,
    ) -> Result<ErpReply, ErpGatewayError> {
        Ok(ErpReply {
            status: 200,
            body: Some(serde_json::json!({})),
            raw_body: "{}".to_owned(),
        })
    }

    async fn fetch_purchase_order(&self, _po_no: &str) -> Result<ErpReply, ErpGatewayError> {
        Ok(ErpReply {
            status: 200,
            body: Some(serde_json::json!({ "value": [] })),
            raw_body: r#"{"value":[]}"#.to_owned(),
        })
    }
}
