//! Purchase order lookup against the ERP.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use super::activity_auditor::{ActivityAuditor, ActivityEntry};
use super::identity::{VerificationError, resolve_principal};
use super::ports::{
    AccountRepository, AccountRepositoryError, ActivityLogRepository, ErpGateway,
    ErpGatewayError, PurchaseOrderQuery, PurchaseOrderRequest, PurchaseOrderResponse,
};
use super::{ActivityType, ErpErrorType, ErpOperationFailure, TransportFault};

/// Message returned with a purchase order.
pub const PURCHASE_ORDER_MESSAGE: &str = "Purchase order retrieved successfully";
/// Message returned when the ERP answers with a non-2xx status.
pub const PURCHASE_ORDER_FAILED_MESSAGE: &str = "Failed to fetch PO data";
/// Message returned when the ERP could not be reached.
pub const PURCHASE_ORDER_ERROR_MESSAGE: &str = "Error fetching PO data";

fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}

fn line_count(body: &Value) -> usize {
    body.get("value").and_then(Value::as_array).map_or(0, Vec::len)
}

fn session_failure(error: VerificationError) -> ErpOperationFailure {
    match error {
        VerificationError::Rejected(rejection) => rejection.into(),
        VerificationError::Repository(AccountRepositoryError::Connection { .. }) => {
            ErpOperationFailure::new(503, "Service temporarily unavailable. Please try again later.")
                .with_error_type(ErpErrorType::ServiceUnavailable)
        }
        VerificationError::Repository(_) => {
            ErpOperationFailure::unhandled(PURCHASE_ORDER_ERROR_MESSAGE)
        }
    }
}

/// Purchase order service implementing [`PurchaseOrderQuery`].
pub struct PurchaseOrderService<A: ?Sized, G: ?Sized, W: ?Sized> {
    accounts: Arc<A>,
    gateway: Arc<G>,
    auditor: ActivityAuditor<W>,
}

impl<A, G, W> PurchaseOrderService<A, G, W>
where
    A: AccountRepository + ?Sized,
    G: ErpGateway + ?Sized,
    W: ActivityLogRepository + ?Sized,
{
    /// Wire the service to its driven ports.
    pub fn new(
        accounts: Arc<A>,
        gateway: Arc<G>,
        activity_log: Arc<W>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            gateway,
            auditor: ActivityAuditor::new(activity_log, clock),
        }
    }
}

#[async_trait]
impl<A, G, W> PurchaseOrderQuery for PurchaseOrderService<A, G, W>
where
    A: AccountRepository + ?Sized,
    G: ErpGateway + ?Sized,
    W: ActivityLogRepository + ?Sized,
{
    async fn fetch_purchase_order(
        &self,
        request: PurchaseOrderRequest,
    ) -> Result<PurchaseOrderResponse, ErpOperationFailure> {
        let po_no = request.po_no.as_ref().to_owned();
        let entry = ActivityEntry::new(ActivityType::GetPo, json!({ "po_no": po_no }))
            .from_ip(request.caller_ip);

        let session =
            match resolve_principal(self.accounts.as_ref(), request.session_user.as_ref()).await {
                Ok(account) => account,
                Err(err) => {
                    let failure = session_failure(err);
                    self.auditor
                        .record(entry.failed(failure.status, failure.message.clone(), None))
                        .await;
                    return Err(failure);
                }
            };

        let endpoint = self.gateway.purchase_order_endpoint(&po_no);
        info!(
            po_no = %po_no,
            requested_by = %session.email,
            url = %endpoint,
            "purchase order lookup started"
        );
        let entry = entry.by(Some(&session)).at_endpoint(endpoint);

        let started = Instant::now();
        let reply = self.gateway.fetch_purchase_order(&po_no).await;
        let elapsed = elapsed_ms(started);
        let entry = entry.took(elapsed);

        let reply = match reply {
            Ok(reply) => reply,
            Err(fault) => {
                error!(po_no = %po_no, error = %fault, "purchase order lookup failed");
                let failure = match &fault {
                    ErpGatewayError::Timeout { message } => {
                        ErpOperationFailure::timeout(message.clone())
                    }
                    ErpGatewayError::Transport { .. } => {
                        ErpOperationFailure::unhandled(PURCHASE_ORDER_ERROR_MESSAGE)
                    }
                };
                self.auditor
                    .record(entry.failed(failure.status, fault.to_string(), None))
                    .await;
                return Err(failure);
            }
        };

        info!(status = reply.status, elapsed_ms = elapsed, "ERP purchase order response received");

        if !reply.is_success() {
            warn!(status = reply.status, body = %reply.raw_body, "ERP purchase order request failed");
            let fault = TransportFault::classify(&reply);
            let failure = ErpOperationFailure::new(fault.status, PURCHASE_ORDER_FAILED_MESSAGE)
                .with_error_type(fault.error_type)
                .with_details(fault.error_details());
            self.auditor
                .record(entry.failed(fault.status, fault.original_message, None))
                .await;
            return Err(failure);
        }

        let data = reply.snapshot();
        let lines = line_count(&data);
        if lines == 0 {
            warn!(po_no = %po_no, response = %data, "ERP returned no purchase order lines");
        }
        self.auditor
            .record(entry.succeeded(reply.status, Some(data.clone())))
            .await;
        info!(po_no = %po_no, items_returned = lines, "purchase order lookup succeeded");
        Ok(PurchaseOrderResponse { data })
    }
}
