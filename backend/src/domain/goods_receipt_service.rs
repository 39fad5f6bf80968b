//! Goods-receipt posting service.
//!
//! One submission runs start to finish in a single call: validate, verify
//! both identities, write pending ledger rows, call the ERP, interpret the
//! reply, finalise every row, and audit the attempt. Every failure is turned
//! into an [`ErpOperationFailure`]; nothing escapes as an unhandled fault.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};

use super::activity_auditor::{ActivityAuditor, ActivityEntry};
use super::erp_failure::UNHANDLED_FAILURE_MESSAGE;
use super::identity::{IdentityVerifier, VerificationError};
use super::ports::{
    AccountRepository, AccountRepositoryError, ActivityLogRepository, ErpGateway,
    ErpGatewayError, GoodsReceiptCommand, MalformedGoodsReceipt, PostGoodsReceiptRequest,
    PostedGoodsReceipt,
    ReceiptLedgerRepository, ReceiptLedgerRepositoryError,
};
use super::{
    Account, ActivityType, ErpErrorType, ErpOperationFailure, ErpVerdict, PostingProvenance,
    ReceiptBatch, ReceiptFinalization, ReceiptOutcome, ReceiptSubmission, build_erp_payload,
    interpret_erp_reply,
};

/// Message returned with a successful posting.
pub const POSTED_MESSAGE: &str = "Good Receipt created successfully";

fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}

fn store_failure(unavailable: bool) -> ErpOperationFailure {
    if unavailable {
        ErpOperationFailure::new(503, "Service temporarily unavailable. Please try again later.")
            .with_error_type(ErpErrorType::ServiceUnavailable)
    } else {
        ErpOperationFailure::unhandled(UNHANDLED_FAILURE_MESSAGE)
    }
}

fn map_verification_error(error: &VerificationError) -> ErpOperationFailure {
    match error {
        VerificationError::Rejected(rejection) => (*rejection).into(),
        VerificationError::Repository(repo) => {
            store_failure(matches!(repo, AccountRepositoryError::Connection { .. }))
        }
    }
}

fn map_ledger_error(error: &ReceiptLedgerRepositoryError) -> ErpOperationFailure {
    store_failure(matches!(
        error,
        ReceiptLedgerRepositoryError::Connection { .. }
    ))
}

/// Result of the ERP round trip, before it is applied to the ledger.
struct Settlement {
    result: Result<PostedGoodsReceipt, ErpOperationFailure>,
    finalization: ReceiptFinalization,
    audit_message: Option<String>,
}

/// Goods-receipt service implementing [`GoodsReceiptCommand`].
pub struct GoodsReceiptService<A: ?Sized, L: ?Sized, G: ?Sized, W: ?Sized> {
    verifier: IdentityVerifier<A>,
    ledger: Arc<L>,
    gateway: Arc<G>,
    auditor: ActivityAuditor<W>,
    clock: Arc<dyn Clock>,
}

impl<A, L, G, W> GoodsReceiptService<A, L, G, W>
where
    A: AccountRepository + ?Sized,
    L: ReceiptLedgerRepository + ?Sized,
    G: ErpGateway + ?Sized,
    W: ActivityLogRepository + ?Sized,
{
    /// Wire the service to its driven ports.
    pub fn new(
        accounts: Arc<A>,
        ledger: Arc<L>,
        gateway: Arc<G>,
        activity_log: Arc<W>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier: IdentityVerifier::new(accounts),
            ledger,
            gateway,
            auditor: ActivityAuditor::new(activity_log, Arc::clone(&clock)),
            clock,
        }
    }

    async fn reject(
        &self,
        entry: ActivityEntry,
        actor: Option<&Account>,
        failure: ErpOperationFailure,
    ) -> ErpOperationFailure {
        self.auditor
            .record(
                entry
                    .by(actor)
                    .failed(failure.status, failure.message.clone(), failure.details.clone()),
            )
            .await;
        failure
    }

    fn settle(
        &self,
        verdict: ErpVerdict,
        batch: &ReceiptBatch,
        provenance: &PostingProvenance,
        elapsed_ms: i64,
    ) -> Settlement {
        let finalized_at = self.clock.utc();
        match verdict {
            ErpVerdict::Succeeded {
                material_doc_no,
                doc_year,
                posting_date,
                response,
            } => Settlement {
                result: Ok(PostedGoodsReceipt {
                    erp_response: response.clone(),
                    items_processed: batch.len(),
                    logged_in_user: provenance.session.user_id.to_string(),
                    posted_by_rfid: provenance.tapped_credential.clone(),
                    material_doc_no: material_doc_no.clone(),
                    doc_year: doc_year.clone(),
                }),
                finalization: ReceiptFinalization {
                    outcome: ReceiptOutcome::Succeeded {
                        material_doc_no,
                        doc_year,
                        posting_date,
                    },
                    response: Some(response),
                    elapsed_ms,
                    finalized_at,
                },
                audit_message: None,
            },
            failed => {
                let failure = ErpOperationFailure::from_verdict(&failed, UNHANDLED_FAILURE_MESSAGE)
                    .unwrap_or_else(|| ErpOperationFailure::unhandled(UNHANDLED_FAILURE_MESSAGE));
                let reason = match &failed {
                    ErpVerdict::TransportFailure {
                        original_message, ..
                    } => original_message.clone(),
                    _ => failure.message.clone(),
                };
                Settlement {
                    finalization: ReceiptFinalization {
                        outcome: ReceiptOutcome::Failed {
                            reason: reason.clone(),
                        },
                        response: Some(failed.response().clone()),
                        elapsed_ms,
                        finalized_at,
                    },
                    audit_message: Some(reason),
                    result: Err(failure),
                }
            }
        }
    }

    fn settle_gateway_fault(&self, fault: &ErpGatewayError, elapsed_ms: i64) -> Settlement {
        let (failure, reason) = match fault {
            ErpGatewayError::Timeout { message } => {
                (ErpOperationFailure::timeout(message.clone()), fault.to_string())
            }
            ErpGatewayError::Transport { message } => (
                ErpOperationFailure::unhandled(UNHANDLED_FAILURE_MESSAGE),
                message.clone(),
            ),
        };
        Settlement {
            finalization: ReceiptFinalization {
                outcome: ReceiptOutcome::Failed {
                    reason: reason.clone(),
                },
                response: None,
                elapsed_ms,
                finalized_at: self.clock.utc(),
            },
            audit_message: Some(reason),
            result: Err(failure),
        }
    }

    async fn finalize(&self, batch: &ReceiptBatch, finalization: &ReceiptFinalization) {
        match self.ledger.finalize(batch, finalization).await {
            Ok(updated) if updated == batch.len() => {}
            Ok(updated) => warn!(
                expected = batch.len(),
                updated, "receipt ledger finalised fewer rows than were written"
            ),
            Err(err) => error!(
                rows = batch.len(),
                success = finalization.is_success(),
                error = %err,
                "failed to finalise receipt ledger rows"
            ),
        }
    }
}

#[async_trait]
impl<A, L, G, W> GoodsReceiptCommand for GoodsReceiptService<A, L, G, W>
where
    A: AccountRepository + ?Sized,
    L: ReceiptLedgerRepository + ?Sized,
    G: ErpGateway + ?Sized,
    W: ActivityLogRepository + ?Sized,
{
    async fn post_goods_receipt(
        &self,
        request: PostGoodsReceiptRequest,
    ) -> Result<PostedGoodsReceipt, ErpOperationFailure> {
        let entry = ActivityEntry::new(ActivityType::CreateGr, request.request_snapshot)
            .from_ip(request.caller_ip);

        let submission = match ReceiptSubmission::try_from(request.submission) {
            Ok(submission) => submission,
            Err(errors) => {
                let failure = ErpOperationFailure::validation(&errors);
                return Err(self.reject(entry, None, failure).await);
            }
        };

        let session = match self
            .verifier
            .resolve_session(request.session_user.as_ref())
            .await
        {
            Ok(account) => account,
            Err(err) => {
                let failure = map_verification_error(&err);
                return Err(self.reject(entry, None, failure).await);
            }
        };

        let provenance = match self
            .verifier
            .verify_posting(session.clone(), submission.credential())
            .await
        {
            Ok(provenance) => provenance,
            Err(err) => {
                let failure = map_verification_error(&err);
                return Err(self.reject(entry, Some(&session), failure).await);
            }
        };

        info!(
            logged_in_user = %provenance.session.user_id,
            rfid_user = %provenance.tapped.user_id,
            same_person = provenance.is_same_person(),
            items_count = submission.lines().len(),
            delivery_note = submission.delivery_note(),
            "goods receipt posting started"
        );

        let endpoint = self.gateway.goods_receipt_endpoint();
        let payload = build_erp_payload(&submission);
        let batch = ReceiptBatch::open(&submission, &provenance, &endpoint, self.clock.utc());
        let entry = entry.at_endpoint(endpoint.as_str());

        if let Err(err) = self.ledger.create_pending(&batch).await {
            error!(error = %err, "failed to write pending receipt ledger rows");
            let failure = map_ledger_error(&err);
            return Err(self.reject(entry, Some(&provenance.tapped), failure).await);
        }

        let started = Instant::now();
        let reply = self.gateway.post_goods_receipt(&payload).await;
        let elapsed = elapsed_ms(started);

        let settlement = match reply {
            Ok(reply) => {
                info!(
                    status = reply.status,
                    elapsed_ms = elapsed,
                    "ERP goods receipt response received"
                );
                let verdict = interpret_erp_reply(&reply, submission.post_date());
                self.settle(verdict, &batch, &provenance, elapsed)
            }
            Err(fault) => {
                error!(error = %fault, elapsed_ms = elapsed, "ERP goods receipt call failed");
                self.settle_gateway_fault(&fault, elapsed)
            }
        };

        self.finalize(&batch, &settlement.finalization).await;

        let entry = entry.by(Some(&provenance.tapped)).took(elapsed);
        match &settlement.result {
            Ok(posted) => {
                info!(
                    items_processed = posted.items_processed,
                    material_doc_no = posted.material_doc_no.as_deref().unwrap_or("N/A"),
                    logged_in_rfid = %provenance.session_credential,
                    posted_by_rfid = %provenance.tapped_credential,
                    "goods receipt posting succeeded"
                );
                self.auditor
                    .record(entry.succeeded(200, Some(posted.erp_response.clone())))
                    .await;
            }
            Err(failure) => {
                warn!(
                    status = failure.status,
                    error_type = failure.error_type.map(ErpErrorType::as_str).unwrap_or("N/A"),
                    message = %failure.message,
                    "goods receipt posting failed"
                );
                let message = settlement
                    .audit_message
                    .clone()
                    .unwrap_or_else(|| failure.message.clone());
                self.auditor
                    .record(entry.failed(
                        failure.status,
                        message,
                        settlement.finalization.response.clone(),
                    ))
                    .await;
            }
        }

        settlement.result
    }

    async fn reject_malformed(&self, request: MalformedGoodsReceipt) -> ErpOperationFailure {
        warn!(error = %request.error, "goods receipt body could not be decoded");
        let entry = ActivityEntry::new(ActivityType::CreateGr, request.request_snapshot)
            .from_ip(request.caller_ip);
        self.reject(entry, None, ErpOperationFailure::malformed_body(&request.error))
            .await
    }
}

#[cfg(test)]
#[path = "goods_receipt_service_tests.rs"]
mod tests;
