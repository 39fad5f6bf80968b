//! Read-side queries over posted goods receipts.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info};

use super::activity_auditor::{ActivityAuditor, ActivityEntry};
use super::identity::resolve_principal;
use super::ports::{
    AccountRepository, ActivityLogRepository, DropdownValuesRequest, LineHistoryRequest,
    ReceiptDropdownValues, ReceiptHistoryQuery, ReceiptLedgerRepository,
    ReceiptLedgerRepositoryError,
};
use super::{Account, ActivityType, Error, PostedReceipt};

fn map_ledger_error(error: ReceiptLedgerRepositoryError) -> Error {
    match error {
        ReceiptLedgerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("receipt ledger unavailable: {message}"))
        }
        ReceiptLedgerRepositoryError::Query { message } => {
            Error::internal(format!("receipt ledger error: {message}"))
        }
    }
}

fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// Collapse posted receipts into distinct, sorted, non-empty filter values.
#[must_use]
pub fn dropdown_values(receipts: &[PostedReceipt]) -> ReceiptDropdownValues {
    let mut delivery_notes = BTreeSet::new();
    let mut receipt_dates = BTreeSet::new();
    let mut batch_nos = BTreeSet::new();
    let mut slocs = BTreeSet::new();

    for receipt in receipts {
        delivery_notes.extend(present(Some(receipt.delivery_note.as_str())));
        receipt_dates.insert(receipt.receipt_date);
        batch_nos.extend(present(receipt.batch_no.as_deref()));
        slocs.extend(present(receipt.sloc.as_deref()));
    }

    ReceiptDropdownValues {
        delivery_notes: delivery_notes.into_iter().collect(),
        receipt_dates: receipt_dates.into_iter().collect(),
        batch_nos: batch_nos.into_iter().collect(),
        slocs: slocs.into_iter().collect(),
        total_records: receipts.len(),
    }
}

/// History service implementing [`ReceiptHistoryQuery`].
pub struct ReceiptHistoryService<A: ?Sized, L: ?Sized, W: ?Sized> {
    accounts: Arc<A>,
    ledger: Arc<L>,
    auditor: ActivityAuditor<W>,
}

impl<A, L, W> ReceiptHistoryService<A, L, W>
where
    A: AccountRepository + ?Sized,
    L: ReceiptLedgerRepository + ?Sized,
    W: ActivityLogRepository + ?Sized,
{
    /// Wire the service to its driven ports.
    pub fn new(
        accounts: Arc<A>,
        ledger: Arc<L>,
        activity_log: Arc<W>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            ledger,
            auditor: ActivityAuditor::new(activity_log, clock),
        }
    }

    async fn principal(
        &self,
        entry: &ActivityEntry,
        session_user: Option<&super::AccountId>,
    ) -> Result<Account, Error> {
        match resolve_principal(self.accounts.as_ref(), session_user).await {
            Ok(account) => Ok(account),
            Err(err) => {
                let error = Error::from(err);
                self.auditor
                    .record(entry.clone().failed(
                        error.code().http_status(),
                        error.message().to_owned(),
                        None,
                    ))
                    .await;
                Err(error)
            }
        }
    }

    async fn finish<T>(
        &self,
        entry: ActivityEntry,
        started: Instant,
        result: Result<T, ReceiptLedgerRepositoryError>,
        summary: impl FnOnce(&T) -> serde_json::Value,
    ) -> Result<T, Error> {
        let entry = entry.took(elapsed_ms(started));
        match result {
            Ok(value) => {
                self.auditor
                    .record(entry.succeeded(200, Some(summary(&value))))
                    .await;
                Ok(value)
            }
            Err(err) => {
                error!(activity = entry.activity().as_str(), error = %err, "receipt history query failed");
                let error = map_ledger_error(err);
                self.auditor
                    .record(entry.failed(
                        error.code().http_status(),
                        error.message().to_owned(),
                        None,
                    ))
                    .await;
                Err(error)
            }
        }
    }
}

#[async_trait]
impl<A, L, W> ReceiptHistoryQuery for ReceiptHistoryService<A, L, W>
where
    A: AccountRepository + ?Sized,
    L: ReceiptLedgerRepository + ?Sized,
    W: ActivityLogRepository + ?Sized,
{
    async fn history_by_line(
        &self,
        request: LineHistoryRequest,
    ) -> Result<Vec<PostedReceipt>, Error> {
        let entry = ActivityEntry::new(
            ActivityType::GetGrHistoryByItem,
            json!({ "po_no": request.po_no, "line_no": request.line_no }),
        )
        .from_ip(request.caller_ip.clone());
        let session = self
            .principal(&entry, request.session_user.as_ref())
            .await?;
        info!(
            po_no = %request.po_no,
            line_no = %request.line_no,
            requested_by = %session.email,
            "goods receipt history requested"
        );

        let started = Instant::now();
        let result = self
            .ledger
            .history_for_line(&request.po_no, &request.line_no)
            .await;
        self.finish(entry.by(Some(&session)), started, result, |rows| {
            json!({ "total_records": rows.len() })
        })
        .await
    }

    async fn dropdown_values(
        &self,
        request: DropdownValuesRequest,
    ) -> Result<ReceiptDropdownValues, Error> {
        let entry = ActivityEntry::new(
            ActivityType::GetGrDropdownValues,
            json!({ "po_no": request.po_no, "line_no": request.line_no }),
        )
        .from_ip(request.caller_ip.clone());
        let session = self
            .principal(&entry, request.session_user.as_ref())
            .await?;

        let started = Instant::now();
        let result = self
            .ledger
            .posted_receipts(&request.po_no, request.line_no.clone())
            .await
            .map(|rows| dropdown_values(&rows));
        self.finish(entry.by(Some(&session)), started, result, |values| {
            json!({ "total_records": values.total_records })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use chrono::{NaiveDate, Utc};
    use mockable::DefaultClock;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::domain::ports::{
        MockAccountRepository, MockActivityLogRepository, MockReceiptLedgerRepository,
    };
    use crate::domain::{AccountId, AccountStatus, ErrorCode};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).expect("date")
    }

    fn receipt(dn: &str, day: u32, batch: Option<&str>, sloc: Option<&str>) -> PostedReceipt {
        PostedReceipt {
            receipt_date: date(day),
            qty: 1.0,
            delivery_note: dn.to_owned(),
            sloc: sloc.map(str::to_owned),
            batch_no: batch.map(str::to_owned),
            material_doc_no: "5000000001".to_owned(),
            doc_year: Some("2025".to_owned()),
            plant: "1000".to_owned(),
            created_at: Utc::now(),
            session_email: None,
            department: None,
            logged_in_user_rfid: None,
            posting_rfid: None,
        }
    }

    fn session_account() -> Account {
        Account {
            internal_id: Uuid::new_v4(),
            user_id: AccountId::new("OJSAIT003").expect("id"),
            first_name: "Dewi".to_owned(),
            last_name: "Lestari".to_owned(),
            full_name: "Dewi Lestari".to_owned(),
            position: None,
            department: Some("QC".to_owned()),
            email: "dewi@example.com".to_owned(),
            status: AccountStatus::Active,
            credential: None,
        }
    }

    fn service(
        ledger: MockReceiptLedgerRepository,
    ) -> ReceiptHistoryService<MockAccountRepository, MockReceiptLedgerRepository, MockActivityLogRepository>
    {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(|_| Ok(Some(session_account())));
        let mut log = MockActivityLogRepository::new();
        log.expect_append().times(1).returning(|_| Ok(()));
        ReceiptHistoryService::new(
            Arc::new(accounts),
            Arc::new(ledger),
            Arc::new(log),
            Arc::new(DefaultClock),
        )
    }

    #[rstest]
    fn dropdown_values_are_distinct_sorted_and_non_empty() {
        let receipts = vec![
            receipt("DN-2", 5, Some("B2"), Some("W01")),
            receipt("DN-1", 3, Some(""), Some("W01")),
            receipt("DN-2", 3, None, Some("  ")),
            receipt("DN-1", 4, Some("B1"), None),
        ];

        let values = dropdown_values(&receipts);

        assert_eq!(values.delivery_notes, vec!["DN-1", "DN-2"]);
        assert_eq!(values.receipt_dates, vec![date(3), date(4), date(5)]);
        assert_eq!(values.batch_nos, vec!["B1", "B2"]);
        assert_eq!(values.slocs, vec!["W01"]);
        assert_eq!(values.total_records, 4);
    }

    #[rstest]
    #[tokio::test]
    async fn history_reads_the_requested_line() {
        let mut ledger = MockReceiptLedgerRepository::new();
        ledger
            .expect_history_for_line()
            .withf(|po, line| po == "4500000001" && line == "10")
            .times(1)
            .returning(|_, _| Ok(vec![receipt("DN-1", 3, None, None)]));

        let rows = service(ledger)
            .history_by_line(LineHistoryRequest {
                session_user: Some(AccountId::new("OJSAIT003").expect("id")),
                caller_ip: None,
                po_no: "4500000001".to_owned(),
                line_no: "10".to_owned(),
            })
            .await
            .expect("history");

        assert_eq!(rows.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn dropdown_values_pass_the_optional_line() {
        let mut ledger = MockReceiptLedgerRepository::new();
        ledger
            .expect_posted_receipts()
            .withf(|po, line| po == "4500000001" && line.is_none())
            .times(1)
            .returning(|_, _| Ok(vec![receipt("DN-9", 7, Some("B7"), Some("W02"))]));

        let values = service(ledger)
            .dropdown_values(DropdownValuesRequest {
                session_user: Some(AccountId::new("OJSAIT003").expect("id")),
                caller_ip: None,
                po_no: "4500000001".to_owned(),
                line_no: None,
            })
            .await
            .expect("values");

        assert_eq!(values.delivery_notes, vec!["DN-9"]);
        assert_eq!(values.total_records, 1);
    }

    #[rstest]
    #[case(ReceiptLedgerRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(ReceiptLedgerRepositoryError::query("bad sql"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn ledger_failures_map_to_domain_errors(
        #[case] failure: ReceiptLedgerRepositoryError,
        #[case] code: ErrorCode,
    ) {
        let mut ledger = MockReceiptLedgerRepository::new();
        ledger
            .expect_history_for_line()
            .return_once(move |_, _| Err(failure));

        let err = service(ledger)
            .history_by_line(LineHistoryRequest {
                session_user: Some(AccountId::new("OJSAIT003").expect("id")),
                caller_ip: None,
                po_no: "4500000001".to_owned(),
                line_no: "10".to_owned(),
            })
            .await
            .expect_err("ledger failure");

        assert_eq!(err.code(), code);
    }

    #[rstest]
    #[tokio::test]
    async fn history_requires_a_session() {
        let mut log = MockActivityLogRepository::new();
        log.expect_append().times(1).returning(|_| Ok(()));
        let mut ledger = MockReceiptLedgerRepository::new();
        ledger.expect_history_for_line().times(0);
        let service = ReceiptHistoryService::new(
            Arc::new(MockAccountRepository::new()),
            Arc::new(ledger),
            Arc::new(log),
            Arc::new(DefaultClock),
        );

        let err = service
            .history_by_line(LineHistoryRequest {
                session_user: None,
                caller_ip: None,
                po_no: "4500000001".to_owned(),
                line_no: "10".to_owned(),
            })
            .await
            .expect_err("no session");

        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
