//! Tests for the goods-receipt posting service.

use std::sync::{Arc, Mutex};

use mockable::DefaultClock;
use mockall::Sequence;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use uuid::Uuid;

use super::*;
use crate::domain::ports::{
    ActivityLogRepositoryError, MockAccountRepository, MockActivityLogRepository,
    MockErpGateway, MockReceiptLedgerRepository,
};
use crate::domain::{
    AccountId, AccountStatus, ActivityRecord, Credential, ErpReply, PENDING_MESSAGE,
    ReceiptLineDraft, ReceiptSubmissionDraft,
};

const SESSION_RFID: &str = "1111111111";
const TAPPED_RFID: &str = "2222222222";
const ENDPOINT: &str = "https://erp.test/zapi/ZAPI/OJI_GR_ENTRY?sap-client=300";

type Service = GoodsReceiptService<
    MockAccountRepository,
    MockReceiptLedgerRepository,
    MockErpGateway,
    MockActivityLogRepository,
>;

fn account(user_id: &str, credential: Option<&str>, status: AccountStatus) -> Account {
    Account {
        internal_id: Uuid::new_v4(),
        user_id: AccountId::new(user_id).expect("account id"),
        first_name: "Agus".to_owned(),
        last_name: "Pratama".to_owned(),
        full_name: "Agus Pratama".to_owned(),
        position: Some("Supervisor".to_owned()),
        department: Some("Warehouse".to_owned()),
        email: format!("{}@example.com", user_id.to_lowercase()),
        status,
        credential: credential.map(|raw| Credential::new(raw).expect("credential")),
    }
}

fn line(line_no: &str) -> ReceiptLineDraft {
    ReceiptLineDraft {
        po_no: "4500000001".to_owned(),
        line_no: line_no.to_owned(),
        qty: Some(5.0),
        plant: "1000".to_owned(),
        ..ReceiptLineDraft::default()
    }
}

#[fixture]
fn request() -> PostGoodsReceiptRequest {
    PostGoodsReceiptRequest {
        session_user: Some(AccountId::new("OJSAIT001").expect("id")),
        caller_ip: Some("10.1.1.1".to_owned()),
        submission: ReceiptSubmissionDraft {
            credential: TAPPED_RFID.to_owned(),
            delivery_note: "DN-77".to_owned(),
            doc_date: "03-03-2025".to_owned(),
            post_date: "04-03-2025".to_owned(),
            items: vec![line("10"), line("20"), line("7")],
        },
        request_snapshot: json!({"dn_no": "DN-77"}),
    }
}

struct Ports {
    accounts: MockAccountRepository,
    ledger: MockReceiptLedgerRepository,
    gateway: MockErpGateway,
    log: MockActivityLogRepository,
}

impl Ports {
    fn new() -> Self {
        let mut gateway = MockErpGateway::new();
        gateway
            .expect_goods_receipt_endpoint()
            .returning(|| ENDPOINT.to_owned());
        Self {
            accounts: MockAccountRepository::new(),
            ledger: MockReceiptLedgerRepository::new(),
            gateway,
            log: MockActivityLogRepository::new(),
        }
    }

    fn with_session(mut self, session: Account) -> Self {
        self.accounts
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(session)));
        self
    }

    fn with_tapped(mut self, tapped: Option<Account>) -> Self {
        self.accounts
            .expect_find_by_credential()
            .return_once(move |_| Ok(tapped));
        self
    }

    fn capturing_audit(mut self, sink: Arc<Mutex<Vec<ActivityRecord>>>) -> Self {
        self.log.expect_append().times(1).returning(move |record| {
            sink.lock().expect("audit sink").push(record.clone());
            Ok(())
        });
        self
    }

    fn build(self) -> Service {
        GoodsReceiptService::new(
            Arc::new(self.accounts),
            Arc::new(self.ledger),
            Arc::new(self.gateway),
            Arc::new(self.log),
            Arc::new(DefaultClock),
        )
    }
}

fn standard_ports() -> Ports {
    Ports::new()
        .with_session(account("OJSAIT001", Some(SESSION_RFID), AccountStatus::Active))
        .with_tapped(Some(account(
            "OJSAIT002",
            Some(TAPPED_RFID),
            AccountStatus::Active,
        )))
}

fn erp_reply(status: u16, body: Value) -> ErpReply {
    ErpReply {
        status,
        raw_body: body.to_string(),
        body: Some(body),
    }
}

fn captured_finalization(
    ledger: &mut MockReceiptLedgerRepository,
) -> Arc<Mutex<Option<ReceiptFinalization>>> {
    let slot = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&slot);
    ledger
        .expect_finalize()
        .times(1)
        .returning(move |batch, finalization| {
            *sink.lock().expect("finalization slot") = Some(finalization.clone());
            Ok(batch.len())
        });
    slot
}

#[rstest]
#[tokio::test]
async fn success_writes_pending_rows_before_erp_and_finalises_all(
    request: PostGoodsReceiptRequest,
) {
    let mut ports = standard_ports();
    let audit = Arc::new(Mutex::new(Vec::new()));
    let mut seq = Sequence::new();

    ports
        .ledger
        .expect_create_pending()
        .withf(|batch| {
            batch.len() == 3
                && batch.lines().iter().all(|row| {
                    row.logged_in_user_rfid == SESSION_RFID
                        && row.posting_rfid == TAPPED_RFID
                        && row.erp_endpoint == ENDPOINT
                })
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    ports
        .gateway
        .expect_post_goods_receipt()
        .withf(|payload| {
            payload.lines.iter().map(|l| l.line_no.as_str()).collect::<Vec<_>>()
                == vec!["00010", "00020", "00007"]
                && payload.post_date == "2025-03-04"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(erp_reply(200, json!({"mat_doc": "5000012345", "doc_year": "2025"}))));
    ports
        .ledger
        .expect_finalize()
        .withf(|batch, finalization| {
            batch.len() == 3
                && finalization.outcome
                    == ReceiptOutcome::Succeeded {
                        material_doc_no: Some("5000012345".to_owned()),
                        doc_year: Some("2025".to_owned()),
                        posting_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 4)
                            .expect("date"),
                    }
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|batch, _| Ok(batch.len()));

    let service = ports.capturing_audit(Arc::clone(&audit)).build();
    let posted = service
        .post_goods_receipt(request)
        .await
        .expect("posting succeeds");

    assert_eq!(posted.items_processed, 3);
    assert_eq!(posted.material_doc_no.as_deref(), Some("5000012345"));
    assert_eq!(posted.logged_in_user, "OJSAIT001");
    assert_eq!(posted.posted_by_rfid, TAPPED_RFID);

    let records = audit.lock().expect("audit");
    let record = records.first().expect("one audit record");
    assert!(record.success);
    assert_eq!(record.activity_type, ActivityType::CreateGr);
    assert_eq!(
        record.actor.as_ref().map(|actor| actor.user_id.as_str()),
        Some("OJSAIT002")
    );
    assert_eq!(record.erp_endpoint.as_deref(), Some(ENDPOINT));
}

#[rstest]
#[case::inactive(
    Some(account("OJSAIT002", Some(TAPPED_RFID), AccountStatus::Inactive)),
    "User account is not active"
)]
#[case::unknown(None, "RFID card not registered in system")]
#[tokio::test]
async fn rejected_tap_creates_no_rows(
    request: PostGoodsReceiptRequest,
    #[case] tapped: Option<Account>,
    #[case] message: &str,
) {
    let mut ports = Ports::new()
        .with_session(account("OJSAIT001", Some(SESSION_RFID), AccountStatus::Active))
        .with_tapped(tapped);
    ports.ledger.expect_create_pending().times(0);
    ports.gateway.expect_post_goods_receipt().times(0);
    ports.ledger.expect_finalize().times(0);
    let audit = Arc::new(Mutex::new(Vec::new()));

    let failure = ports
        .capturing_audit(Arc::clone(&audit))
        .build()
        .post_goods_receipt(request)
        .await
        .expect_err("tap rejected");

    assert_eq!(failure.status, 403);
    assert_eq!(failure.message, message);
    assert!(!audit.lock().expect("audit").first().expect("record").success);
}

#[rstest]
#[tokio::test]
async fn missing_session_is_unauthorised(mut request: PostGoodsReceiptRequest) {
    request.session_user = None;
    let mut ports = Ports::new();
    ports.accounts.expect_find_by_credential().times(0);
    ports.ledger.expect_create_pending().times(0);

    let failure = ports
        .capturing_audit(Arc::new(Mutex::new(Vec::new())))
        .build()
        .post_goods_receipt(request)
        .await
        .expect_err("no session");

    assert_eq!(failure.status, 401);
}

#[rstest]
#[tokio::test]
async fn session_without_credential_is_a_bad_request(request: PostGoodsReceiptRequest) {
    let mut ports = Ports::new()
        .with_session(account("OJSAIT001", None, AccountStatus::Active))
        .with_tapped(Some(account(
            "OJSAIT002",
            Some(TAPPED_RFID),
            AccountStatus::Active,
        )));
    ports.ledger.expect_create_pending().times(0);

    let failure = ports
        .capturing_audit(Arc::new(Mutex::new(Vec::new())))
        .build()
        .post_goods_receipt(request)
        .await
        .expect_err("session lacks credential");

    assert_eq!(failure.status, 400);
    assert_eq!(
        failure.message,
        "Your account does not have an RFID registered. Please contact administrator."
    );
}

#[rstest]
#[tokio::test]
async fn structural_errors_stop_before_any_lookup(mut request: PostGoodsReceiptRequest) {
    request.submission.credential = "123".to_owned();
    request.submission.items.clear();
    let mut ports = Ports::new();
    ports.accounts.expect_find_by_id().times(0);
    ports.ledger.expect_create_pending().times(0);

    let failure = ports
        .capturing_audit(Arc::new(Mutex::new(Vec::new())))
        .build()
        .post_goods_receipt(request)
        .await
        .expect_err("invalid submission");

    assert_eq!(failure.status, 422);
    let errors = failure
        .details
        .as_ref()
        .and_then(|details| details.get("errors"))
        .expect("field errors");
    assert!(errors.get("credential").is_some());
    assert!(errors.get("items").is_some());
}

#[rstest]
#[tokio::test]
async fn undecodable_body_is_audited_without_lookups() {
    let audit = Arc::new(Mutex::new(Vec::new()));
    let mut ports = Ports::new().capturing_audit(Arc::clone(&audit));
    ports.accounts.expect_find_by_id().never();
    ports.ledger.expect_create_pending().never();
    ports.gateway.expect_post_goods_receipt().never();

    let failure = ports
        .build()
        .reject_malformed(MalformedGoodsReceipt {
            caller_ip: Some("10.1.1.1".to_owned()),
            error: "invalid type: integer `12`, expected a string".to_owned(),
            request_snapshot: json!({"dn_no": "DN-77", "items": [{"sloc": 12}]}),
        })
        .await;

    assert_eq!(failure.status, 422);
    assert!(
        failure
            .details
            .as_ref()
            .and_then(|details| details.pointer("/errors/body"))
            .is_some()
    );
    let records = audit.lock().expect("audit sink");
    let record = records.first().expect("one audit record");
    assert_eq!(record.activity_type, ActivityType::CreateGr);
    assert!(!record.success);
    assert_eq!(record.status_code, Some(422));
    assert_eq!(record.ip_address.as_deref(), Some("10.1.1.1"));
    assert_eq!(record.keys.delivery_note.as_deref(), Some("DN-77"));
}

#[rstest]
#[tokio::test]
async fn embedded_business_failure_marks_rows_failed(request: PostGoodsReceiptRequest) {
    let mut ports = standard_ports();
    ports.ledger.expect_create_pending().returning(|_| Ok(()));
    ports.gateway.expect_post_goods_receipt().returning(|_| {
        Ok(erp_reply(
            200,
            json!({"type": "E", "message": "Plant 1000 not found"}),
        ))
    });
    let finalization = captured_finalization(&mut ports.ledger);

    let failure = ports
        .capturing_audit(Arc::new(Mutex::new(Vec::new())))
        .build()
        .post_goods_receipt(request)
        .await
        .expect_err("business failure");

    assert_eq!(failure.status, 422);
    assert_eq!(failure.error_type, Some(ErpErrorType::SapProcessingError));
    let stored = finalization.lock().expect("slot").clone().expect("finalised");
    assert_eq!(stored.error_message(), Some("Plant 1000 not found"));
    assert_ne!(stored.error_message(), Some(PENDING_MESSAGE));
}

#[rstest]
#[tokio::test]
async fn transport_failure_passes_erp_status_through(request: PostGoodsReceiptRequest) {
    let mut ports = standard_ports();
    ports.ledger.expect_create_pending().returning(|_| Ok(()));
    ports.gateway.expect_post_goods_receipt().returning(|_| {
        Ok(erp_reply(
            500,
            json!({"error": {"message": {"value": "Posting period 03/2025 is closed"}}}),
        ))
    });
    let finalization = captured_finalization(&mut ports.ledger);

    let failure = ports
        .capturing_audit(Arc::new(Mutex::new(Vec::new())))
        .build()
        .post_goods_receipt(request)
        .await
        .expect_err("transport failure");

    assert_eq!(failure.status, 500);
    assert_eq!(failure.error_type, Some(ErpErrorType::SapServerError));
    assert!(failure.message.contains("Posting period is closed"));
    let stored = finalization.lock().expect("slot").clone().expect("finalised");
    assert!(!stored.is_success());
}

#[rstest]
#[tokio::test]
async fn network_fault_fails_every_row_with_the_fault_text(request: PostGoodsReceiptRequest) {
    let mut ports = standard_ports();
    ports.ledger.expect_create_pending().returning(|_| Ok(()));
    ports
        .gateway
        .expect_post_goods_receipt()
        .returning(|_| Err(ErpGatewayError::transport("connection reset by peer")));
    let finalization = captured_finalization(&mut ports.ledger);

    let failure = ports
        .capturing_audit(Arc::new(Mutex::new(Vec::new())))
        .build()
        .post_goods_receipt(request)
        .await
        .expect_err("network fault");

    assert_eq!(failure.status, 500);
    assert_eq!(failure.message, UNHANDLED_FAILURE_MESSAGE);
    assert_eq!(failure.error_type, Some(ErpErrorType::UnknownError));
    let stored = finalization.lock().expect("slot").clone().expect("finalised");
    assert_eq!(stored.error_message(), Some("connection reset by peer"));
}

#[rstest]
#[tokio::test]
async fn timeout_is_service_unavailable(request: PostGoodsReceiptRequest) {
    let mut ports = standard_ports();
    ports.ledger.expect_create_pending().returning(|_| Ok(()));
    ports
        .gateway
        .expect_post_goods_receipt()
        .returning(|_| Err(ErpGatewayError::timeout("deadline elapsed")));
    let finalization = captured_finalization(&mut ports.ledger);

    let failure = ports
        .capturing_audit(Arc::new(Mutex::new(Vec::new())))
        .build()
        .post_goods_receipt(request)
        .await
        .expect_err("timeout");

    assert_eq!(failure.status, 503);
    assert_eq!(failure.error_type, Some(ErpErrorType::ServiceUnavailable));
    assert!(finalization.lock().expect("slot").is_some());
}

#[rstest]
#[tokio::test]
async fn pending_write_failure_skips_the_erp(request: PostGoodsReceiptRequest) {
    let mut ports = standard_ports();
    ports
        .ledger
        .expect_create_pending()
        .returning(|_| Err(ReceiptLedgerRepositoryError::connection("pool exhausted")));
    ports.gateway.expect_post_goods_receipt().times(0);
    ports.ledger.expect_finalize().times(0);

    let failure = ports
        .capturing_audit(Arc::new(Mutex::new(Vec::new())))
        .build()
        .post_goods_receipt(request)
        .await
        .expect_err("ledger unavailable");

    assert_eq!(failure.status, 503);
}

#[rstest]
#[tokio::test]
async fn finalise_and_audit_failures_do_not_change_the_outcome(
    request: PostGoodsReceiptRequest,
) {
    let mut ports = standard_ports();
    ports.ledger.expect_create_pending().returning(|_| Ok(()));
    ports
        .gateway
        .expect_post_goods_receipt()
        .returning(|_| Ok(erp_reply(201, json!({"material_doc_no": "5000000009"}))));
    ports
        .ledger
        .expect_finalize()
        .times(1)
        .returning(|_, _| Err(ReceiptLedgerRepositoryError::query("deadlock detected")));
    ports
        .log
        .expect_append()
        .times(1)
        .returning(|_| Err(ActivityLogRepositoryError::query("disk full")));

    let posted = ports
        .build()
        .post_goods_receipt(request)
        .await
        .expect("ERP accepted the receipt");

    assert_eq!(posted.material_doc_no.as_deref(), Some("5000000009"));
}

#[rstest]
#[tokio::test]
async fn own_card_posting_records_identical_credentials(mut request: PostGoodsReceiptRequest) {
    request.submission.credential = SESSION_RFID.to_owned();
    let mut ports = Ports::new()
        .with_session(account("OJSAIT001", Some(SESSION_RFID), AccountStatus::Active))
        .with_tapped(Some(account(
            "OJSAIT001",
            Some(SESSION_RFID),
            AccountStatus::Active,
        )));
    ports
        .ledger
        .expect_create_pending()
        .withf(|batch| {
            batch
                .lines()
                .iter()
                .all(|row| row.logged_in_user_rfid == row.posting_rfid)
        })
        .returning(|_| Ok(()));
    ports
        .gateway
        .expect_post_goods_receipt()
        .returning(|_| Ok(erp_reply(200, json!({"mat_doc": "1"}))));
    ports.ledger.expect_finalize().returning(|batch, _| Ok(batch.len()));

    let posted = ports
        .capturing_audit(Arc::new(Mutex::new(Vec::new())))
        .build()
        .post_goods_receipt(request)
        .await
        .expect("posting succeeds");

    assert_eq!(posted.posted_by_rfid, SESSION_RFID);
}
