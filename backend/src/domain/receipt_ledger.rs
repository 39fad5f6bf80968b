//! Receipt ledger rows tracking one goods-receipt attempt per submitted line.
//!
//! A [`ReceiptBatch`] owns every row created for a single submission. Rows are
//! written pending before the ERP is called and all of them are moved to the
//! same terminal state by one [`ReceiptFinalization`].

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{Account, ReceiptLine, ReceiptSubmission};

/// Error message stored on rows that have not been finalised yet.
pub const PENDING_MESSAGE: &str = "Processing...";

/// Lifecycle state of one ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptLineStatus {
    /// Written before the ERP call; awaiting finalisation.
    Pending,
    /// The ERP accepted the batch.
    Succeeded,
    /// The batch failed for any reason.
    Failed,
}

impl ReceiptLineStatus {
    /// Recover the status from the stored success flag and message.
    #[must_use]
    pub fn from_stored(success: bool, error_message: Option<&str>) -> Self {
        match (success, error_message) {
            (true, _) => Self::Succeeded,
            (false, Some(PENDING_MESSAGE)) => Self::Pending,
            (false, _) => Self::Failed,
        }
    }
}

/// Who asked for the posting and who authorised it.
///
/// The two accounts may differ: a supervisor's session can carry a worker's
/// tap, or the reverse. Both credentials are recorded independently.
#[derive(Debug, Clone, PartialEq)]
pub struct PostingProvenance {
    /// Account behind the calling session.
    pub session: Account,
    /// Account owning the tapped credential.
    pub tapped: Account,
    /// Credential registered to the session account.
    pub session_credential: String,
    /// Credential physically tapped.
    pub tapped_credential: String,
}

impl PostingProvenance {
    /// Whether the session owner tapped their own card.
    #[must_use]
    pub fn is_same_person(&self) -> bool {
        self.session_credential == self.tapped_credential
    }
}

/// One ledger row as written before the ERP call.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReceiptLine {
    /// Row id.
    pub id: Uuid,
    /// Delivery note shared by the batch.
    pub delivery_note: String,
    /// Requested posting date shared by the batch.
    pub receipt_date: NaiveDate,
    /// Purchase order number.
    pub po_no: String,
    /// Purchase order line, unpadded.
    pub line_no: String,
    /// Received quantity.
    pub qty: f64,
    /// Receiving plant.
    pub plant: String,
    /// Storage location.
    pub sloc: Option<String>,
    /// Batch number.
    pub batch_no: Option<String>,
    /// Manufacture date.
    pub manufacture_date: Option<NaiveDate>,
    /// External id of the tapping account.
    pub posting_user_id: String,
    /// Row id of the tapping account.
    pub posting_account_id: Uuid,
    /// Email of the session account.
    pub session_email: String,
    /// Department of the session account, or the tapping account's.
    pub department: Option<String>,
    /// Credential of the session account.
    pub logged_in_user_rfid: String,
    /// Credential tapped for this posting.
    pub posting_rfid: String,
    /// Submitted line snapshot.
    pub erp_request: Value,
    /// ERP URL used.
    pub erp_endpoint: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl PendingReceiptLine {
    fn from_line(
        line: &ReceiptLine,
        submission: &ReceiptSubmission,
        provenance: &PostingProvenance,
        erp_endpoint: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            delivery_note: submission.delivery_note().to_owned(),
            receipt_date: submission.post_date(),
            po_no: line.po_no.clone(),
            line_no: line.line_no.clone(),
            qty: line.qty,
            plant: line.plant.clone(),
            sloc: line.sloc.clone(),
            batch_no: line.batch_no.clone(),
            manufacture_date: line.manufacture_date,
            posting_user_id: provenance.tapped.user_id.to_string(),
            posting_account_id: provenance.tapped.internal_id,
            session_email: provenance.session.email.clone(),
            department: provenance
                .session
                .department
                .clone()
                .or_else(|| provenance.tapped.department.clone()),
            logged_in_user_rfid: provenance.session_credential.clone(),
            posting_rfid: provenance.tapped_credential.clone(),
            erp_request: line_snapshot(line),
            erp_endpoint: erp_endpoint.to_owned(),
            created_at,
        }
    }
}

fn line_snapshot(line: &ReceiptLine) -> Value {
    serde_json::json!({
        "po_no": line.po_no,
        "line_no": line.line_no,
        "qty": line.qty,
        "plant": line.plant,
        "sloc": line.sloc,
        "batch_no": line.batch_no,
        "manufacture_date": line.manufacture_date.map(|date| date.to_string()),
    })
}

/// All ledger rows belonging to one submission.
///
/// ## Invariants
/// - one row per submitted line, in submission order;
/// - every row shares the delivery note and dates of the submission;
/// - the batch is finalised as a whole, never row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptBatch {
    lines: Vec<PendingReceiptLine>,
}

impl ReceiptBatch {
    /// Open a batch of pending rows for `submission`.
    #[must_use]
    pub fn open(
        submission: &ReceiptSubmission,
        provenance: &PostingProvenance,
        erp_endpoint: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        let lines = submission
            .lines()
            .iter()
            .map(|line| {
                PendingReceiptLine::from_line(line, submission, provenance, erp_endpoint, created_at)
            })
            .collect();
        Self { lines }
    }

    /// Pending rows in submission order.
    pub fn lines(&self) -> &[PendingReceiptLine] {
        self.lines.as_slice()
    }

    /// Row ids in submission order.
    pub fn ids(&self) -> Vec<Uuid> {
        self.lines.iter().map(|line| line.id).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the batch holds no rows.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Terminal state applied to every row of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiptOutcome {
    /// The ERP accepted the batch.
    Succeeded {
        /// ERP material document number.
        material_doc_no: Option<String>,
        /// Fiscal year of the document.
        doc_year: Option<String>,
        /// Effective posting date.
        posting_date: NaiveDate,
    },
    /// The batch failed.
    Failed {
        /// Stored failure message.
        reason: String,
    },
}

/// Update applied once to a whole batch after the ERP call resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptFinalization {
    /// Terminal state.
    pub outcome: ReceiptOutcome,
    /// ERP response snapshot, when one was received.
    pub response: Option<Value>,
    /// Wall time spent on the ERP call.
    pub elapsed_ms: i64,
    /// Update timestamp.
    pub finalized_at: DateTime<Utc>,
}

impl ReceiptFinalization {
    /// Whether the batch ends up succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ReceiptOutcome::Succeeded { .. })
    }

    /// Message stored on every row; `None` on success.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            ReceiptOutcome::Succeeded { .. } => None,
            ReceiptOutcome::Failed { reason } => Some(reason.as_str()),
        }
    }
}

/// A finalised, successful ledger row as read back for history queries.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedReceipt {
    /// Requested posting date.
    pub receipt_date: NaiveDate,
    /// Received quantity.
    pub qty: f64,
    /// Delivery note.
    pub delivery_note: String,
    /// Storage location.
    pub sloc: Option<String>,
    /// Batch number.
    pub batch_no: Option<String>,
    /// ERP material document number.
    pub material_doc_no: String,
    /// Fiscal year.
    pub doc_year: Option<String>,
    /// Receiving plant.
    pub plant: String,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Email of the session account.
    pub session_email: Option<String>,
    /// Department recorded on the row.
    pub department: Option<String>,
    /// Credential of the session account.
    pub logged_in_user_rfid: Option<String>,
    /// Credential tapped for the posting.
    pub posting_rfid: Option<String>,
}
