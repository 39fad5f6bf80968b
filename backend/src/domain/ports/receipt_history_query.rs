//! Driving port for reading posted goods receipts.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{AccountId, Error, PostedReceipt};

/// History of one purchase order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineHistoryRequest {
    /// Account stored in the caller's session.
    pub session_user: Option<AccountId>,
    /// Caller address for the audit log.
    pub caller_ip: Option<String>,
    /// Purchase order number.
    pub po_no: String,
    /// Purchase order line, unpadded.
    pub line_no: String,
}

/// Filter values for a purchase order, optionally one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownValuesRequest {
    /// Account stored in the caller's session.
    pub session_user: Option<AccountId>,
    /// Caller address for the audit log.
    pub caller_ip: Option<String>,
    /// Purchase order number.
    pub po_no: String,
    /// Optional purchase order line.
    pub line_no: Option<String>,
}

/// Distinct, sorted, non-empty values among posted receipts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptDropdownValues {
    /// Delivery notes.
    pub delivery_notes: Vec<String>,
    /// Receipt dates.
    pub receipt_dates: Vec<NaiveDate>,
    /// Batch numbers.
    pub batch_nos: Vec<String>,
    /// Storage locations.
    pub slocs: Vec<String>,
    /// Number of receipts the values were drawn from.
    pub total_records: usize,
}

/// Domain use-case port for receipt history reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReceiptHistoryQuery: Send + Sync {
    /// Posted receipts for one line, newest first.
    async fn history_by_line(&self, request: LineHistoryRequest)
    -> Result<Vec<PostedReceipt>, Error>;

    /// Distinct filter values for a purchase order.
    async fn dropdown_values(
        &self,
        request: DropdownValuesRequest,
    ) -> Result<ReceiptDropdownValues, Error>;
}

/// Fixture query with no history.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReceiptHistoryQuery;

#[async_trait]
impl ReceiptHistoryQuery for FixtureReceiptHistoryQuery {
    async fn history_by_line(
        &self,
        _request: LineHistoryRequest,
    ) -> Result<Vec<PostedReceipt>, Error> {
        Ok(Vec::new())
    }

    async fn dropdown_values(
        &self,
        _request: DropdownValuesRequest,
    ) -> Result<ReceiptDropdownValues, Error> {
        Ok(ReceiptDropdownValues::default())
    }
}
