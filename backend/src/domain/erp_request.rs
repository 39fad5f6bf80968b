//! Builds the ERP's goods-receipt batch payload from a validated submission.
//!
//! The ERP keeps its own field names on the wire (`dn_no`, `it_input`,
//! `item_po`, `dom`); the Rust-side names describe what each value is.

use chrono::NaiveDate;
use serde::Serialize;

use super::{ReceiptLine, ReceiptSubmission};

/// Date format the ERP expects (`2025-01-31`).
pub const ERP_DATE_FORMAT: &str = "%Y-%m-%d";

/// Width the ERP expects purchase order line numbers to be padded to.
pub const LINE_NO_WIDTH: usize = 5;

/// One outbound line of a goods-receipt batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErpBatchLine {
    /// Purchase order number.
    pub po_no: String,
    /// Zero-padded purchase order line number.
    #[serde(rename = "item_po")]
    pub line_no: String,
    /// Received quantity.
    pub qty: f64,
    /// Receiving plant.
    pub plant: String,
    /// Storage location; empty string when not given.
    pub sloc: String,
    /// Batch number; empty string when not given.
    pub batch_no: String,
    /// Manufacture date, defaulting to the document date.
    #[serde(rename = "dom")]
    pub manufacture_date: String,
}

/// Outbound goods-receipt batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErpBatchPayload {
    /// Delivery note shared by all lines.
    #[serde(rename = "dn_no")]
    pub delivery_note: String,
    /// Document date in ERP format.
    pub doc_date: String,
    /// Posting date in ERP format.
    pub post_date: String,
    /// Batch lines in submission order.
    #[serde(rename = "it_input")]
    pub lines: Vec<ErpBatchLine>,
}

/// Left-pad a line number with zeros to [`LINE_NO_WIDTH`]; longer input is
/// passed through untouched.
///
/// # Examples
/// ```
/// use gr_backend::domain::pad_line_no;
///
/// assert_eq!(pad_line_no("7"), "00007");
/// assert_eq!(pad_line_no("12345"), "12345");
/// assert_eq!(pad_line_no("1234567"), "1234567");
/// ```
#[must_use]
pub fn pad_line_no(raw: &str) -> String {
    format!("{raw:0>LINE_NO_WIDTH$}")
}

/// Render a date the way the ERP expects it.
#[must_use]
pub fn erp_date(date: NaiveDate) -> String {
    date.format(ERP_DATE_FORMAT).to_string()
}

/// Transform one validated line for the ERP.
#[must_use]
pub fn build_erp_line(line: &ReceiptLine, doc_date: NaiveDate) -> ErpBatchLine {
    ErpBatchLine {
        po_no: line.po_no.clone(),
        line_no: pad_line_no(&line.line_no),
        qty: line.qty,
        plant: line.plant.clone(),
        sloc: line.sloc.clone().unwrap_or_default(),
        batch_no: line.batch_no.clone().unwrap_or_default(),
        manufacture_date: erp_date(line.manufacture_date.unwrap_or(doc_date)),
    }
}

/// Transform a whole submission into the ERP batch payload.
#[must_use]
pub fn build_erp_payload(submission: &ReceiptSubmission) -> ErpBatchPayload {
    let doc_date = submission.doc_date();
    ErpBatchPayload {
        delivery_note: submission.delivery_note().to_owned(),
        doc_date: erp_date(doc_date),
        post_date: erp_date(submission.post_date()),
        lines: submission
            .lines()
            .iter()
            .map(|line| build_erp_line(line, doc_date))
            .collect(),
    }
}
