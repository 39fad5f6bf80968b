//! Goods-receipt submissions as accepted from the floor terminals.
//!
//! A [`ReceiptSubmissionDraft`] carries raw caller input. Converting it into a
//! [`ReceiptSubmission`] performs every structural check at once and reports
//! all offending fields together, keyed by their dotted path
//! (`items.0.qty`).

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::{Credential, MAX_PO_NO_LEN};

/// Date format used by terminals and clients (`31-01-2025`).
pub const DISPLAY_DATE_FORMAT: &str = "%d-%m-%Y";

/// Shortest tapped credential accepted at the envelope level.
pub const MIN_TAP_CREDENTIAL_LEN: usize = 10;

/// Smallest quantity a line may carry.
pub const MIN_LINE_QUANTITY: f64 = 0.01;

/// Longest delivery note the ledger stores.
pub const MAX_DELIVERY_NOTE_LEN: usize = 50;
/// Longest unpadded line number.
pub const MAX_LINE_NO_LEN: usize = 10;
/// Longest plant code.
pub const MAX_PLANT_LEN: usize = 10;
/// Longest storage location.
pub const MAX_SLOC_LEN: usize = 10;
/// Longest batch number.
pub const MAX_BATCH_NO_LEN: usize = 20;

/// Raw line item as submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptLineDraft {
    /// Purchase order number.
    pub po_no: String,
    /// Purchase order line number, unpadded.
    pub line_no: String,
    /// Received quantity; `None` when missing or not numeric.
    pub qty: Option<f64>,
    /// Receiving plant.
    pub plant: String,
    /// Storage location.
    pub sloc: Option<String>,
    /// Batch number.
    pub batch_no: Option<String>,
    /// Manufacture date in `DD-MM-YYYY`.
    pub manufacture_date: Option<String>,
}

/// Raw submission envelope as received from a terminal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptSubmissionDraft {
    /// Credential physically tapped to authorise the posting.
    pub credential: String,
    /// Delivery note number shared by every line.
    pub delivery_note: String,
    /// Document date in `DD-MM-YYYY`.
    pub doc_date: String,
    /// Posting date in `DD-MM-YYYY`.
    pub post_date: String,
    /// Line items.
    pub items: Vec<ReceiptLineDraft>,
}

/// Validated receipt line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    /// Purchase order number.
    pub po_no: String,
    /// Purchase order line number as submitted.
    pub line_no: String,
    /// Received quantity, at least [`MIN_LINE_QUANTITY`].
    pub qty: f64,
    /// Receiving plant.
    pub plant: String,
    /// Storage location, absent when blank.
    pub sloc: Option<String>,
    /// Batch number, absent when blank.
    pub batch_no: Option<String>,
    /// Manufacture date, absent when blank.
    pub manufacture_date: Option<NaiveDate>,
}

/// Validated goods-receipt submission.
///
/// ## Invariants
/// - at least one line;
/// - the tapped credential has at least [`MIN_TAP_CREDENTIAL_LEN`] characters;
/// - every line shares the envelope's delivery note and dates.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptSubmission {
    credential: Credential,
    delivery_note: String,
    doc_date: NaiveDate,
    post_date: NaiveDate,
    lines: Vec<ReceiptLine>,
}

impl ReceiptSubmission {
    /// Credential tapped for this posting.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Delivery note number.
    pub fn delivery_note(&self) -> &str {
        self.delivery_note.as_str()
    }

    /// Document date.
    pub fn doc_date(&self) -> NaiveDate {
        self.doc_date
    }

    /// Requested posting date.
    pub fn post_date(&self) -> NaiveDate {
        self.post_date
    }

    /// Submitted lines, never empty.
    pub fn lines(&self) -> &[ReceiptLine] {
        self.lines.as_slice()
    }
}

/// Field-level validation failures for a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("submission failed validation on {} field(s)", .errors.len())]
pub struct SubmissionValidationError {
    errors: BTreeMap<String, Vec<String>>,
}

impl SubmissionValidationError {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Messages keyed by dotted field path.
    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Whether any message was recorded for `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

/// Parse a `DD-MM-YYYY` display date.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use gr_backend::domain::parse_display_date;
///
/// assert_eq!(
///     parse_display_date("05-03-2025"),
///     NaiveDate::from_ymd_opt(2025, 3, 5)
/// );
/// assert!(parse_display_date("2025-03-05").is_none());
/// ```
#[must_use]
pub fn parse_display_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DISPLAY_DATE_FORMAT).ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

fn check_len(errors: &mut SubmissionValidationError, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(field, format!("{field} must be at most {max} characters"));
    }
}

fn require_text(
    errors: &mut SubmissionValidationError,
    field: &str,
    raw: &str,
    max: usize,
) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push(field, format!("{field} is required"));
    }
    check_len(errors, field, trimmed, max);
    trimmed.to_owned()
}

fn optional_text(
    errors: &mut SubmissionValidationError,
    field: &str,
    raw: Option<String>,
    max: usize,
) -> Option<String> {
    let value = non_blank(raw)?;
    check_len(errors, field, &value, max);
    Some(value)
}

fn require_date(
    errors: &mut SubmissionValidationError,
    field: &str,
    raw: &str,
) -> Option<NaiveDate> {
    if raw.trim().is_empty() {
        errors.push(field, format!("{field} is required"));
        return None;
    }
    let parsed = parse_display_date(raw);
    if parsed.is_none() {
        errors.push(field, format!("{field} must be a date in DD-MM-YYYY format"));
    }
    parsed
}

fn validate_credential(
    errors: &mut SubmissionValidationError,
    raw: &str,
) -> Option<Credential> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push("credential", "credential is required");
        return None;
    }
    if trimmed.chars().count() < MIN_TAP_CREDENTIAL_LEN {
        errors.push(
            "credential",
            format!("credential must be at least {MIN_TAP_CREDENTIAL_LEN} characters"),
        );
        return None;
    }
    match Credential::new(trimmed) {
        Ok(credential) => Some(credential),
        Err(err) => {
            errors.push("credential", err.to_string());
            None
        }
    }
}

fn validate_line(
    errors: &mut SubmissionValidationError,
    index: usize,
    draft: ReceiptLineDraft,
) -> Option<ReceiptLine> {
    let before = errors.errors.len();
    let field = |name: &str| format!("items.{index}.{name}");

    let po_no = require_text(errors, &field("po_no"), &draft.po_no, MAX_PO_NO_LEN);
    let line_no = require_text(errors, &field("line_no"), &draft.line_no, MAX_LINE_NO_LEN);
    let plant = require_text(errors, &field("plant"), &draft.plant, MAX_PLANT_LEN);
    let sloc = optional_text(errors, &field("sloc"), draft.sloc, MAX_SLOC_LEN);
    let batch_no = optional_text(errors, &field("batch_no"), draft.batch_no, MAX_BATCH_NO_LEN);
    let qty = match draft.qty {
        Some(qty) if qty.is_finite() && qty >= MIN_LINE_QUANTITY => qty,
        Some(_) => {
            errors.push(
                field("qty"),
                format!("{} must be at least {MIN_LINE_QUANTITY}", field("qty")),
            );
            0.0
        }
        None => {
            errors.push(field("qty"), format!("{} must be a number", field("qty")));
            0.0
        }
    };
    let manufacture_date = match non_blank(draft.manufacture_date) {
        Some(raw) => {
            let parsed = parse_display_date(&raw);
            if parsed.is_none() {
                errors.push(
                    field("manufacture_date"),
                    format!(
                        "{} must be a date in DD-MM-YYYY format",
                        field("manufacture_date")
                    ),
                );
            }
            parsed
        }
        None => None,
    };

    (errors.errors.len() == before).then(|| ReceiptLine {
        po_no,
        line_no,
        qty,
        plant,
        sloc,
        batch_no,
        manufacture_date,
    })
}

impl TryFrom<ReceiptSubmissionDraft> for ReceiptSubmission {
    type Error = SubmissionValidationError;

    fn try_from(draft: ReceiptSubmissionDraft) -> Result<Self, Self::Error> {
        let mut errors = SubmissionValidationError::default();

        let credential = validate_credential(&mut errors, &draft.credential);
        let delivery_note = require_text(
            &mut errors,
            "delivery_note",
            &draft.delivery_note,
            MAX_DELIVERY_NOTE_LEN,
        );
        let doc_date = require_date(&mut errors, "doc_date", &draft.doc_date);
        let post_date = require_date(&mut errors, "post_date", &draft.post_date);

        if draft.items.is_empty() {
            errors.push("items", "items must contain at least one line");
        }
        let lines: Vec<ReceiptLine> = draft
            .items
            .into_iter()
            .enumerate()
            .filter_map(|(index, line)| validate_line(&mut errors, index, line))
            .collect();

        match (credential, doc_date, post_date) {
            (Some(credential), Some(doc_date), Some(post_date)) => errors.into_result(|| Self {
                credential,
                delivery_note,
                doc_date,
                post_date,
                lines,
            }),
            _ => Err(errors),
        }
    }
}
