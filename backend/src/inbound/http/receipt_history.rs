//! Read-only handlers over posted goods receipts.
//!
//! ```text
//! GET /api/v1/sap/gr-history-by-item?po_no=4500000001&line_no=10
//! GET /api/v1/sap/gr-dropdown-values?po_no=4500000001
//! ```

use actix_web::{HttpRequest, HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::PostedReceipt;
use crate::domain::ports::{DropdownValuesRequest, LineHistoryRequest, ReceiptDropdownValues};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, caller_ip, require_text};

const PO_NO: FieldName = FieldName::new("po_no");
const LINE_NO: FieldName = FieldName::new("line_no");

const HISTORY_MESSAGE: &str = "GR history retrieved successfully";
const DROPDOWN_MESSAGE: &str = "GR dropdown values retrieved successfully";

/// Query string naming one purchase order line.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LineHistoryParams {
    pub po_no: Option<String>,
    /// Purchase order line, unpadded.
    #[serde(alias = "item_po")]
    pub line_no: Option<String>,
}

/// Query string naming a purchase order and optionally one line.
#[derive(Debug, Deserialize, IntoParams)]
pub struct DropdownParams {
    pub po_no: Option<String>,
    #[serde(alias = "item_po")]
    pub line_no: Option<String>,
}

/// One posted receipt as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptHistoryEntry {
    /// Posting date, `YYYY-MM-DD`.
    pub date_gr: String,
    pub qty: f64,
    pub dn_no: String,
    pub sloc: Option<String>,
    /// Empty when the line carried no batch.
    pub batch_no: String,
    pub mat_doc: String,
    pub doc_year: Option<String>,
    pub plant: String,
    /// `YYYY-MM-DD HH:MM:SS`.
    pub created_at: String,
    /// Email of the signed-in operator, or `Unknown`.
    pub created_by: String,
    pub department: Option<String>,
    pub logged_in_rfid: Option<String>,
    pub posted_by_rfid: Option<String>,
}

impl From<PostedReceipt> for ReceiptHistoryEntry {
    fn from(value: PostedReceipt) -> Self {
        Self {
            date_gr: value.receipt_date.format("%Y-%m-%d").to_string(),
            qty: value.qty,
            dn_no: value.delivery_note,
            sloc: value.sloc,
            batch_no: value.batch_no.unwrap_or_default(),
            mat_doc: value.material_doc_no,
            doc_year: value.doc_year,
            plant: value.plant,
            created_at: value.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            created_by: value.session_email.unwrap_or_else(|| "Unknown".to_owned()),
            department: value.department,
            logged_in_rfid: value.logged_in_user_rfid,
            posted_by_rfid: value.posting_rfid,
        }
    }
}

/// Filter values offered by the history screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct DropdownValuesResponse {
    pub dn_no: Vec<String>,
    /// `YYYY-MM-DD`.
    pub date_gr: Vec<String>,
    pub batch_no: Vec<String>,
    pub sloc: Vec<String>,
}

impl From<ReceiptDropdownValues> for DropdownValuesResponse {
    fn from(value: ReceiptDropdownValues) -> Self {
        Self {
            dn_no: value.delivery_notes,
            date_gr: value
                .receipt_dates
                .iter()
                .map(|date| date.format("%Y-%m-%d").to_string())
                .collect(),
            batch_no: value.batch_nos,
            sloc: value.slocs,
        }
    }
}

/// Posted receipts for one purchase order line, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/sap/gr-history-by-item",
    params(LineHistoryParams),
    responses(
        (status = 200, description = "Receipt history", body = [ReceiptHistoryEntry]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 422, description = "Validation failed", body = ErrorSchema),
        (status = 503, description = "Ledger unavailable", body = ErrorSchema)
    ),
    tags = ["receipt-history"],
    operation_id = "getReceiptHistoryByLine"
)]
#[get("/gr-history-by-item")]
pub async fn history_by_line(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    params: web::Query<LineHistoryParams>,
) -> ApiResult<HttpResponse> {
    let LineHistoryParams { po_no, line_no } = params.into_inner();
    let po_no = require_text(po_no, PO_NO)?;
    let line_no = require_text(line_no, LINE_NO)?;

    let receipts = state
        .receipt_history
        .history_by_line(LineHistoryRequest {
            session_user: session.account_id()?,
            caller_ip: caller_ip(&req),
            po_no,
            line_no,
        })
        .await?;

    let total_records = receipts.len();
    let entries: Vec<ReceiptHistoryEntry> =
        receipts.into_iter().map(ReceiptHistoryEntry::from).collect();
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(
            Envelope::ok(HISTORY_MESSAGE, entries)
                .with_meta(json!({ "total_records": total_records })),
        ))
}

/// Distinct filter values for a purchase order.
#[utoipa::path(
    get,
    path = "/api/v1/sap/gr-dropdown-values",
    params(DropdownParams),
    responses(
        (status = 200, description = "Filter values", body = DropdownValuesResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 422, description = "Validation failed", body = ErrorSchema),
        (status = 503, description = "Ledger unavailable", body = ErrorSchema)
    ),
    tags = ["receipt-history"],
    operation_id = "getReceiptDropdownValues"
)]
#[get("/gr-dropdown-values")]
pub async fn dropdown_values(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    params: web::Query<DropdownParams>,
) -> ApiResult<HttpResponse> {
    let DropdownParams { po_no, line_no } = params.into_inner();
    let po_no = require_text(po_no, PO_NO)?;
    let line_no = line_no
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty());

    let values = state
        .receipt_history
        .dropdown_values(DropdownValuesRequest {
            session_user: session.account_id()?,
            caller_ip: caller_ip(&req),
            po_no,
            line_no,
        })
        .await?;

    let total_records = values.total_records;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(
            Envelope::ok(DROPDOWN_MESSAGE, DropdownValuesResponse::from(values))
                .with_meta(json!({ "total_records": total_records })),
        ))
}
