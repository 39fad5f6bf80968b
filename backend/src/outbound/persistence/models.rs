//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{accounts, erp_activity_logs, good_receipts};

/// Row struct for reading from the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub position: Option<String>,
    pub department: Option<String>,
    pub email: String,
    pub status: String,
    pub credential: Option<String>,
}

/// Account row together with its password hash, read only for login.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountLoginRow {
    #[diesel(embed)]
    pub account: AccountRow,
    pub password_hash: String,
}

/// Insertable struct for creating account records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub user_id: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub full_name: &'a str,
    pub position: Option<&'a str>,
    pub department: Option<&'a str>,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub status: &'a str,
    pub credential: Option<&'a str>,
}

/// Changeset for descriptive account fields.
///
/// Options are written as-is so clearing a credential stores `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = accounts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AccountUpdate<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub full_name: &'a str,
    pub position: Option<&'a str>,
    pub department: Option<&'a str>,
    pub email: &'a str,
    pub status: &'a str,
    pub credential: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Goods receipt ledger models
// ---------------------------------------------------------------------------

/// Insertable pending ledger row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = good_receipts)]
pub(crate) struct NewGoodReceiptRow<'a> {
    pub id: Uuid,
    pub delivery_note: &'a str,
    pub receipt_date: NaiveDate,
    pub po_no: &'a str,
    pub line_no: &'a str,
    pub qty: f64,
    pub plant: &'a str,
    pub sloc: Option<&'a str>,
    pub batch_no: Option<&'a str>,
    pub manufacture_date: Option<NaiveDate>,
    pub posting_user_id: &'a str,
    pub posting_account_id: Uuid,
    pub session_email: &'a str,
    pub department: Option<&'a str>,
    pub logged_in_user_rfid: &'a str,
    pub posting_rfid: &'a str,
    pub success: bool,
    pub error_message: Option<&'a str>,
    pub erp_request: &'a serde_json::Value,
    pub erp_endpoint: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Terminal state written to every row of a batch.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = good_receipts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct GoodReceiptFinalization<'a> {
    pub success: bool,
    pub error_message: Option<&'a str>,
    pub material_doc_no: Option<&'a str>,
    pub doc_year: Option<&'a str>,
    pub posting_date: Option<NaiveDate>,
    pub erp_response: Option<&'a serde_json::Value>,
    pub response_time_ms: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

/// Posted ledger row as read by the history queries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = good_receipts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostedReceiptRow {
    pub receipt_date: NaiveDate,
    pub qty: f64,
    pub delivery_note: String,
    pub sloc: Option<String>,
    pub batch_no: Option<String>,
    pub material_doc_no: Option<String>,
    pub doc_year: Option<String>,
    pub plant: String,
    pub created_at: DateTime<Utc>,
    pub session_email: String,
    pub department: Option<String>,
    pub logged_in_user_rfid: String,
    pub posting_rfid: String,
}

// ---------------------------------------------------------------------------
// Activity log models
// ---------------------------------------------------------------------------

/// Insertable activity log entry.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = erp_activity_logs)]
pub(crate) struct NewActivityLogRow<'a> {
    pub id: Uuid,
    pub activity_type: &'a str,
    pub action: &'a str,
    pub user_id: Option<&'a str>,
    pub account_id: Option<Uuid>,
    pub user_email: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub full_name: Option<&'a str>,
    pub position: Option<&'a str>,
    pub department: Option<&'a str>,
    pub ip_address: Option<&'a str>,
    pub po_no: Option<&'a str>,
    pub line_no: Option<&'a str>,
    pub delivery_note: Option<&'a str>,
    pub material_doc_no: Option<&'a str>,
    pub plant: Option<&'a str>,
    pub request_payload: &'a serde_json::Value,
    pub response_data: Option<&'a serde_json::Value>,
    pub success: bool,
    pub status_code: Option<i32>,
    pub error_message: Option<&'a str>,
    pub response_time_ms: Option<i64>,
    pub erp_endpoint: Option<&'a str>,
    pub trace_id: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}
