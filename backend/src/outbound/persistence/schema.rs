//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`.
//! `diesel print-schema` against a migrated database regenerates them.

diesel::table! {
    /// Operator accounts.
    ///
    /// `user_id` is the external `OJSAIT…` identifier; `id` is the surrogate
    /// key referenced by receipt rows.
    accounts (id) {
        id -> Uuid,
        user_id -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        full_name -> Varchar,
        position -> Nullable<Varchar>,
        department -> Nullable<Varchar>,
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        /// `active` or `inactive`.
        status -> Varchar,
        /// Registered RFID credential, unique when present.
        credential -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Goods-receipt ledger, one row per submitted line.
    good_receipts (id) {
        id -> Uuid,
        delivery_note -> Varchar,
        receipt_date -> Date,
        po_no -> Varchar,
        line_no -> Varchar,
        qty -> Float8,
        plant -> Varchar,
        sloc -> Nullable<Varchar>,
        batch_no -> Nullable<Varchar>,
        manufacture_date -> Nullable<Date>,
        posting_user_id -> Varchar,
        posting_account_id -> Uuid,
        session_email -> Varchar,
        department -> Nullable<Varchar>,
        logged_in_user_rfid -> Varchar,
        posting_rfid -> Varchar,
        success -> Bool,
        /// `Processing...` while pending, the failure reason once failed.
        error_message -> Nullable<Text>,
        material_doc_no -> Nullable<Text>,
        doc_year -> Nullable<Text>,
        posting_date -> Nullable<Date>,
        erp_request -> Jsonb,
        erp_response -> Nullable<Jsonb>,
        erp_endpoint -> Text,
        response_time_ms -> Nullable<Int8>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only ERP activity trail.
    erp_activity_logs (id) {
        id -> Uuid,
        activity_type -> Varchar,
        action -> Varchar,
        user_id -> Nullable<Varchar>,
        account_id -> Nullable<Uuid>,
        user_email -> Nullable<Varchar>,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        full_name -> Nullable<Varchar>,
        position -> Nullable<Varchar>,
        department -> Nullable<Varchar>,
        ip_address -> Nullable<Varchar>,
        po_no -> Nullable<Text>,
        line_no -> Nullable<Text>,
        delivery_note -> Nullable<Text>,
        material_doc_no -> Nullable<Text>,
        plant -> Nullable<Text>,
        request_payload -> Jsonb,
        response_data -> Nullable<Jsonb>,
        success -> Bool,
        status_code -> Nullable<Int4>,
        error_message -> Nullable<Text>,
        response_time_ms -> Nullable<Int8>,
        erp_endpoint -> Nullable<Text>,
        trace_id -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(good_receipts -> accounts (posting_account_id));

diesel::allow_tables_to_appear_in_same_query!(accounts, good_receipts, erp_activity_logs);
