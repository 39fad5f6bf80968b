//! PostgreSQL-backed `ReceiptLedgerRepository` implementation using Diesel ORM.
//!
//! A batch is written with one multi-row `INSERT` so either every pending row
//! exists or none does. Finalisation is one `UPDATE` over the batch's ids, so
//! rows from the same submission cannot disagree on their terminal state.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{ReceiptLedgerRepository, ReceiptLedgerRepositoryError};
use crate::domain::{
    PENDING_MESSAGE, PendingReceiptLine, PostedReceipt, ReceiptBatch, ReceiptFinalization,
    ReceiptOutcome,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{GoodReceiptFinalization, NewGoodReceiptRow, PostedReceiptRow};
use super::pool::{DbPool, PoolError};
use super::schema::good_receipts;

/// Diesel-backed implementation of the receipt ledger port.
#[derive(Clone)]
pub struct DieselReceiptLedgerRepository {
    pool: DbPool,
}

impl DieselReceiptLedgerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReceiptLedgerRepositoryError {
    map_basic_pool_error(error, |message| {
        ReceiptLedgerRepositoryError::connection(message)
    })
}

fn map_diesel_error(error: diesel::result::Error) -> ReceiptLedgerRepositoryError {
    map_basic_diesel_error(
        error,
        ReceiptLedgerRepositoryError::query,
        ReceiptLedgerRepositoryError::connection,
    )
}

fn pending_row(line: &PendingReceiptLine) -> NewGoodReceiptRow<'_> {
    NewGoodReceiptRow {
        id: line.id,
        delivery_note: &line.delivery_note,
        receipt_date: line.receipt_date,
        po_no: &line.po_no,
        line_no: &line.line_no,
        qty: line.qty,
        plant: &line.plant,
        sloc: line.sloc.as_deref(),
        batch_no: line.batch_no.as_deref(),
        manufacture_date: line.manufacture_date,
        posting_user_id: &line.posting_user_id,
        posting_account_id: line.posting_account_id,
        session_email: &line.session_email,
        department: line.department.as_deref(),
        logged_in_user_rfid: &line.logged_in_user_rfid,
        posting_rfid: &line.posting_rfid,
        success: false,
        error_message: Some(PENDING_MESSAGE),
        erp_request: &line.erp_request,
        erp_endpoint: &line.erp_endpoint,
        created_at: line.created_at,
        updated_at: line.created_at,
    }
}

fn finalization_changeset(finalization: &ReceiptFinalization) -> GoodReceiptFinalization<'_> {
    let (material_doc_no, doc_year, posting_date) = match &finalization.outcome {
        ReceiptOutcome::Succeeded {
            material_doc_no,
            doc_year,
            posting_date,
        } => (
            material_doc_no.as_deref(),
            doc_year.as_deref(),
            Some(*posting_date),
        ),
        ReceiptOutcome::Failed { .. } => (None, None, None),
    };

    GoodReceiptFinalization {
        success: finalization.is_success(),
        error_message: finalization.error_message(),
        material_doc_no,
        doc_year,
        posting_date,
        erp_response: finalization.response.as_ref(),
        response_time_ms: Some(finalization.elapsed_ms),
        updated_at: finalization.finalized_at,
    }
}

fn row_to_posted(row: PostedReceiptRow) -> PostedReceipt {
    PostedReceipt {
        receipt_date: row.receipt_date,
        qty: row.qty,
        delivery_note: row.delivery_note,
        sloc: row.sloc,
        batch_no: row.batch_no,
        material_doc_no: row.material_doc_no.unwrap_or_default(),
        doc_year: row.doc_year,
        plant: row.plant,
        created_at: row.created_at,
        session_email: Some(row.session_email),
        department: row.department,
        logged_in_user_rfid: Some(row.logged_in_user_rfid),
        posting_rfid: Some(row.posting_rfid),
    }
}

#[async_trait]
impl ReceiptLedgerRepository for DieselReceiptLedgerRepository {
    async fn create_pending(
        &self,
        batch: &ReceiptBatch,
    ) -> Result<(), ReceiptLedgerRepositoryError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<NewGoodReceiptRow<'_>> = batch.lines().iter().map(pending_row).collect();

        diesel::insert_into(good_receipts::table)
            .values(&rows)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn finalize(
        &self,
        batch: &ReceiptBatch,
        finalization: &ReceiptFinalization,
    ) -> Result<usize, ReceiptLedgerRepositoryError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(good_receipts::table)
            .filter(good_receipts::id.eq_any(batch.ids()))
            .set(&finalization_changeset(finalization))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated != batch.len() {
            warn!(
                expected = batch.len(),
                updated, "receipt finalisation touched an unexpected number of rows"
            );
        }
        Ok(updated)
    }

    async fn history_for_line(
        &self,
        po_no: &str,
        line_no: &str,
    ) -> Result<Vec<PostedReceipt>, ReceiptLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PostedReceiptRow> = good_receipts::table
            .filter(good_receipts::po_no.eq(po_no))
            .filter(good_receipts::line_no.eq(line_no))
            .filter(good_receipts::success.eq(true))
            .filter(good_receipts::material_doc_no.is_not_null())
            .select(PostedReceiptRow::as_select())
            .order_by((
                good_receipts::receipt_date.desc(),
                good_receipts::created_at.desc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_posted).collect())
    }

    async fn posted_receipts(
        &self,
        po_no: &str,
        line_no: Option<String>,
    ) -> Result<Vec<PostedReceipt>, ReceiptLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = good_receipts::table
            .filter(good_receipts::po_no.eq(po_no))
            .filter(good_receipts::success.eq(true))
            .filter(good_receipts::material_doc_no.is_not_null())
            .select(PostedReceiptRow::as_select())
            .into_boxed();
        if let Some(line_no) = line_no {
            query = query.filter(good_receipts::line_no.eq(line_no));
        }

        let rows: Vec<PostedReceiptRow> = query
            .order_by(good_receipts::receipt_date.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_posted).collect())
    }
}
