//! Port for the goods-receipt ledger.

use async_trait::async_trait;

use crate::domain::{PostedReceipt, ReceiptBatch, ReceiptFinalization};

use super::define_port_error;

define_port_error! {
    /// Errors raised by receipt ledger adapters.
    pub enum ReceiptLedgerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "receipt ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "receipt ledger query failed: {message}",
    }
}

/// Port for writing pending rows, finalising them, and reading posted rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReceiptLedgerRepository: Send + Sync {
    /// Persist every pending row of `batch`, all or none.
    async fn create_pending(&self, batch: &ReceiptBatch) -> Result<(), ReceiptLedgerRepositoryError>;

    /// Move every row of `batch` to the same terminal state.
    ///
    /// Returns the number of rows updated.
    async fn finalize(
        &self,
        batch: &ReceiptBatch,
        finalization: &ReceiptFinalization,
    ) -> Result<usize, ReceiptLedgerRepositoryError>;

    /// Successful rows with a material document for one purchase order line,
    /// newest receipt date first, then newest creation.
    async fn history_for_line(
        &self,
        po_no: &str,
        line_no: &str,
    ) -> Result<Vec<PostedReceipt>, ReceiptLedgerRepositoryError>;

    /// Successful rows with a material document for a purchase order,
    /// optionally narrowed to one line.
    async fn posted_receipts(
        &self,
        po_no: &str,
        line_no: Option<String>,
    ) -> Result<Vec<PostedReceipt>, ReceiptLedgerRepositoryError>;
}

/// Fixture ledger that accepts writes and stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReceiptLedgerRepository;

#[async_trait]
impl ReceiptLedgerRepository for FixtureReceiptLedgerRepository {
    async fn create_pending(
        &self,
        _batch: &ReceiptBatch,
    ) -> Result<(), ReceiptLedgerRepositoryError> {
        Ok(())
    }

    async fn finalize(
        &self,
        batch: &ReceiptBatch,
        _finalization: &ReceiptFinalization,
    ) -> Result<usize, ReceiptLedgerRepositoryError> {
        Ok(batch.len())
    }

    async fn history_for_line(
        &self,
        _po_no: &str,
        _line_no: &str,
    ) -> Result<Vec<PostedReceipt>, ReceiptLedgerRepositoryError> {
        Ok(Vec::new())
    }

    async fn posted_receipts(
        &self,
        _po_no: &str,
        _line_no: Option<String>,
    ) -> Result<Vec<PostedReceipt>, ReceiptLedgerRepositoryError> {
        Ok(Vec::new())
    }
}
