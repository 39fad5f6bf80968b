//! Port for the append-only ERP activity log.

use async_trait::async_trait;

use crate::domain::ActivityRecord;

use super::define_port_error;

define_port_error! {
    /// Errors raised by activity log adapters.
    pub enum ActivityLogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "activity log connection failed: {message}",
        /// Insert failed during execution.
        Query { message: String } =>
            "activity log write failed: {message}",
    }
}

/// Port for appending activity records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Append one record.
    async fn append(&self, record: &ActivityRecord) -> Result<(), ActivityLogRepositoryError>;
}

/// Fixture log that discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureActivityLogRepository;

#[async_trait]
impl ActivityLogRepository for FixtureActivityLogRepository {
    async fn append(&self, _record: &ActivityRecord) -> Result<(), ActivityLogRepositoryError> {
        Ok(())
    }
}
