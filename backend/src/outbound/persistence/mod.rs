//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the account, receipt
//! ledger and activity log ports backed by PostgreSQL via Diesel with async
//! support through `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Strongly typed errors**: Connection failures map to the ports'
//!   `Connection` variants and everything else to `Query`.
//!
//! # Example
//!
//! ```ignore
//! use gr_backend::outbound::persistence::{DbPool, DieselAccountRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/gr")).await?;
//! let accounts = DieselAccountRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_activity_log_repository;
mod diesel_basic_error_mapping;
mod diesel_receipt_ledger_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_activity_log_repository::DieselActivityLogRepository;
pub use diesel_receipt_ledger_repository::DieselReceiptLedgerRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
