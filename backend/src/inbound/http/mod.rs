//! HTTP inbound adapter exposing REST endpoints.

pub mod account_dto;
pub mod auth;
pub mod cache_control;
pub mod envelope;
pub mod error;
pub mod good_receipts;
pub mod health;
pub mod purchase_orders;
pub mod receipt_history;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
