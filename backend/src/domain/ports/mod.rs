//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, `LoginService`,
//! `AccountAdministration`) are called by inbound adapters. Driven ports
//! (`*Repository`, `ErpGateway`, `PasswordHasher`) are implemented by
//! outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_administration;
mod account_repository;
mod activity_log_repository;
mod erp_gateway;
mod goods_receipt_command;
mod login_service;
mod password_hasher;
mod purchase_order_query;
mod receipt_history_query;
mod receipt_ledger_repository;

#[cfg(test)]
pub use account_administration::MockAccountAdministration;
pub use account_administration::{AccountAdministration, FixtureAccountAdministration};
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{
    AccountRepository, AccountRepositoryError, FixtureAccountRepository, StoredLogin,
};
#[cfg(test)]
pub use activity_log_repository::MockActivityLogRepository;
pub use activity_log_repository::{
    ActivityLogRepository, ActivityLogRepositoryError, FixtureActivityLogRepository,
};
#[cfg(test)]
pub use erp_gateway::MockErpGateway;
pub use erp_gateway::{ErpGateway, ErpGatewayError, FixtureErpGateway};
#[cfg(test)]
pub use goods_receipt_command::MockGoodsReceiptCommand;
pub use goods_receipt_command::{
    FixtureGoodsReceiptCommand, GoodsReceiptCommand, MalformedGoodsReceipt,
    PostGoodsReceiptRequest, PostedGoodsReceipt,
};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FixtureLoginService, LoginService};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use purchase_order_query::MockPurchaseOrderQuery;
pub use purchase_order_query::{
    FixturePurchaseOrderQuery, PurchaseOrderQuery, PurchaseOrderRequest, PurchaseOrderResponse,
};
#[cfg(test)]
pub use receipt_history_query::MockReceiptHistoryQuery;
pub use receipt_history_query::{
    DropdownValuesRequest, FixtureReceiptHistoryQuery, LineHistoryRequest,
    ReceiptDropdownValues, ReceiptHistoryQuery,
};
#[cfg(test)]
pub use receipt_ledger_repository::MockReceiptLedgerRepository;
pub use receipt_ledger_repository::{
    FixtureReceiptLedgerRepository, ReceiptLedgerRepository, ReceiptLedgerRepositoryError,
};
