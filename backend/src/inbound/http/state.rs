//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountAdministration, FixtureAccountAdministration, FixtureGoodsReceiptCommand,
    FixtureLoginService, FixturePurchaseOrderQuery, FixtureReceiptHistoryQuery,
    GoodsReceiptCommand, LoginService, PurchaseOrderQuery, ReceiptHistoryQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub goods_receipts: Arc<dyn GoodsReceiptCommand>,
    pub purchase_orders: Arc<dyn PurchaseOrderQuery>,
    pub receipt_history: Arc<dyn ReceiptHistoryQuery>,
    pub accounts: Arc<dyn AccountAdministration>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            login: Arc::new(FixtureLoginService),
            goods_receipts: Arc::new(FixtureGoodsReceiptCommand),
            purchase_orders: Arc::new(FixturePurchaseOrderQuery),
            receipt_history: Arc::new(FixtureReceiptHistoryQuery),
            accounts: Arc::new(FixtureAccountAdministration),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub goods_receipts: Arc<dyn GoodsReceiptCommand>,
    pub purchase_orders: Arc<dyn PurchaseOrderQuery>,
    pub receipt_history: Arc<dyn ReceiptHistoryQuery>,
    pub accounts: Arc<dyn AccountAdministration>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use gr_backend::domain::ports::FixtureLoginService;
    /// use gr_backend::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let ports = HttpStatePorts {
    ///     login: Arc::new(FixtureLoginService),
    ///     ..HttpStatePorts::default()
    /// };
    /// let state = HttpState::new(ports);
    /// let _login = state.login.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            goods_receipts,
            purchase_orders,
            receipt_history,
            accounts,
        } = ports;
        Self {
            login,
            goods_receipts,
            purchase_orders,
            receipt_history,
            accounts,
        }
    }
}
