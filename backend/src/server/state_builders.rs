//! Builders wiring driven adapters into the HTTP state ports.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use gr_backend::domain::{
    AccountAdminService, AuthenticationService, GoodsReceiptService, PurchaseOrderService,
    ReceiptHistoryService,
};
use gr_backend::inbound::http::state::{HttpState, HttpStatePorts};
use gr_backend::outbound::erp::{ErpConnection, HttpErpGateway};
use gr_backend::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselActivityLogRepository, DieselReceiptLedgerRepository,
};
use gr_backend::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// Use adapter-backed ports when every dependency is configured, otherwise
/// fall back to the fixture ports.
fn ports_or_fixtures<D>(
    dependencies: Option<D>,
    make_ports: impl FnOnce(D) -> std::io::Result<HttpStatePorts>,
) -> std::io::Result<HttpStatePorts> {
    match dependencies {
        Some(dependencies) => make_ports(dependencies),
        None => {
            warn!("database or ERP not configured; serving fixture ports");
            Ok(HttpStatePorts::default())
        }
    }
}

/// Wire every service to the Diesel repositories, the ERP gateway and the
/// argon2 hasher.
fn adapter_ports(pool: &DbPool, erp: ErpConnection) -> std::io::Result<HttpStatePorts> {
    let accounts = Arc::new(DieselAccountRepository::new(pool.clone()));
    let ledger = Arc::new(DieselReceiptLedgerRepository::new(pool.clone()));
    let activity_log = Arc::new(DieselActivityLogRepository::new(pool.clone()));
    let gateway = Arc::new(
        HttpErpGateway::new(erp)
            .map_err(|err| std::io::Error::other(format!("build ERP client: {err}")))?,
    );
    let hasher = Arc::new(Argon2PasswordHasher::new());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    Ok(HttpStatePorts {
        login: Arc::new(AuthenticationService::new(
            Arc::clone(&accounts),
            Arc::clone(&hasher),
        )),
        goods_receipts: Arc::new(GoodsReceiptService::new(
            Arc::clone(&accounts),
            Arc::clone(&ledger),
            Arc::clone(&gateway),
            Arc::clone(&activity_log),
            Arc::clone(&clock),
        )),
        purchase_orders: Arc::new(PurchaseOrderService::new(
            Arc::clone(&accounts),
            Arc::clone(&gateway),
            Arc::clone(&activity_log),
            Arc::clone(&clock),
        )),
        receipt_history: Arc::new(ReceiptHistoryService::new(
            Arc::clone(&accounts),
            ledger,
            activity_log,
            clock,
        )),
        accounts: Arc::new(AccountAdminService::new(accounts, hasher)),
    })
}

/// Build the shared HTTP state from the server configuration.
///
/// # Errors
/// Returns [`std::io::Error`] when the ERP HTTP client cannot be built.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let dependencies = config.db_pool.as_ref().zip(config.erp.clone());
    let ports = ports_or_fixtures(dependencies, |(pool, erp)| adapter_ports(pool, erp))?;
    Ok(web::Data::new(HttpState::new(ports)))
}
