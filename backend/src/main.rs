#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]
//! Backend entry-point: loads settings, migrates the database and serves the
//! goods-receipt REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use gr_backend::inbound::http::health::HealthState;
use gr_backend::inbound::http::session_config::{BuildMode, session_settings};
use gr_backend::outbound::persistence::{DbPool, run_pending_migrations};

use server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os()).wrap_err("load settings")?;
    let session = session_settings(&settings.session_toggles(), BuildMode::from_debug_assertions())
        .wrap_err("session configuration")?;
    let bind_addr = settings.bind_addr()?;

    run_pending_migrations(settings.database_url()?)
        .await
        .wrap_err("apply database migrations")?;
    let pool = DbPool::new(settings.pool_config()?)
        .await
        .wrap_err("build database pool")?;

    let config = ServerConfig::new(session, bind_addr)
        .with_db_pool(pool)
        .with_erp(settings.erp_connection()?);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("start HTTP server")?;
    info!(%bind_addr, "goods-receipt API listening");
    server.await.wrap_err("HTTP server stopped")?;
    Ok(())
}
