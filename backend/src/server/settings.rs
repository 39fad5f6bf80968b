//! Service settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `GR_*` environment variables, or a config
//! file. They are converted here into the explicit structs each component is
//! constructed with; nothing below this layer reads the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use gr_backend::inbound::http::session_config::{SESSION_KEY_DEFAULT_PATH, SessionToggles};
use gr_backend::outbound::erp::ErpConnection;
use gr_backend::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ERP_TIMEOUT_SECS: u64 = 30;

/// Errors raised while turning settings into component configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A required setting was not provided.
    #[error("missing required setting {key}")]
    Missing { key: &'static str },
    /// The bind address is not `host:port`.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// The ERP base URL could not be parsed.
    #[error("invalid ERP base URL '{value}': {source}")]
    ErpUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Runtime settings for the goods-receipt service.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GR")]
pub struct ServerSettings {
    /// Listen address, `host:port`.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Fall back to a generated session key when the file is unreadable.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Mark session cookies `Secure`.
    #[ortho_config(default = true)]
    pub session_cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub session_same_site: Option<String>,
    /// Scheme and host of the ERP.
    pub erp_base_url: Option<String>,
    /// ERP basic-auth user.
    pub erp_username: Option<String>,
    /// ERP basic-auth password.
    pub erp_password: Option<String>,
    /// SAP client number.
    pub erp_client: Option<String>,
    /// Timeout for one ERP round-trip, in seconds.
    pub erp_timeout_secs: Option<u64>,
    /// Skip ERP TLS certificate validation.
    #[ortho_config(default = false)]
    pub erp_accept_invalid_certs: bool,
}

impl std::fmt::Debug for ServerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSettings")
            .field("bind_addr", &self.bind_addr)
            .field("db_max_connections", &self.db_max_connections)
            .field("session_key_file", &self.session_key_file)
            .field("session_allow_ephemeral", &self.session_allow_ephemeral)
            .field("session_cookie_secure", &self.session_cookie_secure)
            .field("session_same_site", &self.session_same_site)
            .field("erp_base_url", &self.erp_base_url)
            .field("erp_username", &self.erp_username)
            .field("erp_client", &self.erp_client)
            .field("erp_timeout_secs", &self.erp_timeout_secs)
            .field("erp_accept_invalid_certs", &self.erp_accept_invalid_certs)
            .finish_non_exhaustive()
    }
}

fn required<'a>(value: Option<&'a String>, key: &'static str) -> Result<&'a str, SettingsError> {
    value
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .ok_or(SettingsError::Missing { key })
}

impl ServerSettings {
    /// Socket address to bind, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Pool configuration for the database.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = required(self.database_url.as_ref(), "GR_DATABASE_URL")?;
        Ok(PoolConfig::new(url).with_max_size(
            self.db_max_connections
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
                .max(1),
        ))
    }

    /// Database URL used for migrations.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        required(self.database_url.as_ref(), "GR_DATABASE_URL")
    }

    /// Raw session toggles for validation against the build mode.
    pub fn session_toggles(&self) -> SessionToggles {
        SessionToggles {
            key_file: self
                .session_key_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH)),
            cookie_secure: self.session_cookie_secure,
            same_site: self.session_same_site.clone(),
            allow_ephemeral: self.session_allow_ephemeral,
        }
    }

    /// Connection settings for the ERP gateway.
    pub fn erp_connection(&self) -> Result<ErpConnection, SettingsError> {
        let raw_url = required(self.erp_base_url.as_ref(), "GR_ERP_BASE_URL")?;
        let base_url = Url::parse(raw_url).map_err(|source| SettingsError::ErpUrl {
            value: raw_url.to_owned(),
            source,
        })?;
        Ok(ErpConnection {
            base_url,
            username: required(self.erp_username.as_ref(), "GR_ERP_USERNAME")?.to_owned(),
            password: Zeroizing::new(
                required(self.erp_password.as_ref(), "GR_ERP_PASSWORD")?.to_owned(),
            ),
            client: required(self.erp_client.as_ref(), "GR_ERP_CLIENT")?.to_owned(),
            timeout: Duration::from_secs(
                self.erp_timeout_secs
                    .unwrap_or(DEFAULT_ERP_TIMEOUT_SECS)
                    .max(1),
            ),
            accept_invalid_certs: self.erp_accept_invalid_certs,
        })
    }
}
