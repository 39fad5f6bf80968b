//! Session cookie configuration and validation.
//!
//! Toggles arrive from the settings layer; this module only validates them
//! against the build mode and loads the signing key.

use actix_web::cookie::{Key, SameSite};
use std::path::PathBuf;
use tracing::warn;
use zeroize::Zeroize;

/// Default location of the session signing key.
pub const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
// `Key::derive_from` panics below this length.
const KEY_DERIVE_MIN_LEN: usize = 32;
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for bad toggles.
    Debug,
    /// Release builds require valid toggles and a real key.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gr_backend::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Raw session toggles as loaded from configuration.
#[derive(Clone, Debug)]
pub struct SessionToggles {
    /// File holding the signing key material.
    pub key_file: PathBuf,
    /// Mark cookies `Secure`.
    pub cookie_secure: bool,
    /// `Strict`, `Lax` or `None`; build-mode default when absent.
    pub same_site: Option<String>,
    /// Fall back to a generated key when the key file is unreadable.
    pub allow_ephemeral: bool,
}

impl Default for SessionToggles {
    fn default() -> Self {
        Self {
            key_file: PathBuf::from(SESSION_KEY_DEFAULT_PATH),
            cookie_secure: true,
            same_site: None,
            allow_ephemeral: false,
        }
    }
}

/// Validated session settings.
pub struct SessionSettings {
    /// Signing key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// The `SameSite` toggle is not recognised.
    #[error("invalid session SameSite value '{value}'; expected {expected}")]
    InvalidSameSite {
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` requires secure cookies in release builds.
    #[error("SameSite=None requires secure session cookies")]
    InsecureSameSiteNone,
}

/// Validate toggles and load the signing key.
///
/// # Examples
///
/// ```rust
/// use gr_backend::inbound::http::session_config::{
///     BuildMode, SessionToggles, session_settings,
/// };
///
/// let toggles = SessionToggles {
///     key_file: "/nonexistent/session_key".into(),
///     allow_ephemeral: true,
///     ..SessionToggles::default()
/// };
/// let settings = session_settings(&toggles, BuildMode::Release).unwrap();
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings(
    toggles: &SessionToggles,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let same_site = same_site(toggles, mode)?;
    let key = session_key(toggles, mode)?;
    Ok(SessionSettings {
        key,
        cookie_secure: toggles.cookie_secure,
        same_site,
    })
}

fn same_site(toggles: &SessionToggles, mode: BuildMode) -> Result<SameSite, SessionConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(value) = toggles.same_site.as_deref() else {
        return Ok(default_same_site);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" => {
            if !toggles.cookie_secure {
                if !mode.is_debug() {
                    return Err(SessionConfigError::InsecureSameSiteNone);
                }
                warn!("SameSite=None without secure cookies; browsers may reject the session");
            }
            Ok(SameSite::None)
        }
        _ if mode.is_debug() => {
            warn!(value = %value, "invalid session SameSite, using default");
            Ok(default_same_site)
        }
        _ => Err(SessionConfigError::InvalidSameSite {
            value: value.to_owned(),
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn session_key(toggles: &SessionToggles, mode: BuildMode) -> Result<Key, SessionConfigError> {
    let path = toggles.key_file.clone();
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            if length < KEY_DERIVE_MIN_LEN {
                bytes.zeroize();
                warn!(
                    path = %path.display(),
                    length,
                    "session key too short to derive from; using temporary key"
                );
                return Ok(Key::generate());
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || toggles.allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key; sessions will not survive a restart"
            );
            Ok(Key::generate())
        }
        Err(error) => Err(SessionConfigError::KeyRead {
            path,
            source: error,
        }),
    }
}
