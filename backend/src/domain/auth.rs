//! Sign-in inputs for password and card-tap login.
//!
//! Handlers build these from raw payloads before calling the login port, so
//! blank values never reach the account store.

use zeroize::Zeroizing;

use super::{AccountValidationError, Credential};

/// Validation failures for sign-in payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Login name was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyLogin,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Tapped credential was unusable.
    #[error("credential is invalid: {0}")]
    Credential(#[from] AccountValidationError),
}

/// Validated password login.
///
/// ## Invariants
/// - `login` is trimmed and non-empty; it is matched against the account id
///   or the email address.
/// - `password` is non-empty and keeps caller whitespace.
///
/// # Examples
/// ```
/// use gr_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" OJSAIT001 ", "secret").unwrap();
/// assert_eq!(creds.login(), "OJSAIT001");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    login: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw login and password inputs.
    pub fn try_from_parts(login: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = login.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyLogin);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            login: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Account id or email used for the lookup.
    pub fn login(&self) -> &str {
        self.login.as_str()
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Parse a tapped credential for card login.
pub fn tap_login(raw: &str) -> Result<Credential, LoginValidationError> {
    Ok(Credential::new(raw)?)
}
