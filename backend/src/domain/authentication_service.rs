//! Password and card-tap sign-in over the account store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::identity::{IdentityError, IdentityVerifier, map_account_repository_error};
use super::ports::{AccountRepository, LoginService, PasswordHasher};
use super::{Account, AccountId, Credential, Error, LoginCredentials};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Sign-in service implementing [`LoginService`].
pub struct AuthenticationService<R: ?Sized, H: ?Sized> {
    accounts: Arc<R>,
    verifier: IdentityVerifier<R>,
    hasher: Arc<H>,
}

impl<R, H> AuthenticationService<R, H>
where
    R: AccountRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    /// Wire the service to the account store and password hasher.
    pub fn new(accounts: Arc<R>, hasher: Arc<H>) -> Self {
        Self {
            verifier: IdentityVerifier::new(Arc::clone(&accounts)),
            accounts,
            hasher,
        }
    }
}

#[async_trait]
impl<R, H> LoginService for AuthenticationService<R, H>
where
    R: AccountRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Account, Error> {
        let stored = self
            .accounts
            .find_login(credentials.login())
            .await
            .map_err(map_account_repository_error)?;
        let Some(stored) = stored else {
            debug!(login = credentials.login(), "login for unknown account");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(|err| {
                warn!(user_id = %stored.account.user_id, error = %err, "stored password hash rejected");
                Error::unauthorized(INVALID_CREDENTIALS)
            })?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        if !stored.account.is_active() {
            return Err(IdentityError::CredentialInactive.into());
        }
        Ok(stored.account)
    }

    async fn authenticate_tap(&self, credential: &Credential) -> Result<Account, Error> {
        Ok(self.verifier.verify_credential(credential).await?)
    }

    async fn principal(&self, session_user: Option<AccountId>) -> Result<Account, Error> {
        Ok(self.verifier.resolve_session(session_user.as_ref()).await?)
    }
}
