//! Port abstraction for operator account persistence.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, AccountStatus, Credential};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// A unique column already holds the value.
        Duplicate { field: String } => "account {field} is already registered",
    }
}

/// Account plus the stored password hash, used only for login.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredLogin {
    /// Account matching the login name.
    pub account: Account,
    /// Encoded password hash.
    pub password_hash: String,
}

/// Port for reading and writing operator accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by its external id.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError>;

    /// Find the account owning a physical credential.
    async fn find_by_credential(
        &self,
        credential: &Credential,
    ) -> Result<Option<Account>, AccountRepositoryError>;

    /// Find an account by external id or email, with its password hash.
    async fn find_login(&self, login: &str) -> Result<Option<StoredLogin>, AccountRepositoryError>;

    /// List every account ordered by external id.
    async fn list(&self) -> Result<Vec<Account>, AccountRepositoryError>;

    /// Allocate the next external account id.
    async fn next_account_id(&self) -> Result<AccountId, AccountRepositoryError>;

    /// Insert a new account.
    async fn insert(
        &self,
        account: &Account,
        password_hash: &str,
    ) -> Result<(), AccountRepositoryError>;

    /// Overwrite the descriptive fields of an existing account.
    async fn update(&self, account: &Account) -> Result<(), AccountRepositoryError>;

    /// Replace the password hash; returns `false` when the account is unknown.
    async fn set_password(
        &self,
        id: &AccountId,
        password_hash: &str,
    ) -> Result<bool, AccountRepositoryError>;

    /// Change the lifecycle status; returns `false` when the account is unknown.
    async fn set_status(
        &self,
        id: &AccountId,
        status: AccountStatus,
    ) -> Result<bool, AccountRepositoryError>;
}

/// Fixture implementation for tests that never touch accounts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountRepository;

#[async_trait]
impl AccountRepository for FixtureAccountRepository {
    async fn find_by_id(&self, _id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(None)
    }

    async fn find_by_credential(
        &self,
        _credential: &Credential,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(None)
    }

    async fn find_login(
        &self,
        _login: &str,
    ) -> Result<Option<StoredLogin>, AccountRepositoryError> {
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<Account>, AccountRepositoryError> {
        Ok(Vec::new())
    }

    async fn next_account_id(&self) -> Result<AccountId, AccountRepositoryError> {
        Ok(AccountId::from_sequence(1))
    }

    async fn insert(
        &self,
        _account: &Account,
        _password_hash: &str,
    ) -> Result<(), AccountRepositoryError> {
        Ok(())
    }

    async fn update(&self, _account: &Account) -> Result<(), AccountRepositoryError> {
        Ok(())
    }

    async fn set_password(
        &self,
        _id: &AccountId,
        _password_hash: &str,
    ) -> Result<bool, AccountRepositoryError> {
        Ok(false)
    }

    async fn set_status(
        &self,
        _id: &AccountId,
        _status: AccountStatus,
    ) -> Result<bool, AccountRepositoryError> {
        Ok(false)
    }
}
