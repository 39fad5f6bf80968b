//! Driving port for account administration.
//!
//! Every operation takes the caller's session account; implementations reject
//! callers outside the administering department.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{Account, AccountId, AccountPatch, Error, NewAccountForm};

/// Domain use-case port for account administration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountAdministration: Send + Sync {
    /// Every account ordered by external id.
    async fn list_accounts(&self, actor: Option<AccountId>) -> Result<Vec<Account>, Error>;

    /// Create an account under the next free id.
    async fn create_account(
        &self,
        actor: Option<AccountId>,
        form: NewAccountForm,
    ) -> Result<Account, Error>;

    /// Apply a partial update.
    async fn update_account(
        &self,
        actor: Option<AccountId>,
        user_id: AccountId,
        patch: AccountPatch,
    ) -> Result<Account, Error>;

    /// Replace an account's password.
    async fn change_password(
        &self,
        actor: Option<AccountId>,
        user_id: AccountId,
        new_password: Zeroizing<String>,
    ) -> Result<Account, Error>;

    /// Mark an account inactive.
    async fn deactivate_account(
        &self,
        actor: Option<AccountId>,
        user_id: AccountId,
    ) -> Result<Account, Error>;
}

/// Fixture administration that denies every caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountAdministration;

fn denied() -> Error {
    Error::forbidden("Access denied. IT department only.")
}

#[async_trait]
impl AccountAdministration for FixtureAccountAdministration {
    async fn list_accounts(&self, _actor: Option<AccountId>) -> Result<Vec<Account>, Error> {
        Err(denied())
    }

    async fn create_account(
        &self,
        _actor: Option<AccountId>,
        _form: NewAccountForm,
    ) -> Result<Account, Error> {
        Err(denied())
    }

    async fn update_account(
        &self,
        _actor: Option<AccountId>,
        _user_id: AccountId,
        _patch: AccountPatch,
    ) -> Result<Account, Error> {
        Err(denied())
    }

    async fn change_password(
        &self,
        _actor: Option<AccountId>,
        _user_id: AccountId,
        _new_password: Zeroizing<String>,
    ) -> Result<Account, Error> {
        Err(denied())
    }

    async fn deactivate_account(
        &self,
        _actor: Option<AccountId>,
        _user_id: AccountId,
    ) -> Result<Account, Error> {
        Err(denied())
    }
}
