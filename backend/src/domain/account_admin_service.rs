//! Account administration, restricted to the IT department.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::identity::{map_account_repository_error, resolve_principal};
use super::ports::{
    AccountAdministration, AccountRepository, AccountRepositoryError, PasswordHasher,
};
use super::{
    Account, AccountFormError, AccountId, AccountPatch, AccountStatus, Error, NewAccount,
    NewAccountForm, validate_password,
};

/// Message returned to callers outside the administering department.
pub const ACCESS_DENIED_MESSAGE: &str = "Access denied. IT department only.";

fn form_error(errors: &AccountFormError) -> Error {
    Error::unprocessable("Validation failed").with_details(json!({ "errors": errors.errors() }))
}

fn store_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Duplicate { field } => {
            let message = format!("The {field} has already been taken.");
            form_error(&AccountFormError::single(&field, message))
        }
        other => map_account_repository_error(other),
    }
}

fn user_not_found() -> Error {
    Error::not_found("User not found")
}

/// Administration service implementing [`AccountAdministration`].
pub struct AccountAdminService<R: ?Sized, H: ?Sized> {
    accounts: Arc<R>,
    hasher: Arc<H>,
}

impl<R, H> AccountAdminService<R, H>
where
    R: AccountRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    /// Wire the service to the account store and password hasher.
    pub fn new(accounts: Arc<R>, hasher: Arc<H>) -> Self {
        Self { accounts, hasher }
    }

    async fn administrator(&self, actor: Option<AccountId>) -> Result<Account, Error> {
        let account = resolve_principal(self.accounts.as_ref(), actor.as_ref()).await?;
        if account.is_administrator() {
            Ok(account)
        } else {
            warn!(
                user_id = %account.user_id,
                department = account.department.as_deref().unwrap_or("N/A"),
                "account administration denied"
            );
            Err(Error::forbidden(ACCESS_DENIED_MESSAGE))
        }
    }

    async fn existing(&self, user_id: &AccountId) -> Result<Account, Error> {
        self.accounts
            .find_by_id(user_id)
            .await
            .map_err(store_error)?
            .ok_or_else(user_not_found)
    }

    fn hash(&self, password: &str) -> Result<String, Error> {
        self.hasher
            .hash(password)
            .map_err(|err| Error::internal(err.to_string()))
    }
}

#[async_trait]
impl<R, H> AccountAdministration for AccountAdminService<R, H>
where
    R: AccountRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    async fn list_accounts(&self, actor: Option<AccountId>) -> Result<Vec<Account>, Error> {
        self.administrator(actor).await?;
        self.accounts.list().await.map_err(store_error)
    }

    async fn create_account(
        &self,
        actor: Option<AccountId>,
        form: NewAccountForm,
    ) -> Result<Account, Error> {
        let admin = self.administrator(actor).await?;
        let draft = NewAccount::try_from(form).map_err(|errors| form_error(&errors))?;
        let password_hash = self.hash(draft.password.as_str())?;
        let user_id = self.accounts.next_account_id().await.map_err(store_error)?;
        let account = draft.into_account(user_id, Uuid::new_v4());
        self.accounts
            .insert(&account, &password_hash)
            .await
            .map_err(store_error)?;
        info!(created = %account.user_id, by = %admin.user_id, "account created");
        Ok(account)
    }

    async fn update_account(
        &self,
        actor: Option<AccountId>,
        user_id: AccountId,
        patch: AccountPatch,
    ) -> Result<Account, Error> {
        let admin = self.administrator(actor).await?;
        let mut account = self.existing(&user_id).await?;
        patch
            .apply(&mut account)
            .map_err(|errors| form_error(&errors))?;
        self.accounts.update(&account).await.map_err(store_error)?;
        info!(updated = %account.user_id, by = %admin.user_id, "account updated");
        Ok(account)
    }

    async fn change_password(
        &self,
        actor: Option<AccountId>,
        user_id: AccountId,
        new_password: Zeroizing<String>,
    ) -> Result<Account, Error> {
        let admin = self.administrator(actor).await?;
        validate_password("new_password", Some(new_password.as_str()))
            .map_err(|errors| form_error(&errors))?;
        let account = self.existing(&user_id).await?;
        let password_hash = self.hash(new_password.as_str())?;
        if !self
            .accounts
            .set_password(&user_id, &password_hash)
            .await
            .map_err(store_error)?
        {
            return Err(user_not_found());
        }
        info!(user_id = %user_id, by = %admin.user_id, "account password changed");
        Ok(account)
    }

    async fn deactivate_account(
        &self,
        actor: Option<AccountId>,
        user_id: AccountId,
    ) -> Result<Account, Error> {
        let admin = self.administrator(actor).await?;
        let mut account = self.existing(&user_id).await?;
        if !self
            .accounts
            .set_status(&user_id, AccountStatus::Inactive)
            .await
            .map_err(store_error)?
        {
            return Err(user_not_found());
        }
        account.status = AccountStatus::Inactive;
        info!(user_id = %user_id, by = %admin.user_id, "account deactivated");
        Ok(account)
    }
}
