//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.
//!
//! Accounts are addressed externally by `user_id` (`OJSAIT…`), which is
//! allocated from the `account_number_seq` sequence. Unique violations on
//! email, credential or id surface as `Duplicate` so the admin service can
//! report the offending field.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{AccountRepository, AccountRepositoryError, StoredLogin};
use crate::domain::{Account, AccountId, AccountStatus, Credential};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AccountLoginRow, AccountRow, AccountUpdate, NewAccountRow};
use super::pool::{DbPool, PoolError};
use super::schema::accounts;

diesel::define_sql_function! {
    /// PostgreSQL `nextval(regclass)`.
    fn nextval(sequence: diesel::sql_types::Text) -> diesel::sql_types::BigInt;
}

const ACCOUNT_SEQUENCE: &str = "account_number_seq";

/// Diesel-backed implementation of the account repository port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    map_basic_pool_error(error, |message| AccountRepositoryError::connection(message))
}

/// Name the account column behind a unique violation.
fn duplicate_field(message: &str, constraint_name: Option<&str>) -> &'static str {
    let haystack = constraint_name.unwrap_or(message).to_ascii_lowercase();
    if haystack.contains("email") {
        "email"
    } else if haystack.contains("credential") {
        "credential"
    } else {
        "user_id"
    }
}

/// Map Diesel errors to account repository errors.
fn map_diesel_error(error: diesel::result::Error) -> AccountRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let field = duplicate_field(info.message(), info.constraint_name());
            debug!(field, "account unique constraint violated");
            AccountRepositoryError::duplicate(field)
        }
        other => map_basic_diesel_error(
            other,
            AccountRepositoryError::query,
            AccountRepositoryError::connection,
        ),
    }
}

/// Convert a database row into a validated domain account.
fn row_to_account(row: AccountRow) -> Result<Account, AccountRepositoryError> {
    let AccountRow {
        id,
        user_id,
        first_name,
        last_name,
        full_name,
        position,
        department,
        email,
        status,
        credential,
    } = row;

    let invalid = |err: crate::domain::AccountValidationError| {
        AccountRepositoryError::query(format!("invalid account row {id}: {err}"))
    };

    Ok(Account {
        internal_id: id,
        user_id: AccountId::new(user_id).map_err(invalid)?,
        first_name,
        last_name,
        full_name,
        position,
        department,
        email,
        status: AccountStatus::parse(&status).map_err(invalid)?,
        credential: credential.map(Credential::new).transpose().map_err(invalid)?,
    })
}

fn account_update(account: &Account) -> AccountUpdate<'_> {
    AccountUpdate {
        first_name: &account.first_name,
        last_name: &account.last_name,
        full_name: &account.full_name,
        position: account.position.as_deref(),
        department: account.department.as_deref(),
        email: &account.email,
        status: account.status.as_str(),
        credential: account.credential.as_ref().map(Credential::as_str),
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AccountRow> = accounts::table
            .filter(accounts::user_id.eq(id.as_ref()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_account).transpose()
    }

    async fn find_by_credential(
        &self,
        credential: &Credential,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AccountRow> = accounts::table
            .filter(accounts::credential.eq(credential.as_str()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_account).transpose()
    }

    async fn find_login(&self, login: &str) -> Result<Option<StoredLogin>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AccountLoginRow> = accounts::table
            .filter(accounts::user_id.eq(login).or(accounts::email.eq(login)))
            .select(AccountLoginRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| {
            Ok(StoredLogin {
                account: row_to_account(row.account)?,
                password_hash: row.password_hash,
            })
        })
        .transpose()
    }

    async fn list(&self) -> Result<Vec<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AccountRow> = accounts::table
            .select(AccountRow::as_select())
            .order_by(accounts::user_id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_account).collect()
    }

    async fn next_account_id(&self) -> Result<AccountId, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let sequence: i64 = diesel::select(nextval(ACCOUNT_SEQUENCE))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(AccountId::from_sequence(sequence))
    }

    async fn insert(
        &self,
        account: &Account,
        password_hash: &str,
    ) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewAccountRow {
            id: account.internal_id,
            user_id: account.user_id.as_ref(),
            first_name: &account.first_name,
            last_name: &account.last_name,
            full_name: &account.full_name,
            position: account.position.as_deref(),
            department: account.department.as_deref(),
            email: &account.email,
            password_hash,
            status: account.status.as_str(),
            credential: account.credential.as_ref().map(Credential::as_str),
        };

        diesel::insert_into(accounts::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(accounts::table)
            .filter(accounts::user_id.eq(account.user_id.as_ref()))
            .set(&account_update(account))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(AccountRepositoryError::query("account not found for update"));
        }
        Ok(())
    }

    async fn set_password(
        &self,
        id: &AccountId,
        password_hash: &str,
    ) -> Result<bool, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(accounts::table)
            .filter(accounts::user_id.eq(id.as_ref()))
            .set((
                accounts::password_hash.eq(password_hash),
                accounts::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn set_status(
        &self,
        id: &AccountId,
        status: AccountStatus,
    ) -> Result<bool, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(accounts::table)
            .filter(accounts::user_id.eq(id.as_ref()))
            .set((
                accounts::status.eq(status.as_str()),
                accounts::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }
}
