//! Account representation shared by the auth and administration endpoints.

use serde::Serialize;

use crate::domain::Account;

/// Account as returned to clients. Password hashes never leave the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct AccountResponse {
    /// External account id, e.g. `OJSAIT001`.
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub position: Option<String>,
    pub department: Option<String>,
    pub email: String,
    /// `active` or `inactive`.
    pub status: String,
    /// Registered RFID credential.
    pub credential: Option<String>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            user_id: account.user_id.to_string(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            full_name: account.full_name.clone(),
            position: account.position.clone(),
            department: account.department.clone(),
            email: account.email.clone(),
            status: account.status.as_str().to_owned(),
            credential: account
                .credential
                .as_ref()
                .map(|credential| credential.as_str().to_owned()),
        }
    }
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self::from(&account)
    }
}
