//! Driving port for sign-in and principal lookup.
//!
//! Inbound adapters call this port to authenticate without importing the
//! account store, so handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{
    Account, AccountId, AccountStatus, Credential, Error, LoginCredentials, compose_full_name,
};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate a password login and return the active account.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Account, Error>;

    /// Validate a card tap and return the active account owning it.
    async fn authenticate_tap(&self, credential: &Credential) -> Result<Account, Error>;

    /// Load the active account behind a session.
    async fn principal(&self, session_user: Option<AccountId>) -> Result<Account, Error>;
}

/// In-memory authenticator for development and handler tests.
///
/// `OJSAIT001` / `password` and the card `0000000001` authenticate as one
/// fixed IT account.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

const FIXTURE_ACCOUNT_ID: &str = "OJSAIT001";
const FIXTURE_CREDENTIAL: &str = "0000000001";

fn fixture_account() -> Result<Account, Error> {
    let user_id = AccountId::new(FIXTURE_ACCOUNT_ID)
        .map_err(|err| Error::internal(format!("invalid fixture account id: {err}")))?;
    let credential = Credential::new(FIXTURE_CREDENTIAL)
        .map_err(|err| Error::internal(format!("invalid fixture credential: {err}")))?;
    Ok(Account {
        internal_id: uuid::Uuid::nil(),
        user_id,
        first_name: "Fixture".to_owned(),
        last_name: "Operator".to_owned(),
        full_name: compose_full_name("Fixture", "Operator"),
        position: Some("Administrator".to_owned()),
        department: Some("IT".to_owned()),
        email: "operator@example.com".to_owned(),
        status: AccountStatus::Active,
        credential: Some(credential),
    })
}

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Account, Error> {
        if credentials.login() == FIXTURE_ACCOUNT_ID && credentials.password() == "password" {
            fixture_account()
        } else {
            Err(Error::unauthorized("Invalid credentials"))
        }
    }

    async fn authenticate_tap(&self, credential: &Credential) -> Result<Account, Error> {
        if credential.as_str() == FIXTURE_CREDENTIAL {
            fixture_account()
        } else {
            Err(Error::unauthorized("RFID card not registered in system"))
        }
    }

    async fn principal(&self, session_user: Option<AccountId>) -> Result<Account, Error> {
        match session_user {
            Some(id) if id.as_ref() == FIXTURE_ACCOUNT_ID => fixture_account(),
            _ => Err(Error::unauthorized("No authenticated user found")),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("OJSAIT001", "password", true)]
    #[case("OJSAIT001", "wrong", false)]
    #[case("OJSAIT002", "password", false)]
    #[tokio::test]
    async fn fixture_login_service_accepts_only_fixture_account(
        #[case] login: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let service = FixtureLoginService;
        let creds = LoginCredentials::try_from_parts(login, password).expect("credentials shape");
        match (should_succeed, service.authenticate(&creds).await) {
            (true, Ok(account)) => assert_eq!(account.user_id.as_ref(), FIXTURE_ACCOUNT_ID),
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(account)) => panic!("expected failure, got {}", account.user_id),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_principal_requires_session() {
        let err = FixtureLoginService
            .principal(None)
            .await
            .expect_err("no session");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
