//! Verification of the session principal and the tapped RFID credential.
//!
//! Posting a goods receipt needs two identities: the account behind the
//! calling session and the account owning the physically tapped card. They
//! are checked independently and may belong to different people.

use std::sync::Arc;

use tracing::{info, warn};

use super::ports::{AccountRepository, AccountRepositoryError};
use super::{Account, AccountId, Credential, Error, PostingProvenance};

/// Identity rejections, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// No principal is attached to the request.
    #[error("No authenticated user found")]
    NoAuthenticatedSession,
    /// No account owns the tapped credential.
    #[error("RFID card not registered in system")]
    CredentialNotFound,
    /// The owning account is not active.
    #[error("User account is not active")]
    CredentialInactive,
    /// The session account has no credential of its own.
    #[error("Your account does not have an RFID registered. Please contact administrator.")]
    SessionMissingCredential,
}

impl IdentityError {
    /// Status code surfaced to callers.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::NoAuthenticatedSession => 401,
            Self::CredentialNotFound | Self::CredentialInactive => 403,
            Self::SessionMissingCredential => 400,
        }
    }
}

impl From<IdentityError> for Error {
    fn from(value: IdentityError) -> Self {
        let message = value.to_string();
        match value {
            IdentityError::NoAuthenticatedSession => Error::unauthorized(message),
            IdentityError::CredentialNotFound | IdentityError::CredentialInactive => {
                Error::forbidden(message)
            }
            IdentityError::SessionMissingCredential => Error::invalid_request(message),
        }
    }
}

/// Failure to verify identities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// An identity check rejected the request.
    #[error(transparent)]
    Rejected(#[from] IdentityError),
    /// The account store could not be consulted.
    #[error(transparent)]
    Repository(#[from] AccountRepositoryError),
}

/// Map an account store failure onto the domain error taxonomy.
pub(crate) fn map_account_repository_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            Error::internal(format!("account repository error: {message}"))
        }
        AccountRepositoryError::Duplicate { field } => {
            Error::unprocessable(format!("The {field} has already been taken."))
        }
    }
}

impl From<VerificationError> for Error {
    fn from(value: VerificationError) -> Self {
        match value {
            VerificationError::Rejected(rejection) => rejection.into(),
            VerificationError::Repository(error) => map_account_repository_error(error),
        }
    }
}

/// Resolve the session principal; unknown and inactive accounts count as no
/// session.
pub async fn resolve_principal<R>(
    accounts: &R,
    session_user: Option<&AccountId>,
) -> Result<Account, VerificationError>
where
    R: AccountRepository + ?Sized,
{
    let id = session_user.ok_or(IdentityError::NoAuthenticatedSession)?;
    match accounts.find_by_id(id).await? {
        Some(account) if account.is_active() => Ok(account),
        _ => Err(IdentityError::NoAuthenticatedSession.into()),
    }
}

/// Checks session and tapped identities against the account store.
pub struct IdentityVerifier<R: ?Sized> {
    accounts: Arc<R>,
}

impl<R: ?Sized> Clone for IdentityVerifier<R> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
        }
    }
}

impl<R> IdentityVerifier<R>
where
    R: AccountRepository + ?Sized,
{
    /// Create a verifier over the account store.
    pub fn new(accounts: Arc<R>) -> Self {
        Self { accounts }
    }

    /// Resolve the account owning `credential`, which must be active.
    pub async fn verify_credential(
        &self,
        credential: &Credential,
    ) -> Result<Account, VerificationError> {
        let account = self
            .accounts
            .find_by_credential(credential)
            .await?
            .ok_or(IdentityError::CredentialNotFound)?;
        if !account.is_active() {
            return Err(IdentityError::CredentialInactive.into());
        }
        Ok(account)
    }

    /// Resolve the session principal.
    pub async fn resolve_session(
        &self,
        session_user: Option<&AccountId>,
    ) -> Result<Account, VerificationError> {
        resolve_principal(self.accounts.as_ref(), session_user).await
    }

    /// Run every check needed before a posting, in order: session, tapped
    /// credential, then the session's own credential.
    ///
    /// A tapped credential different from the session's is allowed and only
    /// logged.
    pub async fn verify_posting(
        &self,
        session: Account,
        tapped_credential: &Credential,
    ) -> Result<PostingProvenance, VerificationError> {
        let tapped = match self.verify_credential(tapped_credential).await {
            Ok(account) => account,
            Err(VerificationError::Rejected(reason)) => {
                warn!(
                    tapped_rfid = %tapped_credential,
                    reason = %reason,
                    logged_in_user = %session.user_id,
                    "goods receipt blocked by tapped credential"
                );
                return Err(reason.into());
            }
            Err(other) => return Err(other),
        };

        let Some(session_credential) = session.credential.clone() else {
            warn!(
                user_id = %session.user_id,
                email = %session.email,
                "session account has no registered credential"
            );
            return Err(IdentityError::SessionMissingCredential.into());
        };

        let provenance = PostingProvenance {
            session,
            tapped,
            session_credential: session_credential.as_str().to_owned(),
            tapped_credential: tapped_credential.as_str().to_owned(),
        };
        if !provenance.is_same_person() {
            info!(
                logged_in_user = %provenance.session.user_id,
                tapped_user = %provenance.tapped.user_id,
                "delegated posting: session and tapped credential differ"
            );
        }
        Ok(provenance)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::AccountStatus;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockAccountRepository;
    use rstest::rstest;
    use uuid::Uuid;

    fn account(user_id: &str, credential: Option<&str>, status: AccountStatus) -> Account {
        Account {
            internal_id: Uuid::new_v4(),
            user_id: AccountId::new(user_id).expect("account id"),
            first_name: "Budi".to_owned(),
            last_name: "Santoso".to_owned(),
            full_name: "Budi Santoso".to_owned(),
            position: None,
            department: Some("Warehouse".to_owned()),
            email: format!("{}@example.com", user_id.to_lowercase()),
            status,
            credential: credential.map(|raw| Credential::new(raw).expect("credential")),
        }
    }

    fn tap(raw: &str) -> Credential {
        Credential::new(raw).expect("credential")
    }

    fn verifier_with(tapped: Option<Account>) -> IdentityVerifier<MockAccountRepository> {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_credential()
            .return_once(move |_| Ok(tapped));
        IdentityVerifier::new(Arc::new(repo))
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_credential_is_rejected() {
        let verifier = verifier_with(None);
        let session = account("OJSAIT001", Some("0000000001"), AccountStatus::Active);

        let err = verifier
            .verify_posting(session, &tap("0000000009"))
            .await
            .expect_err("unknown credential");

        assert_eq!(err, VerificationError::Rejected(IdentityError::CredentialNotFound));
    }

    #[rstest]
    #[tokio::test]
    async fn inactive_credential_owner_is_rejected() {
        let verifier = verifier_with(Some(account(
            "OJSAIT002",
            Some("0000000002"),
            AccountStatus::Inactive,
        )));
        let session = account("OJSAIT001", Some("0000000001"), AccountStatus::Active);

        let err = verifier
            .verify_posting(session, &tap("0000000002"))
            .await
            .expect_err("inactive owner");

        assert_eq!(err, VerificationError::Rejected(IdentityError::CredentialInactive));
    }

    #[rstest]
    #[tokio::test]
    async fn session_without_credential_is_a_client_error() {
        let verifier = verifier_with(Some(account(
            "OJSAIT002",
            Some("0000000002"),
            AccountStatus::Active,
        )));
        let session = account("OJSAIT001", None, AccountStatus::Active);

        let err = verifier
            .verify_posting(session, &tap("0000000002"))
            .await
            .expect_err("session lacks credential");

        assert_eq!(
            err,
            VerificationError::Rejected(IdentityError::SessionMissingCredential)
        );
        assert_eq!(IdentityError::SessionMissingCredential.http_status(), 400);
    }

    #[rstest]
    #[tokio::test]
    async fn delegated_posting_is_allowed() {
        let verifier = verifier_with(Some(account(
            "OJSAIT002",
            Some("0000000002"),
            AccountStatus::Active,
        )));
        let session = account("OJSAIT001", Some("0000000001"), AccountStatus::Active);

        let provenance = verifier
            .verify_posting(session, &tap("0000000002"))
            .await
            .expect("delegation allowed");

        assert!(!provenance.is_same_person());
        assert_eq!(provenance.session_credential, "0000000001");
        assert_eq!(provenance.tapped_credential, "0000000002");
        assert_eq!(provenance.tapped.user_id.as_ref(), "OJSAIT002");
    }

    #[rstest]
    #[tokio::test]
    async fn missing_or_inactive_session_counts_as_unauthenticated() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_id().return_once(|_| {
            Ok(Some(account("OJSAIT001", Some("0000000001"), AccountStatus::Inactive)))
        });
        let verifier = IdentityVerifier::new(Arc::new(repo));

        let none = verifier.resolve_session(None).await.expect_err("no session");
        let inactive = verifier
            .resolve_session(Some(&AccountId::new("OJSAIT001").expect("id")))
            .await
            .expect_err("inactive session");

        for err in [none, inactive] {
            assert_eq!(
                err,
                VerificationError::Rejected(IdentityError::NoAuthenticatedSession)
            );
        }
    }

    #[rstest]
    #[case(IdentityError::NoAuthenticatedSession, ErrorCode::Unauthorized, 401)]
    #[case(IdentityError::CredentialNotFound, ErrorCode::Forbidden, 403)]
    #[case(IdentityError::CredentialInactive, ErrorCode::Forbidden, 403)]
    #[case(IdentityError::SessionMissingCredential, ErrorCode::InvalidRequest, 400)]
    fn rejections_map_to_error_codes(
        #[case] rejection: IdentityError,
        #[case] code: ErrorCode,
        #[case] status: u16,
    ) {
        let error: Error = rejection.into();
        assert_eq!(error.code(), code);
        assert_eq!(rejection.http_status(), status);
    }

    #[rstest]
    fn connection_failures_become_service_unavailable() {
        let error: Error =
            VerificationError::Repository(AccountRepositoryError::connection("refused")).into();
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
