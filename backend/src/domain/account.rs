//! Operator accounts and the physical credentials bound to them.
//!
//! An [`Account`] is both the session principal and the identity behind a
//! tapped RFID card. Descriptive attributes are plain strings; identifiers,
//! credentials and status are validated newtypes.

use std::fmt;

use uuid::Uuid;

/// Department whose members may administer accounts.
pub const ADMIN_DEPARTMENT: &str = "IT";

/// Prefix shared by every generated account id.
pub const ACCOUNT_ID_PREFIX: &str = "OJSAIT";

/// Validation errors for account value objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountValidationError {
    /// The account id was blank.
    #[error("account id must not be empty")]
    EmptyAccountId,
    /// The credential was blank.
    #[error("credential must not be empty")]
    EmptyCredential,
    /// The credential exceeded the stored width.
    #[error("credential must be at most {max} characters")]
    CredentialTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The status was not `active` or `inactive`.
    #[error("status must be active or inactive")]
    UnknownStatus,
}

/// Stable external account identifier such as `OJSAIT007`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(String);

impl AccountId {
    /// Validate and wrap an account id.
    pub fn new(raw: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::EmptyAccountId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Build the id for the `sequence`-th account, zero-padded to three digits.
    ///
    /// # Examples
    /// ```
    /// use gr_backend::domain::AccountId;
    ///
    /// assert_eq!(AccountId::from_sequence(7).as_ref(), "OJSAIT007");
    /// assert_eq!(AccountId::from_sequence(1234).as_ref(), "OJSAIT1234");
    /// ```
    #[must_use]
    pub fn from_sequence(sequence: i64) -> Self {
        Self(format!("{ACCOUNT_ID_PREFIX}{sequence:03}"))
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Physical RFID credential identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// Maximum stored credential width.
    pub const MAX_LEN: usize = 50;

    /// Validate and wrap a credential string.
    pub fn new(raw: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::EmptyCredential);
        }
        if trimmed.chars().count() > Self::MAX_LEN {
            return Err(AccountValidationError::CredentialTooLong { max: Self::MAX_LEN });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the raw credential.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Credential {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether an account may sign in and authorise postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountStatus {
    /// Account is in use.
    #[default]
    Active,
    /// Account is retired; kept for history.
    Inactive,
}

impl AccountStatus {
    /// Stored lowercase representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Parse a stored status, case-insensitively.
    pub fn parse(raw: &str) -> Result<Self, AccountValidationError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(AccountValidationError::UnknownStatus),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator account as loaded from the account store.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Surrogate row identifier.
    pub internal_id: Uuid,
    /// External account id.
    pub user_id: AccountId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Display name, `first last`.
    pub full_name: String,
    /// Job title.
    pub position: Option<String>,
    /// Owning department.
    pub department: Option<String>,
    /// Unique email address.
    pub email: String,
    /// Lifecycle status.
    pub status: AccountStatus,
    /// Registered RFID credential, if any.
    pub credential: Option<Credential>,
}

impl Account {
    /// Only active accounts may sign in or authorise postings.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.status, AccountStatus::Active)
    }

    /// Whether this account belongs to the administering department.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        self.department
            .as_deref()
            .is_some_and(|dept| dept.trim().eq_ignore_ascii_case(ADMIN_DEPARTMENT))
    }
}

/// Join given and family names the way account display names are stored.
#[must_use]
pub fn compose_full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.trim(), last_name.trim())
        .trim()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn account(department: Option<&str>, status: AccountStatus) -> Account {
        Account {
            internal_id: Uuid::nil(),
            user_id: AccountId::from_sequence(1),
            first_name: "Rina".to_owned(),
            last_name: "Saputra".to_owned(),
            full_name: "Rina Saputra".to_owned(),
            position: None,
            department: department.map(str::to_owned),
            email: "rina@example.test".to_owned(),
            status,
            credential: None,
        }
    }

    #[rstest]
    #[case(1, "OJSAIT001")]
    #[case(42, "OJSAIT042")]
    #[case(999, "OJSAIT999")]
    #[case(1000, "OJSAIT1000")]
    fn account_ids_are_zero_padded(#[case] sequence: i64, #[case] expected: &str) {
        assert_eq!(AccountId::from_sequence(sequence).as_ref(), expected);
    }

    #[rstest]
    #[case("ACTIVE", AccountStatus::Active)]
    #[case(" inactive ", AccountStatus::Inactive)]
    fn status_parsing_ignores_case(#[case] raw: &str, #[case] expected: AccountStatus) {
        assert_eq!(AccountStatus::parse(raw), Ok(expected));
    }

    #[rstest]
    fn unknown_status_is_rejected() {
        assert_eq!(
            AccountStatus::parse("suspended"),
            Err(AccountValidationError::UnknownStatus)
        );
    }

    #[rstest]
    #[case("", AccountValidationError::EmptyCredential)]
    #[case("   ", AccountValidationError::EmptyCredential)]
    fn blank_credentials_are_rejected(#[case] raw: &str, #[case] expected: AccountValidationError) {
        assert_eq!(Credential::new(raw), Err(expected));
    }

    #[rstest]
    fn oversized_credentials_are_rejected() {
        let raw = "9".repeat(Credential::MAX_LEN + 1);
        assert!(matches!(
            Credential::new(raw),
            Err(AccountValidationError::CredentialTooLong { .. })
        ));
    }

    #[rstest]
    #[case(Some("IT"), true)]
    #[case(Some("it "), true)]
    #[case(Some("Warehouse"), false)]
    #[case(None, false)]
    fn administrators_belong_to_it(#[case] department: Option<&str>, #[case] expected: bool) {
        assert_eq!(
            account(department, AccountStatus::Active).is_administrator(),
            expected
        );
    }

    #[rstest]
    fn inactive_accounts_are_not_active() {
        assert!(!account(None, AccountStatus::Inactive).is_active());
    }

    #[rstest]
    fn full_name_joins_trimmed_parts() {
        assert_eq!(compose_full_name(" Rina", "Saputra "), "Rina Saputra");
    }
}
