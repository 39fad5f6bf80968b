//! Account administration forms and their field rules.
//!
//! Forms are validated field by field and every failure is reported at once,
//! keyed by the field name the client sent.

use std::collections::BTreeMap;

use email_address::EmailAddress;
use zeroize::Zeroizing;

use super::{Account, AccountId, AccountStatus, Credential, compose_full_name};

/// Longest accepted given or family name.
pub const MAX_NAME_LEN: usize = 50;
/// Longest accepted position or department.
pub const MAX_LABEL_LEN: usize = 100;
/// Longest accepted email address.
pub const MAX_EMAIL_LEN: usize = 100;
/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Field-level validation failures for account forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("account form failed validation on {} field(s)", .errors.len())]
pub struct AccountFormError {
    errors: BTreeMap<String, Vec<String>>,
}

impl AccountFormError {
    fn push(&mut self, field: &str, message: String) {
        self.errors.entry(field.to_owned()).or_default().push(message);
    }

    /// Single-field error, used for uniqueness conflicts.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message.into());
        errors
    }

    /// Messages keyed by field.
    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

/// Raw input for a new account.
#[derive(Debug, Clone, Default)]
pub struct NewAccountForm {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Job title.
    pub position: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Initial password.
    pub password: Option<Zeroizing<String>>,
    /// RFID credential.
    pub credential: Option<String>,
    /// `active` or `inactive`.
    pub status: Option<String>,
}

/// Partial update; absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Job title.
    pub position: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// RFID credential; `Some(None)` clears it.
    pub credential: Option<Option<String>>,
    /// `active` or `inactive`.
    pub status: Option<String>,
}

/// Validated new-account input, minus the id and password hash.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Job title.
    pub position: String,
    /// Department.
    pub department: String,
    /// Email address.
    pub email: String,
    /// Plaintext password, zeroed on drop.
    pub password: Zeroizing<String>,
    /// RFID credential.
    pub credential: Option<Credential>,
    /// Initial status.
    pub status: AccountStatus,
}

impl NewAccount {
    /// Materialise the account under a freshly allocated id.
    #[must_use]
    pub fn into_account(self, user_id: AccountId, internal_id: uuid::Uuid) -> Account {
        Account {
            internal_id,
            full_name: compose_full_name(&self.first_name, &self.last_name),
            user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            position: Some(self.position),
            department: Some(self.department),
            email: self.email,
            status: self.status,
            credential: self.credential,
        }
    }
}

fn required_text(
    errors: &mut AccountFormError,
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Option<String> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        errors.push(field, format!("The {field} field is required."));
        return None;
    }
    if trimmed.chars().count() > max {
        errors.push(
            field,
            format!("The {field} may not be greater than {max} characters."),
        );
        return None;
    }
    Some(trimmed.to_owned())
}

fn email(errors: &mut AccountFormError, value: Option<&str>) -> Option<String> {
    let address = required_text(errors, "email", value, MAX_EMAIL_LEN)?;
    if !EmailAddress::is_valid(&address) {
        errors.push("email", "The email must be a valid email address.".to_owned());
        return None;
    }
    Some(address)
}

fn credential(errors: &mut AccountFormError, value: Option<&str>) -> Option<Credential> {
    let trimmed = value.map(str::trim).filter(|raw| !raw.is_empty())?;
    match Credential::new(trimmed) {
        Ok(credential) => Some(credential),
        Err(_) => {
            errors.push(
                "credential",
                format!(
                    "The credential may not be greater than {} characters.",
                    Credential::MAX_LEN
                ),
            );
            None
        }
    }
}

fn status(errors: &mut AccountFormError, value: Option<&str>) -> Option<AccountStatus> {
    let raw = value?;
    match raw.trim() {
        "active" => Some(AccountStatus::Active),
        "inactive" => Some(AccountStatus::Inactive),
        _ => {
            errors.push("status", "The selected status is invalid.".to_owned());
            None
        }
    }
}

/// Check a password against the length rule.
pub fn validate_password(field: &str, password: Option<&str>) -> Result<(), AccountFormError> {
    let mut errors = AccountFormError::default();
    match password {
        None | Some("") => errors.push(field, format!("The {field} field is required.")),
        Some(raw) if raw.chars().count() < MIN_PASSWORD_LEN => errors.push(
            field,
            format!("The {field} must be at least {MIN_PASSWORD_LEN} characters."),
        ),
        Some(_) => {}
    }
    errors.into_result(|| ())
}

impl TryFrom<NewAccountForm> for NewAccount {
    type Error = AccountFormError;

    fn try_from(form: NewAccountForm) -> Result<Self, Self::Error> {
        let mut errors = AccountFormError::default();
        let first_name = required_text(&mut errors, "first_name", form.first_name.as_deref(), MAX_NAME_LEN);
        let last_name = required_text(&mut errors, "last_name", form.last_name.as_deref(), MAX_NAME_LEN);
        let position = required_text(&mut errors, "position", form.position.as_deref(), MAX_LABEL_LEN);
        let department =
            required_text(&mut errors, "department", form.department.as_deref(), MAX_LABEL_LEN);
        let email = email(&mut errors, form.email.as_deref());
        if let Err(password_errors) =
            validate_password("password", form.password.as_ref().map(|p| p.as_str()))
        {
            errors.errors.extend(password_errors.errors);
        }
        let credential = credential(&mut errors, form.credential.as_deref());
        let status = status(&mut errors, form.status.as_deref()).unwrap_or_default();

        match (first_name, last_name, position, department, email, form.password) {
            (Some(first_name), Some(last_name), Some(position), Some(department), Some(email), Some(password))
                if errors.errors.is_empty() =>
            {
                Ok(Self {
                    first_name,
                    last_name,
                    position,
                    department,
                    email,
                    password,
                    credential,
                    status,
                })
            }
            _ => Err(errors),
        }
    }
}

impl AccountPatch {
    /// Apply the patch to `account`, recomputing the display name when either
    /// name changes.
    pub fn apply(self, account: &mut Account) -> Result<(), AccountFormError> {
        let mut errors = AccountFormError::default();

        let first_name = self
            .first_name
            .map(|raw| required_text(&mut errors, "first_name", Some(&raw), MAX_NAME_LEN));
        let last_name = self
            .last_name
            .map(|raw| required_text(&mut errors, "last_name", Some(&raw), MAX_NAME_LEN));
        let position = self
            .position
            .map(|raw| required_text(&mut errors, "position", Some(&raw), MAX_LABEL_LEN));
        let department = self
            .department
            .map(|raw| required_text(&mut errors, "department", Some(&raw), MAX_LABEL_LEN));
        let email = self.email.map(|raw| email(&mut errors, Some(&raw)));
        let credential = self
            .credential
            .map(|raw| credential(&mut errors, raw.as_deref()));
        let status = self.status.map(|raw| status(&mut errors, Some(&raw)));

        errors.into_result(|| ())?;

        let names_changed = first_name.is_some() || last_name.is_some();
        if let Some(Some(value)) = first_name {
            account.first_name = value;
        }
        if let Some(Some(value)) = last_name {
            account.last_name = value;
        }
        if names_changed {
            account.full_name = compose_full_name(&account.first_name, &account.last_name);
        }
        if let Some(Some(value)) = position {
            account.position = Some(value);
        }
        if let Some(Some(value)) = department {
            account.department = Some(value);
        }
        if let Some(Some(value)) = email {
            account.email = value;
        }
        if let Some(value) = credential {
            account.credential = value;
        }
        if let Some(Some(value)) = status {
            account.status = value;
        }
        Ok(())
    }
}
