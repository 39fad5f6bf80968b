//! Purchase order numbers as accepted from clients.
//!
//! The number is interpolated into the ERP's OData key, so only a narrow
//! character set is accepted.

use std::fmt;

/// Longest accepted purchase order number.
pub const MAX_PO_NO_LEN: usize = 20;

/// Validation errors for purchase order numbers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PurchaseOrderNumberError {
    /// The number was blank.
    #[error("The po_no field is required.")]
    Empty,
    /// The number was too long.
    #[error("The po_no may not be greater than {max} characters.")]
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The number contained characters outside `[A-Za-z0-9_-]`.
    #[error("The po_no may only contain letters, digits, dashes and underscores.")]
    InvalidCharacters,
}

/// Validated purchase order number.
///
/// # Examples
/// ```
/// use gr_backend::domain::PurchaseOrderNumber;
///
/// let po = PurchaseOrderNumber::new(" 4500001234 ").unwrap();
/// assert_eq!(po.as_ref(), "4500001234");
/// assert!(PurchaseOrderNumber::new("45'00").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PurchaseOrderNumber(String);

impl PurchaseOrderNumber {
    /// Validate and wrap a purchase order number.
    pub fn new(raw: &str) -> Result<Self, PurchaseOrderNumberError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PurchaseOrderNumberError::Empty);
        }
        if trimmed.chars().count() > MAX_PO_NO_LEN {
            return Err(PurchaseOrderNumberError::TooLong { max: MAX_PO_NO_LEN });
        }
        if !trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(PurchaseOrderNumberError::InvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PurchaseOrderNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PurchaseOrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
