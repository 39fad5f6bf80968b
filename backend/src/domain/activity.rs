//! Activity log records describing every externally visible ERP interaction.
//!
//! Records are append-only and denormalise the acting account so the trail
//! stays readable after the account changes or is deactivated.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::Account;

/// Kind of operation being logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityType {
    /// Purchase order lookup.
    GetPo,
    /// Goods-receipt posting.
    CreateGr,
    /// Reserved.
    GetGrSummary,
    /// Reserved.
    GetPoList,
    /// Reserved.
    CancelGr,
    /// Reserved.
    UpdateGr,
    /// Reserved.
    GetGrHistory,
    /// Posted receipts for one purchase order line.
    GetGrHistoryByItem,
    /// Distinct values for receipt filters.
    GetGrDropdownValues,
}

/// Verb derived from an activity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityAction {
    /// Read-only access.
    View,
    /// New document.
    Create,
    /// Changed document.
    Update,
    /// Removed or cancelled document.
    Delete,
    /// Unrecognised activity.
    Unknown,
}

impl ActivityAction {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ACTIVITY_TYPES: [ActivityType; 9] = [
    ActivityType::GetPo,
    ActivityType::CreateGr,
    ActivityType::GetGrSummary,
    ActivityType::GetPoList,
    ActivityType::CancelGr,
    ActivityType::UpdateGr,
    ActivityType::GetGrHistory,
    ActivityType::GetGrHistoryByItem,
    ActivityType::GetGrDropdownValues,
];

impl ActivityType {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetPo => "get_po",
            Self::CreateGr => "create_gr",
            Self::GetGrSummary => "get_gr_summary",
            Self::GetPoList => "get_po_list",
            Self::CancelGr => "cancel_gr",
            Self::UpdateGr => "update_gr",
            Self::GetGrHistory => "get_gr_history",
            Self::GetGrHistoryByItem => "get_gr_history_by_item",
            Self::GetGrDropdownValues => "get_gr_dropdown_values",
        }
    }

    /// Verb from the fixed lookup table.
    #[must_use]
    pub const fn action(self) -> ActivityAction {
        match self {
            Self::CreateGr => ActivityAction::Create,
            Self::CancelGr => ActivityAction::Delete,
            Self::UpdateGr => ActivityAction::Update,
            Self::GetPo
            | Self::GetGrSummary
            | Self::GetPoList
            | Self::GetGrHistory
            | Self::GetGrHistoryByItem
            | Self::GetGrDropdownValues => ActivityAction::View,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unrecognised activity name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown activity type: {0}")]
pub struct UnknownActivityType(pub String);

impl FromStr for ActivityType {
    type Err = UnknownActivityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ACTIVITY_TYPES
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownActivityType(s.to_owned()))
    }
}

/// Look up the verb for a stored activity name, `unknown` when unrecognised.
#[must_use]
pub fn action_for_activity(name: &str) -> ActivityAction {
    name.parse::<ActivityType>()
        .map_or(ActivityAction::Unknown, ActivityType::action)
}

/// Account attributes frozen at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorSnapshot {
    /// External account id.
    pub user_id: String,
    /// Surrogate row id.
    pub internal_id: Uuid,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Display name.
    pub full_name: String,
    /// Job title.
    pub position: Option<String>,
    /// Department.
    pub department: Option<String>,
}

impl From<&Account> for ActorSnapshot {
    fn from(account: &Account) -> Self {
        Self {
            user_id: account.user_id.to_string(),
            internal_id: account.internal_id,
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            full_name: account.full_name.clone(),
            position: account.position.clone(),
            department: account.department.clone(),
        }
    }
}

/// Business identifiers pulled from request or response payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessKeys {
    /// Purchase order number.
    pub po_no: Option<String>,
    /// Purchase order line.
    pub line_no: Option<String>,
    /// Delivery note.
    pub delivery_note: Option<String>,
    /// ERP material document.
    pub material_doc_no: Option<String>,
    /// Plant.
    pub plant: Option<String>,
}

fn scalar_at(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

impl BusinessKeys {
    /// Extract keys from the top level of `request`, then its first item,
    /// and the material document from `response`.
    #[must_use]
    pub fn extract(request: &Value, response: Option<&Value>) -> Self {
        let first_item = request
            .get("items")
            .and_then(Value::as_array)
            .and_then(|items| items.first());
        let lookup = |keys: &[&str]| {
            scalar_at(request, keys).or_else(|| first_item.and_then(|item| scalar_at(item, keys)))
        };

        Self {
            po_no: lookup(&["po_no"]),
            line_no: lookup(&["line_no", "item_po"]),
            delivery_note: lookup(&["delivery_note", "dn_no"]),
            material_doc_no: response
                .and_then(|body| scalar_at(body, &["mat_doc", "material_doc_no"])),
            plant: lookup(&["plant"]),
        }
    }
}

/// One persisted activity log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    /// Record id.
    pub id: Uuid,
    /// Kind of activity.
    pub activity_type: ActivityType,
    /// Derived verb.
    pub action: ActivityAction,
    /// Acting account, absent when unauthenticated.
    pub actor: Option<ActorSnapshot>,
    /// Caller address.
    pub ip_address: Option<String>,
    /// Extracted business identifiers.
    pub keys: BusinessKeys,
    /// Request snapshot.
    pub request_payload: Value,
    /// Response snapshot.
    pub response_data: Option<Value>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Status returned to the caller.
    pub status_code: Option<u16>,
    /// Failure message.
    pub error_message: Option<String>,
    /// Wall time spent, in milliseconds.
    pub response_time_ms: Option<i64>,
    /// ERP URL called.
    pub erp_endpoint: Option<String>,
    /// Request correlation id.
    pub trace_id: Option<String>,
    /// Write timestamp.
    pub created_at: DateTime<Utc>,
}
