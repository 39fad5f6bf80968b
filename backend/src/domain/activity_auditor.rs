//! Best-effort writer for the ERP activity log.

use std::sync::Arc;

use mockable::Clock;
use serde_json::Value;
use tracing::error;
use uuid::Uuid;

use super::ports::ActivityLogRepository;
use super::{Account, ActivityRecord, ActivityType, ActorSnapshot, BusinessKeys, TraceId};

/// Description of one operation attempt, before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    activity: ActivityType,
    actor: Option<ActorSnapshot>,
    caller_ip: Option<String>,
    request: Value,
    response: Option<Value>,
    success: bool,
    status_code: Option<u16>,
    error_message: Option<String>,
    elapsed_ms: Option<i64>,
    erp_endpoint: Option<String>,
}

impl ActivityEntry {
    /// Start an entry for `activity` with the request snapshot.
    #[must_use]
    pub fn new(activity: ActivityType, request: Value) -> Self {
        Self {
            activity,
            actor: None,
            caller_ip: None,
            request,
            response: None,
            success: false,
            status_code: None,
            error_message: None,
            elapsed_ms: None,
            erp_endpoint: None,
        }
    }

    /// Attribute the entry to an account.
    #[must_use]
    pub fn by(mut self, actor: Option<&Account>) -> Self {
        self.actor = actor.map(ActorSnapshot::from);
        self
    }

    /// Record the caller address.
    #[must_use]
    pub fn from_ip(mut self, caller_ip: Option<String>) -> Self {
        self.caller_ip = caller_ip;
        self
    }

    /// Record the ERP URL called.
    #[must_use]
    pub fn at_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.erp_endpoint = Some(endpoint.into());
        self
    }

    /// Record elapsed wall time.
    #[must_use]
    pub fn took(mut self, elapsed_ms: i64) -> Self {
        self.elapsed_ms = Some(elapsed_ms);
        self
    }

    /// Mark the attempt successful.
    #[must_use]
    pub fn succeeded(mut self, status_code: u16, response: Option<Value>) -> Self {
        self.success = true;
        self.status_code = Some(status_code);
        self.response = response;
        self.error_message = None;
        self
    }

    /// Mark the attempt failed.
    #[must_use]
    pub fn failed(
        mut self,
        status_code: u16,
        message: impl Into<String>,
        response: Option<Value>,
    ) -> Self {
        self.success = false;
        self.status_code = Some(status_code);
        self.error_message = Some(message.into());
        self.response = response;
        self
    }

    /// Activity this entry describes.
    pub fn activity(&self) -> ActivityType {
        self.activity
    }
}

/// Appends one record per operation attempt without ever failing the caller.
pub struct ActivityAuditor<L: ?Sized> {
    log: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<L: ?Sized> Clone for ActivityAuditor<L> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<L> ActivityAuditor<L>
where
    L: ActivityLogRepository + ?Sized,
{
    /// Create an auditor writing to `log`, timestamped by `clock`.
    pub fn new(log: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self { log, clock }
    }

    /// Build the persisted record for an entry.
    #[must_use]
    pub fn enrich(&self, entry: ActivityEntry) -> ActivityRecord {
        let keys = BusinessKeys::extract(&entry.request, entry.response.as_ref());
        ActivityRecord {
            id: Uuid::new_v4(),
            activity_type: entry.activity,
            action: entry.activity.action(),
            actor: entry.actor,
            ip_address: entry.caller_ip,
            keys,
            request_payload: entry.request,
            response_data: entry.response,
            success: entry.success,
            status_code: entry.status_code,
            error_message: entry.error_message,
            response_time_ms: entry.elapsed_ms,
            erp_endpoint: entry.erp_endpoint,
            trace_id: TraceId::current().map(|id| id.to_string()),
            created_at: self.clock.utc(),
        }
    }

    /// Append the entry; failures are logged and swallowed.
    pub async fn record(&self, entry: ActivityEntry) {
        let record = self.enrich(entry);
        if let Err(err) = self.log.append(&record).await {
            error!(
                activity_type = %record.activity_type,
                error = %err,
                "failed to write ERP activity log"
            );
        }
    }
}
