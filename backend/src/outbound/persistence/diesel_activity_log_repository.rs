//! PostgreSQL-backed `ActivityLogRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::ActivityRecord;
use crate::domain::ports::{ActivityLogRepository, ActivityLogRepositoryError};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewActivityLogRow;
use super::pool::{DbPool, PoolError};
use super::schema::erp_activity_logs;

/// Diesel-backed implementation of the activity log port.
#[derive(Clone)]
pub struct DieselActivityLogRepository {
    pool: DbPool,
}

impl DieselActivityLogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ActivityLogRepositoryError {
    map_basic_pool_error(error, |message| {
        ActivityLogRepositoryError::connection(message)
    })
}

fn map_diesel_error(error: diesel::result::Error) -> ActivityLogRepositoryError {
    map_basic_diesel_error(
        error,
        ActivityLogRepositoryError::query,
        ActivityLogRepositoryError::connection,
    )
}

fn activity_row(record: &ActivityRecord) -> NewActivityLogRow<'_> {
    let actor = record.actor.as_ref();
    NewActivityLogRow {
        id: record.id,
        activity_type: record.activity_type.as_str(),
        action: record.action.as_str(),
        user_id: actor.map(|actor| actor.user_id.as_str()),
        account_id: actor.map(|actor| actor.internal_id),
        user_email: actor.map(|actor| actor.email.as_str()),
        first_name: actor.map(|actor| actor.first_name.as_str()),
        last_name: actor.map(|actor| actor.last_name.as_str()),
        full_name: actor.map(|actor| actor.full_name.as_str()),
        position: actor.and_then(|actor| actor.position.as_deref()),
        department: actor.and_then(|actor| actor.department.as_deref()),
        ip_address: record.ip_address.as_deref(),
        po_no: record.keys.po_no.as_deref(),
        line_no: record.keys.line_no.as_deref(),
        delivery_note: record.keys.delivery_note.as_deref(),
        material_doc_no: record.keys.material_doc_no.as_deref(),
        plant: record.keys.plant.as_deref(),
        request_payload: &record.request_payload,
        response_data: record.response_data.as_ref(),
        success: record.success,
        status_code: record.status_code.map(i32::from),
        error_message: record.error_message.as_deref(),
        response_time_ms: record.response_time_ms,
        erp_endpoint: record.erp_endpoint.as_deref(),
        trace_id: record.trace_id.as_deref(),
        created_at: record.created_at,
    }
}

#[async_trait]
impl ActivityLogRepository for DieselActivityLogRepository {
    async fn append(&self, record: &ActivityRecord) -> Result<(), ActivityLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(erp_activity_logs::table)
            .values(&activity_row(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActivityType, ActorSnapshot, BusinessKeys};
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;
    use uuid::Uuid;

    fn record(actor: Option<ActorSnapshot>) -> ActivityRecord {
        ActivityRecord {
            id: Uuid::new_v4(),
            activity_type: ActivityType::GetPo,
            action: ActivityType::GetPo.action(),
            actor,
            ip_address: Some("10.0.0.7".to_owned()),
            keys: BusinessKeys {
                po_no: Some("4500001234".to_owned()),
                ..BusinessKeys::default()
            },
            request_payload: json!({ "po_no": "4500001234" }),
            response_data: None,
            success: false,
            status_code: Some(504),
            error_message: Some("Gateway timeout".to_owned()),
            response_time_ms: Some(30_000),
            erp_endpoint: None,
            trace_id: None,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn row_denormalises_actor() {
        let actor = ActorSnapshot {
            user_id: "OJSAIT002".to_owned(),
            internal_id: Uuid::new_v4(),
            email: "budi@example.com".to_owned(),
            first_name: "Budi".to_owned(),
            last_name: "Santoso".to_owned(),
            full_name: "Budi Santoso".to_owned(),
            position: None,
            department: Some("Warehouse".to_owned()),
        };
        let record = record(Some(actor));

        let row = activity_row(&record);

        assert_eq!(row.activity_type, "get_po");
        assert_eq!(row.action, "view");
        assert_eq!(row.user_id, Some("OJSAIT002"));
        assert_eq!(row.department, Some("Warehouse"));
        assert_eq!(row.status_code, Some(504));
        assert_eq!(row.po_no, Some("4500001234"));
    }

    #[rstest]
    fn anonymous_record_has_no_actor_columns() {
        let record = record(None);
        let row = activity_row(&record);

        assert_eq!(row.user_id, None);
        assert_eq!(row.account_id, None);
        assert_eq!(row.user_email, None);
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::build("bad url"));
        assert!(matches!(err, ActivityLogRepositoryError::Connection { .. }));
    }
}
