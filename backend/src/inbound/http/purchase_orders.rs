//! Purchase order lookup handler.
//!
//! ```text
//! GET /api/v1/sap/purchase-orders?po_no=4500000001
//! ```

use actix_web::{HttpRequest, HttpResponse, get, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::ports::PurchaseOrderRequest;
use crate::domain::{
    ErpOperationFailure, PURCHASE_ORDER_MESSAGE, PurchaseOrderNumber, UNHANDLED_FAILURE_MESSAGE,
};
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::ErpFailureSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::caller_ip;

/// Query string for purchase order lookups.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PurchaseOrderParams {
    /// Purchase order number, 1-20 characters of `[A-Za-z0-9_-]`.
    pub po_no: Option<String>,
}

fn parse_po_no(raw: Option<&str>) -> Result<PurchaseOrderNumber, ErpOperationFailure> {
    PurchaseOrderNumber::new(raw.unwrap_or_default()).map_err(|err| {
        ErpOperationFailure::new(422, "Validation failed")
            .with_details(json!({ "errors": { "po_no": [err.to_string()] } }))
    })
}

/// Fetch a purchase order and its open lines from the ERP.
#[utoipa::path(
    get,
    path = "/api/v1/sap/purchase-orders",
    params(PurchaseOrderParams),
    responses(
        (status = 200, description = "Purchase order"),
        (status = 401, description = "Unauthorised", body = ErpFailureSchema),
        (status = 422, description = "Invalid purchase order number", body = ErpFailureSchema),
        (status = 500, description = "Lookup failed", body = ErpFailureSchema),
        (status = 503, description = "ERP unavailable", body = ErpFailureSchema)
    ),
    tags = ["purchase-orders"],
    operation_id = "getPurchaseOrder"
)]
#[get("/purchase-orders")]
pub async fn get_purchase_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    params: web::Query<PurchaseOrderParams>,
) -> Result<HttpResponse, ErpOperationFailure> {
    let po_no = parse_po_no(params.po_no.as_deref())?;
    let session_user = session
        .account_id()
        .map_err(|_| ErpOperationFailure::unhandled(UNHANDLED_FAILURE_MESSAGE))?;

    let response = state
        .purchase_orders
        .fetch_purchase_order(PurchaseOrderRequest {
            session_user,
            caller_ip: caller_ip(&req),
            po_no,
        })
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(Envelope::ok(PURCHASE_ORDER_MESSAGE, response.data)))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use super::*;
    use crate::domain::ErpErrorType;
    use crate::domain::ports::{MockPurchaseOrderQuery, PurchaseOrderResponse};
    use crate::inbound::http::state::HttpStatePorts;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    async fn call(query: MockPurchaseOrderQuery, uri: &str) -> (StatusCode, Value) {
        let state = HttpState::new(HttpStatePorts {
            purchase_orders: Arc::new(query),
            ..HttpStatePorts::default()
        });
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .service(web::scope("/api/v1/sap").service(get_purchase_order)),
        )
        .await;
        let response =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request())
                .await;
        let status = response.status();
        (status, actix_test::read_body_json(response).await)
    }

    #[rstest]
    #[case("/api/v1/sap/purchase-orders")]
    #[case("/api/v1/sap/purchase-orders?po_no=")]
    #[case("/api/v1/sap/purchase-orders?po_no=45%2700")]
    #[case("/api/v1/sap/purchase-orders?po_no=123456789012345678901")]
    #[actix_web::test]
    async fn malformed_numbers_never_reach_the_erp(#[case] uri: &str) {
        let mut query = MockPurchaseOrderQuery::new();
        query.expect_fetch_purchase_order().never();

        let (status, body) = call(query, uri).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.pointer("/error_details/errors/po_no/0").is_some());
    }

    #[rstest]
    #[actix_web::test]
    async fn erp_body_is_passed_through() {
        let mut query = MockPurchaseOrderQuery::new();
        query
            .expect_fetch_purchase_order()
            .withf(|request| request.po_no.as_ref() == "4500000001")
            .return_once(|_| {
                Ok(PurchaseOrderResponse {
                    data: json!({"value": [{"po_no": "4500000001", "item_po": "00010"}]}),
                })
            });

        let (status, body) = call(query, "/api/v1/sap/purchase-orders?po_no=4500000001").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Purchase order retrieved successfully");
        assert_eq!(body["data"]["value"][0]["item_po"], "00010");
    }

    #[rstest]
    #[actix_web::test]
    async fn erp_status_is_passed_through_on_failure() {
        let mut query = MockPurchaseOrderQuery::new();
        query.expect_fetch_purchase_order().return_once(|_| {
            Err(ErpOperationFailure::new(404, "Failed to fetch PO data")
                .with_error_type(ErpErrorType::NotFound))
        });

        let (status, body) = call(query, "/api/v1/sap/purchase-orders?po_no=4500000001").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error_type"], "NOT_FOUND");
    }
}
