//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer, the schema
//! wrappers from [`crate::inbound::http::schemas`] and the session cookie
//! security scheme. Swagger UI serves it in debug builds.

use crate::inbound::http::account_dto::AccountResponse;
use crate::inbound::http::auth::{LoginRequest, TapLoginRequest};
use crate::inbound::http::good_receipts::{GoodsReceiptBody, ReceiptLineBody};
use crate::inbound::http::receipt_history::{DropdownValuesResponse, ReceiptHistoryEntry};
use crate::inbound::http::schemas::{ErpFailureSchema, ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{
    ChangePasswordRequest, CreateAccountRequest, UpdateAccountRequest,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/sap/login or /api/v1/sap/login-rfid.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Goods receipt integration API",
        description = "Purchase order lookup, goods-receipt posting, receipt history and operator accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::login_rfid,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::profile,
        crate::inbound::http::auth::check_auth,
        crate::inbound::http::purchase_orders::get_purchase_order,
        crate::inbound::http::good_receipts::post_goods_receipt,
        crate::inbound::http::receipt_history::history_by_line,
        crate::inbound::http::receipt_history::dropdown_values,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::change_password,
        crate::inbound::http::users::deactivate_user,
        crate::inbound::http::health::health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        ErpFailureSchema,
        AccountResponse,
        LoginRequest,
        TapLoginRequest,
        GoodsReceiptBody,
        ReceiptLineBody,
        ReceiptHistoryEntry,
        DropdownValuesResponse,
        CreateAccountRequest,
        UpdateAccountRequest,
        ChangePasswordRequest,
    )),
    tags(
        (name = "auth", description = "Session sign-in"),
        (name = "purchase-orders", description = "Purchase order lookups against the ERP"),
        (name = "goods-receipts", description = "Goods-receipt posting"),
        (name = "receipt-history", description = "Posted receipt history"),
        (name = "users", description = "Operator account administration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
