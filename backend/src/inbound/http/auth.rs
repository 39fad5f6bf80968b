//! Sign-in API handlers.
//!
//! ```text
//! POST /api/v1/sap/login {"username":"OJSAIT001","password":"secret"}
//! POST /api/v1/sap/login-rfid {"credential":"0012345678"}
//! POST /api/v1/sap/logout
//! GET /api/v1/sap/profile
//! GET /api/v1/sap/check-auth
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::{Error, LoginCredentials, LoginValidationError, tap_login};
use crate::inbound::http::ApiResult;
use crate::inbound::http::account_dto::AccountResponse;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/sap/login`.
///
/// `username` may be the account id or the email address.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[serde(default, alias = "email", alias = "user_id")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Card-tap login body for `POST /api/v1/sap/login-rfid`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct TapLoginRequest {
    #[serde(default, alias = "id_card", alias = "rfid")]
    pub credential: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, message) = match err {
        LoginValidationError::EmptyLogin => ("username", "The username field is required."),
        LoginValidationError::EmptyPassword => ("password", "The password field is required."),
        LoginValidationError::Credential(_) => ("credential", "The credential field is required."),
    };
    Error::unprocessable("Validation failed")
        .with_details(json!({ "errors": { field: [message] } }))
}

fn signed_in(session: &SessionContext, account: crate::domain::Account) -> ApiResult<HttpResponse> {
    session.persist_account(&account.user_id)?;
    info!(user_id = %account.user_id, "account signed in");
    Ok(HttpResponse::Ok().json(Envelope::ok(
        "Login successful",
        json!({ "user": AccountResponse::from(account) }),
    )))
}

/// Authenticate with account id or email and password.
#[utoipa::path(
    post,
    path = "/api/v1/sap/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 403, description = "Account inactive", body = ErrorSchema),
        (status = 422, description = "Validation failed", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let account = state.login.authenticate(&credentials).await?;
    signed_in(&session, account)
}

/// Authenticate by tapping an RFID card.
#[utoipa::path(
    post,
    path = "/api/v1/sap/login-rfid",
    request_body = TapLoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 403, description = "Card unknown or account inactive", body = ErrorSchema),
        (status = 422, description = "Validation failed", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "loginRfid",
    security([])
)]
#[post("/login-rfid")]
pub async fn login_rfid(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TapLoginRequest>,
) -> ApiResult<HttpResponse> {
    let credential = tap_login(&payload.credential).map_err(map_login_validation_error)?;
    let account = state.login.authenticate_tap(&credential).await?;
    signed_in(&session, account)
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/sap/logout",
    responses(
        (status = 200, description = "Session ended"),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    let user_id = session.require_account_id()?;
    session.purge();
    info!(user_id = %user_id, "account signed out");
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Logged out successfully",
    })))
}

/// Current account.
#[utoipa::path(
    get,
    path = "/api/v1/sap/profile",
    responses(
        (status = 200, description = "Signed-in account", body = AccountResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "profile"
)]
#[get("/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let account = state.login.principal(session.account_id()?).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(Envelope::ok(
            "Profile retrieved successfully",
            AccountResponse::from(account),
        )))
}

/// Whether the session is still backed by an active account.
#[utoipa::path(
    get,
    path = "/api/v1/sap/check-auth",
    responses(
        (status = 200, description = "Session valid"),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "checkAuth"
)]
#[get("/check-auth")]
pub async fn check_auth(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let account = state.login.principal(session.account_id()?).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(json!({
            "success": true,
            "authenticated": true,
            "user": AccountResponse::from(account),
        })))
}
