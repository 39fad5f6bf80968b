//! Account administration API handlers.
//!
//! ```text
//! GET /api/v1/sap/users
//! POST /api/v1/sap/users {"first_name":"Sari","last_name":"Wulan",...}
//! PUT /api/v1/sap/users/OJSAIT002 {"department":"Warehouse"}
//! PUT /api/v1/sap/users/OJSAIT002/change-password {"new_password":"secret1"}
//! PATCH /api/v1/sap/users/OJSAIT002/deactivate
//! ```
//!
//! Every handler forwards the session account; the administration port
//! decides whether the caller may act.

use actix_web::{HttpResponse, get, patch, post, put, web};
use serde::{Deserialize, Deserializer};
use zeroize::Zeroizing;

use crate::domain::{AccountPatch, NewAccountForm};
use crate::inbound::http::ApiResult;
use crate::inbound::http::account_dto::AccountResponse;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_account_id;

/// Body for `POST /api/v1/sap/users`.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct CreateAccountRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(alias = "jabatan")]
    pub position: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    #[schema(value_type = Option<String>)]
    pub password: Option<Zeroizing<String>>,
    /// RFID credential.
    #[serde(alias = "id_card")]
    pub credential: Option<String>,
    /// `active` or `inactive`; defaults to `active`.
    pub status: Option<String>,
}

impl From<CreateAccountRequest> for NewAccountForm {
    fn from(value: CreateAccountRequest) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            position: value.position,
            department: value.department,
            email: value.email,
            password: value.password,
            credential: value.credential,
            status: value.status,
        }
    }
}

/// Present-but-null stays distinguishable from absent.
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Body for `PUT /api/v1/sap/users/{user_id}`; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateAccountRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(alias = "jabatan")]
    pub position: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    /// `null` clears the registered credential.
    #[serde(default, alias = "id_card", deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub credential: Option<Option<String>>,
    pub status: Option<String>,
}

impl From<UpdateAccountRequest> for AccountPatch {
    fn from(value: UpdateAccountRequest) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            position: value.position,
            department: value.department,
            email: value.email,
            credential: value.credential,
            status: value.status,
        }
    }
}

/// Body for `PUT /api/v1/sap/users/{user_id}/change-password`.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct ChangePasswordRequest {
    #[schema(value_type = String)]
    pub new_password: Option<Zeroizing<String>>,
}

fn account_json(message: &'static str, account: crate::domain::Account) -> Envelope<AccountResponse> {
    Envelope::ok(message, AccountResponse::from(account))
}

/// List every account ordered by account id.
#[utoipa::path(
    get,
    path = "/api/v1/sap/users",
    responses(
        (status = 200, description = "Accounts", body = [AccountResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller outside IT", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let accounts = state.accounts.list_accounts(session.account_id()?).await?;
    let data: Vec<AccountResponse> = accounts.iter().map(AccountResponse::from).collect();
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(Envelope::ok("Users retrieved successfully", data)))
}

/// Create an account under the next free id.
#[utoipa::path(
    post,
    path = "/api/v1/sap/users",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller outside IT", body = ErrorSchema),
        (status = 422, description = "Validation failed", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateAccountRequest>,
) -> ApiResult<HttpResponse> {
    let account = state
        .accounts
        .create_account(session.account_id()?, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(account_json("User created successfully", account)))
}

/// Apply a partial update to an account.
#[utoipa::path(
    put,
    path = "/api/v1/sap/users/{user_id}",
    params(("user_id" = String, Path, description = "Account id")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = AccountResponse),
        (status = 403, description = "Caller outside IT", body = ErrorSchema),
        (status = 404, description = "Unknown account", body = ErrorSchema),
        (status = 422, description = "Validation failed", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{user_id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateAccountRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = parse_account_id(path.into_inner())?;
    let account = state
        .accounts
        .update_account(session.account_id()?, user_id, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(account_json("User updated successfully", account)))
}

/// Replace an account's password.
#[utoipa::path(
    put,
    path = "/api/v1/sap/users/{user_id}/change-password",
    params(("user_id" = String, Path, description = "Account id")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 403, description = "Caller outside IT", body = ErrorSchema),
        (status = 404, description = "Unknown account", body = ErrorSchema),
        (status = 422, description = "Validation failed", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "changeUserPassword"
)]
#[put("/users/{user_id}/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = parse_account_id(path.into_inner())?;
    let new_password = payload.into_inner().new_password.unwrap_or_default();
    let account = state
        .accounts
        .change_password(session.account_id()?, user_id, new_password)
        .await?;
    Ok(HttpResponse::Ok().json(account_json("Password changed successfully", account)))
}

/// Mark an account inactive. Accounts are never deleted.
#[utoipa::path(
    patch,
    path = "/api/v1/sap/users/{user_id}/deactivate",
    params(("user_id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account deactivated", body = AccountResponse),
        (status = 403, description = "Caller outside IT", body = ErrorSchema),
        (status = 404, description = "Unknown account", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deactivateUser"
)]
#[patch("/users/{user_id}/deactivate")]
pub async fn deactivate_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = parse_account_id(path.into_inner())?;
    let account = state
        .accounts
        .deactivate_account(session.account_id()?, user_id)
        .await?;
    Ok(HttpResponse::Ok().json(account_json("User deactivated successfully", account)))
}

#[cfg(test)]
mod tests;
