//! Tests for account administration handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::MockAccountAdministration;
use crate::domain::{Account, AccountId, AccountStatus, Credential, Error};
use crate::inbound::http::state::HttpStatePorts;

fn account(user_id: &str, status: AccountStatus) -> Account {
    Account {
        internal_id: uuid::Uuid::new_v4(),
        user_id: AccountId::new(user_id).expect("account id"),
        first_name: "Sari".to_owned(),
        last_name: "Wulan".to_owned(),
        full_name: "Sari Wulan".to_owned(),
        position: Some("Checker".to_owned()),
        department: Some("Warehouse".to_owned()),
        email: "sari@example.com".to_owned(),
        status,
        credential: Some(Credential::new("0012345678").expect("credential")),
    }
}

async fn send(
    accounts: MockAccountAdministration,
    request: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let state = HttpState::new(HttpStatePorts {
        accounts: Arc::new(accounts),
        ..HttpStatePorts::default()
    });
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(crate::inbound::http::validation::json_config())
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .service(
                web::scope("/api/v1/sap")
                    .service(list_users)
                    .service(create_user)
                    .service(update_user)
                    .service(change_password)
                    .service(deactivate_user),
            ),
    )
    .await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    (status, actix_test::read_body_json(response).await)
}

#[rstest]
#[actix_web::test]
async fn list_returns_accounts_without_secrets() {
    let mut accounts = MockAccountAdministration::new();
    accounts
        .expect_list_accounts()
        .withf(|actor| actor.is_none())
        .return_once(|_| Ok(vec![account("OJSAIT002", AccountStatus::Active)]));

    let (status, body) = send(
        accounts,
        actix_test::TestRequest::get().uri("/api/v1/sap/users"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["user_id"], "OJSAIT002");
    assert_eq!(body["data"][0]["credential"], "0012345678");
    assert!(body["data"][0].get("password").is_none());
}

#[rstest]
#[actix_web::test]
async fn create_accepts_legacy_aliases_and_answers_created() {
    let mut accounts = MockAccountAdministration::new();
    accounts
        .expect_create_account()
        .withf(|_, form| {
            form.position.as_deref() == Some("Checker")
                && form.credential.as_deref() == Some("0012345678")
                && form.password.as_ref().map(|p| p.as_str()) == Some("secret1")
        })
        .return_once(|_, _| Ok(account("OJSAIT002", AccountStatus::Active)));

    let (status, body) = send(
        accounts,
        actix_test::TestRequest::post()
            .uri("/api/v1/sap/users")
            .set_json(json!({
                "first_name": "Sari",
                "last_name": "Wulan",
                "jabatan": "Checker",
                "department": "Warehouse",
                "email": "sari@example.com",
                "password": "secret1",
                "id_card": "0012345678"
            })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["data"]["full_name"], "Sari Wulan");
}

#[rstest]
#[case(json!({"credential": null}), Some(None))]
#[case(json!({"id_card": "0087654321"}), Some(Some("0087654321".to_owned())))]
#[case(json!({"department": "IT"}), None)]
#[actix_web::test]
async fn update_distinguishes_cleared_credentials(
    #[case] body: Value,
    #[case] expected: Option<Option<String>>,
) {
    let mut accounts = MockAccountAdministration::new();
    accounts
        .expect_update_account()
        .withf(move |_, user_id, patch| {
            user_id.as_ref() == "OJSAIT002" && patch.credential == expected
        })
        .return_once(|_, _, _| Ok(account("OJSAIT002", AccountStatus::Active)));

    let (status, _) = send(
        accounts,
        actix_test::TestRequest::put()
            .uri("/api/v1/sap/users/OJSAIT002")
            .set_json(body),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn change_password_forwards_missing_passwords_for_validation() {
    let mut accounts = MockAccountAdministration::new();
    accounts
        .expect_change_password()
        .withf(|_, _, password| password.is_empty())
        .return_once(|_, _, _| {
            Err(Error::unprocessable("Validation failed").with_details(
                json!({"errors": {"new_password": ["The new_password field is required."]}}),
            ))
        });

    let (status, body) = send(
        accounts,
        actix_test::TestRequest::put()
            .uri("/api/v1/sap/users/OJSAIT002/change-password")
            .set_json(json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.pointer("/details/errors/new_password").is_some());
}

#[rstest]
#[actix_web::test]
async fn deactivate_reports_the_new_status() {
    let mut accounts = MockAccountAdministration::new();
    accounts
        .expect_deactivate_account()
        .return_once(|_, _| Ok(account("OJSAIT002", AccountStatus::Inactive)));

    let (status, body) = send(
        accounts,
        actix_test::TestRequest::patch().uri("/api/v1/sap/users/OJSAIT002/deactivate"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "inactive");
}

#[rstest]
#[actix_web::test]
async fn non_administrators_are_forbidden() {
    let mut accounts = MockAccountAdministration::new();
    accounts
        .expect_list_accounts()
        .return_once(|_| Err(Error::forbidden("Access denied. IT department only.")));

    let (status, body) = send(
        accounts,
        actix_test::TestRequest::get().uri("/api/v1/sap/users"),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied. IT department only.");
}
