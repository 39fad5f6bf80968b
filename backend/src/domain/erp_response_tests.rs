//! Tests for ERP response interpretation.

use chrono::NaiveDate;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;

#[fixture]
fn post_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 4).expect("valid date")
}

fn reply(status: u16, body: Value) -> ErpReply {
    ErpReply {
        status,
        raw_body: body.to_string(),
        body: Some(body),
    }
}

#[rstest]
fn closed_posting_period_is_a_server_transport_failure(post_date: NaiveDate) {
    let verdict = interpret_erp_reply(
        &reply(
            500,
            json!({"error": {"message": {"value": "Posting period 03/2025 is closed"}}}),
        ),
        post_date,
    );

    let ErpVerdict::TransportFailure {
        status,
        error_type,
        message,
        original_message,
        ..
    } = verdict
    else {
        panic!("expected transport failure, got {verdict:?}");
    };
    assert_eq!(status, 500);
    assert_eq!(error_type, ErpErrorType::SapServerError);
    assert!(message.contains("Posting period is closed"));
    assert_eq!(original_message, "Posting period 03/2025 is closed");
}

#[rstest]
#[case(400, ErpErrorType::InvalidRequest)]
#[case(401, ErpErrorType::AuthenticationError)]
#[case(403, ErpErrorType::AuthorizationError)]
#[case(404, ErpErrorType::NotFound)]
#[case(500, ErpErrorType::SapServerError)]
#[case(503, ErpErrorType::ServiceUnavailable)]
#[case(502, ErpErrorType::UnknownError)]
#[case(418, ErpErrorType::UnknownError)]
fn transport_statuses_map_to_fixed_taxonomy(
    post_date: NaiveDate,
    #[case] status: u16,
    #[case] expected: ErpErrorType,
) {
    let verdict = interpret_erp_reply(&reply(status, json!({})), post_date);
    assert_eq!(verdict.error_type(), Some(expected));
    assert_eq!(verdict.http_status(), status);
}

#[rstest]
#[case::odata_nested(json!({"error": {"message": {"value": "nested"}}}), "nested")]
#[case::odata_flat(json!({"error": {"message": "flat odata"}}), "flat odata")]
#[case::lowercase(json!({"message": "lower"}), "lower")]
#[case::uppercase(json!({"MESSAGE": "UPPER"}), "UPPER")]
#[case::return_list(
    json!({"RETURN": [{"MESSAGE": "first"}, {"message": "second"}, {"TYPE": "W"}]}),
    "first; second"
)]
#[case::fallback(json!({"unexpected": true}), "ERP error (HTTP 409)")]
fn error_messages_follow_candidate_order(#[case] body: Value, #[case] expected: &str) {
    assert_eq!(extract_error_message(Some(&body), 409), expected);
}

#[rstest]
fn nested_message_wins_over_flat_message() {
    let body = json!({
        "error": {"message": {"value": "nested"}},
        "message": "flat",
    });
    assert_eq!(extract_error_message(Some(&body), 400), "nested");
}

#[rstest]
fn non_json_bodies_fall_back_to_generic_message(post_date: NaiveDate) {
    let verdict = interpret_erp_reply(
        &ErpReply {
            status: 404,
            body: None,
            raw_body: "<html>not found</html>".to_owned(),
        },
        post_date,
    );

    let ErpVerdict::TransportFailure {
        message, response, ..
    } = verdict
    else {
        panic!("expected transport failure");
    };
    assert_eq!(message, "ERP error (HTTP 404)");
    assert_eq!(response, Value::String("<html>not found</html>".to_owned()));
}

#[rstest]
#[case("Posting period 02/2025 not open", "Posting period is closed")]
#[case("No AUTHORIZATION for movement type 101", "authorization")]
#[case("Material 4711 not maintained in plant 1000", "Material is not maintained for the selected plant")]
#[case("Database commit failed", "database error")]
#[case("Something odd happened", "ERP server error")]
fn server_errors_are_reworded(#[case] original: &str, #[case] fragment: &str) {
    let message = specialise_server_error(original);
    assert!(
        message.to_lowercase().contains(&fragment.to_lowercase()),
        "{message:?} should mention {fragment:?}"
    );
}

#[rstest]
fn non_server_statuses_keep_extracted_message(post_date: NaiveDate) {
    let verdict = interpret_erp_reply(
        &reply(400, json!({"message": "posting period closed"})),
        post_date,
    );
    let ErpVerdict::TransportFailure { message, .. } = verdict else {
        panic!("expected transport failure");
    };
    assert_eq!(message, "posting period closed");
}

#[rstest]
#[case(json!({"type": "E", "message": "Plant 1000 not found"}))]
#[case(json!({"TYPE": "e", "MESSAGE": "Plant 1000 not found"}))]
fn type_e_bodies_are_business_failures_despite_200(post_date: NaiveDate, #[case] body: Value) {
    let verdict = interpret_erp_reply(&reply(200, body), post_date);

    assert!(!verdict.is_success());
    assert_eq!(verdict.http_status(), 422);
    assert_eq!(verdict.error_type(), Some(ErpErrorType::SapProcessingError));
    let ErpVerdict::BusinessFailure { message, .. } = verdict else {
        panic!("expected business failure");
    };
    assert_eq!(message, "Plant 1000 not found");
}

#[rstest]
#[case(json!({"status": "ERROR", "message": "Quantity exceeds open PO quantity"}))]
#[case(json!({"STATUS": "error", "RETURN": [{"MESSAGE": "Quantity exceeds open PO quantity"}]}))]
fn status_error_bodies_are_business_failures(post_date: NaiveDate, #[case] body: Value) {
    let verdict = interpret_erp_reply(&reply(201, body), post_date);

    let ErpVerdict::BusinessFailure { message, .. } = verdict else {
        panic!("expected business failure");
    };
    assert_eq!(message, "Quantity exceeds open PO quantity");
}

#[rstest]
fn business_failure_without_message_uses_generic_phrase(post_date: NaiveDate) {
    let verdict = interpret_erp_reply(&reply(200, json!({"type": "E"})), post_date);
    let ErpVerdict::BusinessFailure { message, .. } = verdict else {
        panic!("expected business failure");
    };
    assert_eq!(message, "ERP rejected the goods receipt");
}

#[rstest]
#[case(json!({"type": "S", "status": "OK"}))]
#[case(json!({"type": "W"}))]
fn other_indicators_are_not_failures(post_date: NaiveDate, #[case] body: Value) {
    assert!(interpret_erp_reply(&reply(200, body), post_date).is_success());
}

#[rstest]
fn success_extracts_document_number_and_year(post_date: NaiveDate) {
    let verdict = interpret_erp_reply(
        &reply(200, json!({"mat_doc": "5000012345", "doc_year": "2025"})),
        post_date,
    );

    assert_eq!(
        verdict,
        ErpVerdict::Succeeded {
            material_doc_no: Some("5000012345".to_owned()),
            doc_year: Some("2025".to_owned()),
            posting_date: post_date,
            response: json!({"mat_doc": "5000012345", "doc_year": "2025"}),
        }
    );
}

#[rstest]
fn success_accepts_alternate_names_and_numbers(post_date: NaiveDate) {
    let verdict = interpret_erp_reply(
        &reply(
            200,
            json!({"material_doc_no": 5_000_012_346_u64, "year": 2025, "posting_date": "2025-03-06"}),
        ),
        post_date,
    );

    let ErpVerdict::Succeeded {
        material_doc_no,
        doc_year,
        posting_date,
        ..
    } = verdict
    else {
        panic!("expected success");
    };
    assert_eq!(material_doc_no.as_deref(), Some("5000012346"));
    assert_eq!(doc_year.as_deref(), Some("2025"));
    assert_eq!(posting_date, NaiveDate::from_ymd_opt(2025, 3, 6).expect("date"));
}

#[rstest]
fn unparseable_posting_date_falls_back_to_submission(post_date: NaiveDate) {
    let verdict = interpret_erp_reply(
        &reply(200, json!({"mat_doc": "1", "posting_date": "06.03.2025"})),
        post_date,
    );
    let ErpVerdict::Succeeded { posting_date, .. } = verdict else {
        panic!("expected success");
    };
    assert_eq!(posting_date, post_date);
}

#[rstest]
fn transport_failure_details_keep_original_message(post_date: NaiveDate) {
    let verdict = interpret_erp_reply(&reply(500, json!({"message": "Database locked"})), post_date);
    let details = verdict.error_details().expect("failure details");

    assert_eq!(details.get("erp_status"), Some(&json!(500)));
    assert_eq!(details.get("original_message"), Some(&json!("Database locked")));
}
