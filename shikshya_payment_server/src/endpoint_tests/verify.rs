use actix_web::http::StatusCode;
use serde_json::json;
use spg_common::Money;

use super::{helpers::*, mocks::MockSettlementDb};

const USER: &str = "student-42";

#[actix_web::test]
async fn missing_identity_header_is_unauthorized() {
    let db = MockSettlementDb::new();
    let body = json!({ "method": "esewa", "data": signed_esewa_payload("1500.0", "abc123") });
    let (status, body) = post_verify(None, body, db).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("identity"), "Got {body}");
}

#[actix_web::test]
async fn esewa_payment_verifies_and_settles() {
    let mut db = MockSettlementDb::new();
    let order = pending_order(1, USER, "rust-101", Money::from_rupees(1500), "abc123");
    let settled = completed(order.clone(), "000AWEO");
    db.expect_fetch_orders_by_transaction_uuid()
        .withf(|user, uuid| user == USER && uuid == "abc123")
        .returning(move |_, _| Ok(vec![order.clone()]));
    db.expect_complete_order()
        .withf(|id, reference| *id == 1 && reference == "000AWEO")
        .returning(move |_, _| Ok(Some(settled.clone())));
    db.expect_enroll_if_absent().withf(|user, course| user == USER && course == "rust-101").returning(|_, _| Ok(true));
    db.expect_remove_cart_item().returning(|_, _| Ok(true));

    let body = json!({ "method": "esewa", "data": signed_esewa_payload("1500.0", "abc123") });
    let (status, body) = post_verify(Some(USER), body, db).await;
    assert_eq!(status, StatusCode::OK, "Got {body}");
    let result: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result["success"], true);
    assert_eq!(result["course_ids"], json!(["rust-101"]));
    assert!(result["message"].as_str().unwrap().contains("enrolled"), "Got {body}");
}

#[actix_web::test]
async fn mangled_esewa_method_parameter_is_tolerated() {
    // The payload arrives fused onto the method parameter instead of in `data`.
    let mut db = MockSettlementDb::new();
    let order = pending_order(1, USER, "rust-101", Money::from_rupees(1500), "abc123");
    let settled = completed(order.clone(), "000AWEO");
    db.expect_fetch_orders_by_transaction_uuid().returning(move |_, _| Ok(vec![order.clone()]));
    db.expect_complete_order().returning(move |_, _| Ok(Some(settled.clone())));
    db.expect_enroll_if_absent().returning(|_, _| Ok(true));
    db.expect_remove_cart_item().returning(|_, _| Ok(true));

    let method = format!("esewa?data={}", signed_esewa_payload("1500.0", "abc123"));
    let (status, body) = post_verify(Some(USER), json!({ "method": method }), db).await;
    assert_eq!(status, StatusCode::OK, "Got {body}");
}

#[actix_web::test]
async fn malformed_esewa_payload_is_bad_request() {
    let db = MockSettlementDb::new();
    let body = json!({ "method": "esewa", "data": "not/base64!!" });
    let (status, body) = post_verify(Some(USER), body, db).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "Got {body}");
}

#[actix_web::test]
async fn verified_payment_with_no_orders_is_not_found() {
    let mut db = MockSettlementDb::new();
    db.expect_fetch_orders_by_transaction_uuid().returning(|_, _| Ok(vec![]));
    db.expect_fetch_orders_by_payment_reference().returning(|_, _| Ok(vec![]));
    db.expect_fetch_pending_orders().returning(|_, _| Ok(vec![]));

    let body = json!({ "method": "esewa", "data": signed_esewa_payload("1500.0", "orphan") });
    let (status, body) = post_verify(Some(USER), body, db).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "Got {body}");
    assert!(body.contains("Contact support"), "Got {body}");
}

#[actix_web::test]
async fn khalti_without_a_pidx_is_bad_request() {
    let db = MockSettlementDb::new();
    let (status, body) = post_verify(Some(USER), json!({ "method": "khalti" }), db).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "Got {body}");
}

#[actix_web::test]
async fn khalti_provider_outage_is_bad_gateway() {
    // The test Khalti client points at a dead port, so a lookup attempt surfaces as 502.
    let db = MockSettlementDb::new();
    let body = json!({ "method": "khalti", "pidx": "HT6o6PEZ" });
    let (status, body) = post_verify(Some(USER), body, db).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY, "Got {body}");
}

#[actix_web::test]
async fn unknown_method_is_bad_request() {
    let db = MockSettlementDb::new();
    let (status, body) = post_verify(Some(USER), json!({ "method": "paypal" }), db).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "Got {body}");
    assert!(body.contains("not detected"), "Got {body}");
}

#[actix_web::test]
async fn recovered_method_from_client_state_is_used() {
    // The method parameter was lost entirely; the client's stashed session state still names the provider.
    let db = MockSettlementDb::new();
    let body = json!({ "method": "", "recovery": { "pidx": "HT6o6PEZ", "method": "khalti" } });
    let (status, body) = post_verify(Some(USER), body, db).await;
    // The provider is detected and the recovered pidx is attempted; with no Khalti reachable the request
    // dies at the lookup, not at method detection.
    assert_eq!(status, StatusCode::BAD_GATEWAY, "Got {body}");
}
