use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use chrono::Utc;
use log::debug;
use serde_json::Value;
use shikshya_payment_engine::{
    db_types::{Order, OrderStatus, PaymentMethod},
    SettlementApi,
};
use spg_common::{Money, Secret};
use wallet_gateways::{calculate_signature, signature_message, EsewaConfig, EsewaGateway, KhaltiApi, KhaltiConfig};

use super::mocks::MockSettlementDb;
use crate::routes::VerifyPaymentRoute;

// The published eSewa UAT credentials. DO NOT use real merchant credentials in tests.
pub const TEST_PRODUCT_CODE: &str = "EPAYTEST";
pub const TEST_ESEWA_SECRET: &str = "8gBm/:&EnhH.1/q";

pub fn test_esewa_gateway() -> EsewaGateway {
    EsewaGateway::new(EsewaConfig {
        product_code: TEST_PRODUCT_CODE.to_string(),
        secret_key: Secret::new(TEST_ESEWA_SECRET.to_string()),
    })
}

// Points at a port nothing listens on. Tests that exercise the Khalti path either fail before the lookup or
// are asserting what happens when the provider is unreachable.
pub fn test_khalti_api() -> KhaltiApi {
    KhaltiApi::new(KhaltiConfig {
        secret_key: Secret::new("test_secret_key".to_string()),
        lookup_url: "http://127.0.0.1:1/lookup/".to_string(),
    })
    .expect("Failed to build Khalti client")
}

/// A correctly signed eSewa redirect payload, base64 encoded, as the provider would deliver it.
pub fn signed_esewa_payload(total_amount: &str, transaction_uuid: &str) -> String {
    let message = signature_message(total_amount, transaction_uuid, TEST_PRODUCT_CODE);
    let signature = calculate_signature(TEST_ESEWA_SECRET, &message).expect("Failed to sign payload");
    let json = serde_json::json!({
        "transaction_code": "000AWEO",
        "status": "COMPLETE",
        "total_amount": total_amount,
        "transaction_uuid": transaction_uuid,
        "product_code": TEST_PRODUCT_CODE,
        "signed_field_names": "total_amount,transaction_uuid,product_code",
        "signature": signature,
    });
    base64::encode(json.to_string())
}

pub fn pending_order(id: i64, user_id: &str, course_id: &str, amount: Money, uuid: &str) -> Order {
    Order {
        id,
        user_id: user_id.to_string(),
        course_id: course_id.to_string(),
        amount,
        commission_percentage: Some(20.0),
        payment_method: PaymentMethod::Esewa,
        payment_reference: None,
        transaction_uuid: uuid.to_string(),
        status: OrderStatus::Pending,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn completed(mut order: Order, payment_reference: &str) -> Order {
    order.status = OrderStatus::Completed;
    order.payment_reference = Some(payment_reference.to_string());
    order
}

/// Spin up the verification route against a mocked backend and post one request.
pub async fn post_verify(user_id: Option<&str>, body: Value, db: MockSettlementDb) -> (StatusCode, String) {
    let _ = env_logger::try_init();
    let api = SettlementApi::new(db);
    let mut req = TestRequest::post().uri("/payments/verify").set_json(&body);
    if let Some(uid) = user_id {
        req = req.insert_header(("X-User-Id", uid));
    }
    let req = req.to_request();
    let app = App::new()
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_esewa_gateway()))
        .app_data(web::Data::new(test_khalti_api()))
        .service(VerifyPaymentRoute::<MockSettlementDb>::new());
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.expect("Error calling service").into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}
