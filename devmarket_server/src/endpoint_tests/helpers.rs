use actix_web::{http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use chrono::{Duration, TimeZone, Utc};
use devmarket_engine::db_types::{Message, NewMessage, Order, OrderStatusType, PaymentStatus};
use log::debug;

use crate::{
    auth::{TokenIssuer, TokenVerifier},
    config::AuthConfig,
    server::json_config,
};

pub const CLIENT: &str = "user-alice";
pub const FREELANCER: &str = "user-bob";
pub const STRANGER: &str = "user-mallory";
pub const ORDER_ID: &str = "order-1";

// A test-only secret. DO NOT re-use it anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new("6d8d9f2c-devmarket-endpoint-tests")
}

pub fn issue_token(user: &str) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token(user.into(), Duration::hours(1)).expect("Failed to sign token")
}

/// Runs `req` against an app configured by `configure`, with token verification and JSON error handling in place.
/// Adds a bearer token for `user`, if one is given.
pub async fn send_request<F>(req: TestRequest, user: Option<&str>, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let req = match user {
        Some(user) => req.insert_header(("Authorization", format!("Bearer {}", issue_token(user)))),
        None => req,
    };
    let app = App::new()
        .app_data(json_config())
        .app_data(web::Data::new(TokenVerifier::new(&get_auth_config())))
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {body}"))
}

pub fn order(status: OrderStatusType) -> Order {
    let created_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Order {
        id: ORDER_ID.into(),
        gig_id: "gig-1".into(),
        client_id: CLIENT.into(),
        freelancer_id: FREELANCER.into(),
        status,
        payment_status: PaymentStatus::Pending,
        created_at,
        updated_at: created_at,
    }
}

pub fn with_status(order: &Order, status: OrderStatusType) -> Order {
    Order { status, updated_at: order.updated_at + Duration::minutes(5), ..order.clone() }
}

pub fn stored_message(message: NewMessage) -> Message {
    Message {
        id: "msg-1".into(),
        sender_id: message.sender_id,
        receiver_id: message.receiver_id,
        order_id: message.order_id,
        content: message.content,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap(),
    }
}
