use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use devmarket_engine::{ConnectionRegistry, DeliveryChannel, MessageDispatcher};
use serde_json::json;

use super::{
    helpers::{json, send_request, stored_message, CLIENT, FREELANCER},
    mocks::MockMessageManager,
};
use crate::{
    routes::{ConversationRoute, SendMessageRoute},
    ws::handle_client_frame,
};

fn configure(db: MockMessageManager, registry: ConnectionRegistry) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = MessageDispatcher::new(db, registry);
        cfg.app_data(web::Data::new(api))
            .service(SendMessageRoute::<MockMessageManager>::new())
            .service(ConversationRoute::<MockMessageManager>::new());
    }
}

fn db_accepting_messages() -> MockMessageManager {
    let mut db = MockMessageManager::new();
    db.expect_user_exists().returning(|_| Ok(true));
    db.expect_insert_message().times(1).returning(|m| Ok(stored_message(m)));
    db
}

#[actix_web::test]
async fn messages_are_stored_and_pushed_to_online_recipients() {
    let _ = env_logger::try_init().ok();
    let registry = ConnectionRegistry::new();
    let (channel, mut outbox) = DeliveryChannel::new();
    registry.register(FREELANCER.into(), channel);
    let req = TestRequest::post().uri("/messages").set_json(json!({"receiver_id": FREELANCER, "content": "Hi Bob"}));
    let (status, body) = send_request(req, Some(CLIENT), configure(db_accepting_messages(), registry)).await;
    assert_eq!(status, StatusCode::CREATED);
    let body = json(&body);
    assert_eq!(body["sender_id"], CLIENT);
    assert_eq!(body["content"], "Hi Bob");

    let frame = json(&outbox.try_recv().expect("The recipient should have received a push"));
    assert_eq!(frame["type"], "message");
    assert_eq!(frame["message"]["id"], "msg-1");
    assert!(outbox.try_recv().is_err());
}

#[actix_web::test]
async fn the_sender_is_taken_from_the_token() {
    let _ = env_logger::try_init().ok();
    let mut db = MockMessageManager::new();
    db.expect_user_exists().returning(|_| Ok(true));
    db.expect_insert_message().withf(|m| m.sender_id.as_str() == CLIENT).returning(|m| Ok(stored_message(m)));
    let req = TestRequest::post().uri("/messages").set_json(json!({
        "receiver_id": FREELANCER,
        "content": "It's really me",
        "sender_id": "someone-else"
    }));
    let (status, body) = send_request(req, Some(CLIENT), configure(db, ConnectionRegistry::new())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json(&body)["sender_id"], CLIENT);
}

#[actix_web::test]
async fn unknown_recipients_are_not_found() {
    let _ = env_logger::try_init().ok();
    let mut db = MockMessageManager::new();
    db.expect_user_exists().returning(|_| Ok(false));
    db.expect_insert_message().never();
    let req = TestRequest::post().uri("/messages").set_json(json!({"receiver_id": "ghost", "content": "Hello?"}));
    let (status, body) = send_request(req, Some(CLIENT), configure(db, ConnectionRegistry::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"], "The data was not found. Recipient ghost does not exist");
}

#[actix_web::test]
async fn empty_messages_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut db = MockMessageManager::new();
    db.expect_insert_message().never();
    let req = TestRequest::post().uri("/messages").set_json(json!({"receiver_id": FREELANCER, "content": "  "}));
    let (status, _) = send_request(req, Some(CLIENT), configure(db, ConnectionRegistry::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn conversation_history() {
    let _ = env_logger::try_init().ok();
    let mut db = MockMessageManager::new();
    db.expect_fetch_conversation()
        .withf(|user, other, page| {
            user.as_str() == CLIENT && other.as_str() == FREELANCER && page.skip == 0 && page.limit == 20
        })
        .returning(|user, other, _| {
            let first = devmarket_engine::db_types::NewMessage::new(user.clone(), other.clone(), "Hi");
            Ok(vec![stored_message(first)])
        });
    let req = TestRequest::get().uri(&format!("/messages/{FREELANCER}?limit=20"));
    let (status, body) = send_request(req, Some(CLIENT), configure(db, ConnectionRegistry::new())).await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body[0]["content"], "Hi");
    assert_eq!(body[0]["receiver_id"], FREELANCER);
}

#[actix_web::test]
async fn socket_frames_send_messages() {
    let _ = env_logger::try_init().ok();
    let api = MessageDispatcher::new(db_accepting_messages(), ConnectionRegistry::new());
    let frame = json!({"type": "send", "receiver_id": FREELANCER, "content": "Over the socket"}).to_string();
    let ack = json(&handle_client_frame(&CLIENT.into(), &frame, &api).await);
    assert_eq!(ack["type"], "sent");
    assert_eq!(ack["message"]["sender_id"], CLIENT);
    assert_eq!(ack["message"]["content"], "Over the socket");
}

#[actix_web::test]
async fn bad_socket_frames_get_error_acks() {
    let _ = env_logger::try_init().ok();
    let mut db = MockMessageManager::new();
    db.expect_user_exists().returning(|_| Ok(false));
    db.expect_insert_message().never();
    let api = MessageDispatcher::new(db, ConnectionRegistry::new());

    let ack = json(&handle_client_frame(&CLIENT.into(), "not json", &api).await);
    assert_eq!(ack["type"], "error");
    assert!(ack["message"].as_str().unwrap().starts_with("Unrecognised frame"));

    let frame = json!({"type": "send", "receiver_id": "ghost", "content": "Boo"}).to_string();
    let ack = json(&handle_client_frame(&CLIENT.into(), &frame, &api).await);
    assert_eq!(ack, json!({"type": "error", "message": "Recipient ghost does not exist"}));
}
