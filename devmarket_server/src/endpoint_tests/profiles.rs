use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::Utc;
use devmarket_engine::{db_types::User, traits::UserApiError, ProfileApi};
use serde_json::json;

use super::{
    helpers::{json, send_request, CLIENT, STRANGER},
    mocks::MockUserManager,
};
use crate::routes::{MyProfileRoute, UpdateMyProfileRoute};

fn configure(db: MockUserManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(ProfileApi::new(db)))
            .service(MyProfileRoute::<MockUserManager>::new())
            .service(UpdateMyProfileRoute::<MockUserManager>::new());
    }
}

#[actix_web::test]
async fn users_upsert_their_own_profile() {
    let _ = env_logger::try_init().ok();
    let mut db = MockUserManager::new();
    db.expect_upsert_user().withf(|u| u.id.as_str() == CLIENT && u.bio.is_some()).times(1).returning(|u| {
        Ok(User {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
            bio: u.bio,
            avatar_url: u.avatar_url,
            is_admin: false,
            created_at: Utc::now(),
        })
    });
    let req = TestRequest::put().uri("/me").set_json(json!({
        "email": "alice@example.com",
        "full_name": "Alice Client",
        "bio": "Needs a logo"
    }));
    let (status, body) = send_request(req, Some(CLIENT), configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["id"], CLIENT);
    assert_eq!(body["bio"], "Needs a logo");
}

#[actix_web::test]
async fn invalid_profiles_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut db = MockUserManager::new();
    db.expect_upsert_user().never();
    let req = TestRequest::put().uri("/me").set_json(json!({"email": "not-an-email", "full_name": "Alice"}));
    let (status, body) = send_request(req, Some(CLIENT), configure(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("not-an-email is not an email address"), "was: {body}");
}

#[actix_web::test]
async fn taken_emails_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut db = MockUserManager::new();
    db.expect_upsert_user().returning(|u| Err(UserApiError::EmailInUse(u.email)));
    let req = TestRequest::put().uri("/me").set_json(json!({"email": "bob@example.com", "full_name": "Mallory"}));
    let (status, body) = send_request(req, Some(STRANGER), configure(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "Request rejected. The email address bob@example.com is already in use");
}

#[actix_web::test]
async fn unknown_profiles_are_not_found() {
    let _ = env_logger::try_init().ok();
    let mut db = MockUserManager::new();
    db.expect_fetch_user().returning(|_| Ok(None));
    let (status, _) = send_request(TestRequest::get().uri("/me"), Some(STRANGER), configure(db)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
