use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
};
use std::sync::Arc;

use async_trait::async_trait;
use estate::{
    app::build_app,
    auth::{
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
    config::AppConfig,
    error::{AppError, AppResult},
    memory::MemoryStore,
    state::AppState,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn call(
    state: &AppState,
    method: Method,
    path: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut req = Request::builder().method(method).uri(path);
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    build_app(state.clone())
        .oneshot(req.body(body).unwrap())
        .await
        .unwrap()
}

async fn json_body(res: Response<Body>) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// `name=value` part of the session Set-Cookie header.
fn session_cookie(res: &Response<Body>) -> String {
    let raw = res
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap();
    assert!(raw.contains("HttpOnly"), "cookie must be HttpOnly: {raw}");
    raw.split(';').next().unwrap().to_string()
}

async fn signup_and_signin(state: &AppState, name: &str) -> (String, String) {
    let res = call(
        state,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "username": name, "email": format!("{name}@example.com"), "password": "pw-123456" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = call(
        state,
        Method::POST,
        "/api/auth/signin",
        None,
        Some(json!({ "email": format!("{name}@example.com"), "password": "pw-123456" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res);
    let user = json_body(res).await;
    (cookie, user["id"].as_str().unwrap().to_string())
}

fn listing_body() -> Value {
    json!({
        "name": "Modern loft downtown",
        "description": "Open plan, lots of light",
        "address": "10 High St",
        "type": "sale",
        "bedrooms": 2,
        "bathrooms": 2,
        "regularPrice": 250000,
        "discountPrice": 240000,
        "offer": true,
        "parking": true,
        "furnished": false,
        "imageUrls": ["https://img.example.com/loft.jpg"]
    })
}

#[tokio::test]
async fn signup_acknowledges_without_leaking_password() {
    let state = AppState::in_memory();
    let res = call(
        &state,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "username": "amy", "email": "amy@example.com", "password": "plain-secret" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(res.headers().get(header::SET_COOKIE).is_none());
    let body = json_body(res).await;
    assert_eq!(body, json!("User created successfully!"));

    let dup = call(
        &state,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "username": "amy2", "email": "amy@example.com", "password": "x" })),
    )
    .await;
    assert_eq!(dup.status(), StatusCode::CONFLICT);
    let body = json_body(dup).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 409);
}

#[tokio::test]
async fn signin_errors_and_success_shape() {
    let state = AppState::in_memory();
    let (_, _) = signup_and_signin(&state, "ben").await;

    let res = call(
        &state,
        Method::POST,
        "/api/auth/signin",
        None,
        Some(json!({ "email": "ghost@example.com", "password": "x" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(res).await["message"], "User not found!");

    let res = call(
        &state,
        Method::POST,
        "/api/auth/signin",
        None,
        Some(json!({ "email": "ben@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(res).await["message"], "Wrong credentials!");

    let res = call(
        &state,
        Method::POST,
        "/api/auth/signin",
        None,
        Some(json!({ "email": "ben@example.com", "password": "pw-123456" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let raw = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap().to_string();
    assert!(raw.starts_with("access_token="));
    assert!(!raw.contains("Max-Age"));
    let user = json_body(res).await;
    assert_eq!(user["username"], "ben");
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
async fn google_signin_provisions_once() {
    let state = AppState::in_memory();
    let body = json!({ "name": "Cleo Park", "email": "cleo@example.com", "photo": "https://img/cleo.png" });

    let first = call(&state, Method::POST, "/api/auth/google", None, Some(body.clone())).await;
    assert_eq!(first.status(), StatusCode::OK);
    session_cookie(&first);
    let first = json_body(first).await;

    let second = call(&state, Method::POST, "/api/auth/google", None, Some(body)).await;
    assert_eq!(second.status(), StatusCode::OK);
    let second = json_body(second).await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["avatar"], "https://img/cleo.png");
}

#[tokio::test]
async fn listing_lifecycle_with_ownership() {
    let state = AppState::in_memory();
    let (owner_cookie, owner_id) = signup_and_signin(&state, "dora").await;
    let (other_cookie, _) = signup_and_signin(&state, "eli").await;

    let res = call(&state, Method::POST, "/api/listing/create", None, Some(listing_body())).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = call(
        &state,
        Method::POST,
        "/api/listing/create",
        Some("access_token=garbage"),
        Some(listing_body()),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = call(
        &state,
        Method::POST,
        "/api/listing/create",
        Some(&owner_cookie),
        Some(listing_body()),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = json_body(res).await;
    assert_eq!(created["userRef"], owner_id.as_str());
    let id = created["id"].as_str().unwrap().to_string();

    // public read
    let res = call(&state, Method::GET, &format!("/api/listing/get/{id}"), None, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["name"], "Modern loft downtown");

    let res = call(
        &state,
        Method::POST,
        &format!("/api/listing/update/{id}"),
        Some(&other_cookie),
        Some(json!({ "bedrooms": 5 })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = call(
        &state,
        Method::DELETE,
        &format!("/api/listing/delete/{id}"),
        Some(&other_cookie),
        None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = call(
        &state,
        Method::POST,
        &format!("/api/listing/update/{id}"),
        Some(&owner_cookie),
        Some(json!({ "bedrooms": 5 })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = json_body(res).await;
    assert_eq!(updated["bedrooms"], 5);
    assert_eq!(updated["address"], "10 High St");

    let res = call(
        &state,
        Method::GET,
        &format!("/api/user/listings/{owner_id}"),
        Some(&owner_cookie),
        None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await.as_array().unwrap().len(), 1);

    let res = call(
        &state,
        Method::DELETE,
        &format!("/api/listing/delete/{id}"),
        Some(&owner_cookie),
        None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!("Listing has been deleted!"));

    let res = call(&state, Method::GET, &format!("/api/listing/get/{id}"), None, None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_gets_shared_error_body() {
    let state = AppState::in_memory();
    let res = call(
        &state,
        Method::POST,
        "/api/auth/signin",
        None,
        Some(json!({ "email": "missing-password@example.com" })),
    )
    .await;
    assert!(res.status().is_client_error());
    let body = json_body(res).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn signout_clears_cookie() {
    let state = AppState::in_memory();
    let res = call(&state, Method::GET, "/api/auth/signout", None, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let raw = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap().to_string();
    assert!(raw.starts_with("access_token="));
    assert!(raw.contains("Max-Age=0"));
    assert_eq!(json_body(res).await, json!("User has been logged out!"));
}

/// User store whose every call fails the way a dropped connection would.
struct BrokenUsers;

#[async_trait]
impl UserRepo for BrokenUsers {
    async fn find_by_email(&self, _email: &str) -> AppResult<Option<User>> {
        Err(AppError::Internal(anyhow::anyhow!("db at 10.0.0.3 refused")))
    }

    async fn create(&self, _user: NewUser) -> AppResult<User> {
        Err(AppError::Internal(anyhow::anyhow!("db at 10.0.0.3 refused")))
    }
}

fn broken_state(expose_error_details: bool) -> AppState {
    let config = AppConfig {
        expose_error_details,
        ..AppConfig::local("test-secret")
    };
    AppState::from_parts(Arc::new(BrokenUsers), Arc::new(MemoryStore::new()), config)
}

#[tokio::test]
async fn internal_error_details_follow_each_state_config() {
    let signin = json!({ "email": "ivy@example.com", "password": "pw" });

    // built first so a hiding state created later cannot inherit its setting
    let verbose = broken_state(true);
    let quiet = broken_state(false);

    let res = call(&quiet, Method::POST, "/api/auth/signin", None, Some(signin.clone())).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 500);
    assert_eq!(body["message"], "Internal Server Error");

    let res = call(&verbose, Method::POST, "/api/auth/signin", None, Some(signin)).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(res).await["message"], "db at 10.0.0.3 refused");

    // client errors keep their message when details are hidden
    let res = call(&quiet, Method::GET, "/api/listing/get/not-a-uuid", None, None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(res).await["message"], "Listing not found!");
}
