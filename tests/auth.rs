mod common;

use std::net::TcpListener;
use std::sync::Arc;

use actix_web::{http::StatusCode, rt, test, App, HttpServer};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use taskhub::auth::{AuthResponse, TokenCodec};
use taskhub::error::INTERNAL_ERROR_MESSAGE;
use taskhub::models::{NewUser, ProfileUpdate, Task, TaskPatch, TaskQuery, UserRecord};
use taskhub::routes;
use taskhub::store::{TaskStore, UserStore};
use taskhub::{AppError, AppState};
use uuid::Uuid;

use common::{bearer, register_user, test_state, TEST_PASSWORD};

#[actix_rt::test]
async fn test_register_and_login_flow() {
    let (state, _store) = test_state();
    let app = test::init_service(App::new().configure(routes::configure(state))).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "name": "Maria Silva",
            "email": "maria@example.com",
            "password": TEST_PASSWORD
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["name"], "Maria Silva");
    assert_eq!(body["user"]["email"], "maria@example.com");
    assert!(body["user"]["createdAt"].is_string());
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["token"].as_str().map_or(false, |t| !t.is_empty()));

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "maria@example.com", "password": TEST_PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let login: AuthResponse = test::read_body_json(resp).await;
    assert_eq!(login.user.email, "maria@example.com");

    // The login token opens the protected scope
    let req = test::TestRequest::get()
        .uri("/api/users/profile")
        .insert_header(bearer(&login.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(profile["id"], json!(login.user.id));
}

#[actix_rt::test]
async fn test_duplicate_registration_conflicts() {
    let (state, _store) = test_state();
    let app = test::init_service(App::new().configure(routes::configure(state))).await;

    let first = register_user(&app, "First", "dup@example.com").await.unwrap();

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "name": "Second",
            "email": "dup@example.com",
            "password": "another-password"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "A user with this email already exists" }));

    // The original account is untouched
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "dup@example.com", "password": TEST_PASSWORD }))
        .to_request();
    let login: AuthResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(login.user.id, first.user.id);
    assert_eq!(login.user.name, "First");
}

#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let (state, _store) = test_state();
    let app = test::init_service(App::new().configure(routes::configure(state))).await;
    register_user(&app, "Ada", "ada@example.com").await.unwrap();

    let wrong_password = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "ada@example.com", "password": "not-the-password" }))
        .to_request();
    let resp = test::call_service(&app, wrong_password).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let wrong_password_body = test::read_body(resp).await;

    let unknown_email = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "ghost@example.com", "password": TEST_PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, unknown_email).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let unknown_email_body = test::read_body(resp).await;

    assert_eq!(wrong_password_body, unknown_email_body);
    let body: serde_json::Value = serde_json::from_slice(&wrong_password_body).unwrap();
    assert_eq!(body, json!({ "error": "Invalid credentials" }));
}

#[actix_rt::test]
async fn test_invalid_payloads_are_rejected() {
    let (state, _store) = test_state();
    let app = test::init_service(App::new().configure(routes::configure(state))).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "name": "M", "email": "not-an-email", "password": "123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid data");
    for field in ["name", "email", "password"] {
        assert!(body["details"].get(field).is_some(), "missing details for {}", field);
    }

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"email\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid data");
}

#[actix_rt::test]
async fn test_missing_or_malformed_header_is_rejected_before_handler() {
    let (state, store) = test_state();
    let app = test::init_service(App::new().configure(routes::configure(state))).await;
    let payload = json!({ "title": "Never stored", "priority": "low", "status": "pending" });

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Authentication token not provided" }));

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(store.task_count().await, 0);
}

#[actix_rt::test]
async fn test_expired_and_foreign_tokens_are_rejected() {
    let (state, _store) = test_state();
    let tokens = state.tokens.clone();
    let app = test::init_service(App::new().configure(routes::configure(state))).await;
    let user = register_user(&app, "Ada", "ada@example.com").await.unwrap();

    let expired = tokens
        .issue_at(user.user.id, Utc::now() - Duration::days(8))
        .unwrap();
    let foreign = TokenCodec::new("some-other-secret").issue(user.user.id).unwrap();

    for token in [expired.as_str(), foreign.as_str(), "not.a.jwt"] {
        let req = test::TestRequest::get()
            .uri("/api/tasks")
            .insert_header(bearer(token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Invalid or expired token" }));
    }
}

#[actix_rt::test]
async fn test_token_of_deleted_user_is_rejected() {
    let (state, store) = test_state();
    let app = test::init_service(App::new().configure(routes::configure(state))).await;
    let user = register_user(&app, "Gone", "gone@example.com").await.unwrap();

    assert!(store.remove_user(user.user.id).await);

    let req = test::TestRequest::get()
        .uri("/api/users/profile")
        .insert_header(bearer(&user.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "User not found" }));
}

/// A store whose every operation fails, as if the database were down.
struct FailingStore;

fn unavailable() -> AppError {
    AppError::DatabaseError("connection refused".into())
}

#[async_trait]
impl UserStore for FailingStore {
    async fn find_user(&self, _id: Uuid) -> Result<Option<UserRecord>, AppError> {
        Err(unavailable())
    }

    async fn find_user_by_email(&self, _email: &str) -> Result<Option<UserRecord>, AppError> {
        Err(unavailable())
    }

    async fn create_user(&self, _user: NewUser) -> Result<UserRecord, AppError> {
        Err(unavailable())
    }

    async fn update_user(
        &self,
        _id: Uuid,
        _update: ProfileUpdate,
    ) -> Result<Option<UserRecord>, AppError> {
        Err(unavailable())
    }
}

#[async_trait]
impl TaskStore for FailingStore {
    async fn list_tasks(&self, _user_id: Uuid, _query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        Err(unavailable())
    }

    async fn find_task(&self, _user_id: Uuid, _id: Uuid) -> Result<Option<Task>, AppError> {
        Err(unavailable())
    }

    async fn create_task(&self, _task: Task) -> Result<Task, AppError> {
        Err(unavailable())
    }

    async fn update_task(
        &self,
        _user_id: Uuid,
        _id: Uuid,
        _patch: TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        Err(unavailable())
    }

    async fn delete_task(&self, _user_id: Uuid, _id: Uuid) -> Result<bool, AppError> {
        Err(unavailable())
    }
}

#[actix_rt::test]
async fn test_store_failure_is_internal_error() {
    let tokens = TokenCodec::new(common::TEST_SECRET);
    let token = tokens.issue(Uuid::new_v4()).unwrap();
    let state = AppState::with_store(Arc::new(FailingStore), tokens, 4);
    let app = test::init_service(App::new().configure(routes::configure(state))).await;

    // Lookup inside the gate
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": INTERNAL_ERROR_MESSAGE }));

    // Lookup inside a public handler
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "ada@example.com", "password": TEST_PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": INTERNAL_ERROR_MESSAGE }));
}

#[actix_rt::test]
async fn test_public_routes_need_no_token() {
    let (state, _store) = test_state();
    let app = test::init_service(App::new().configure(routes::configure(state))).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Task Management API");

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}

#[actix_rt::test]
async fn test_create_task_unauthorized_over_http() {
    let (state, _store) = test_state();

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = HttpServer::new(move || App::new().configure(routes::configure(state.clone())))
        .workers(1)
        .listen(listener)
        .expect("Failed to listen")
        .run();
    let handle = server.handle();
    rt::spawn(server);

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/api/tasks", port))
        .json(&json!({ "title": "Unauthorized Task", "priority": "high", "status": "pending" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Authentication token not provided");

    handle.stop(true).await;
}
