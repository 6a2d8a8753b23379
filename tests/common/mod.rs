#![allow(dead_code)]

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::{body::MessageBody, http::header, test};
use serde_json::json;
use taskhub::auth::{AuthResponse, TokenCodec};
use taskhub::store::MemoryStore;
use taskhub::AppState;

pub const TEST_SECRET: &str = "integration_test_secret";
pub const TEST_PASSWORD: &str = "Password123!";

/// App state over a fresh in-memory store, with the cheapest bcrypt cost.
pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::with_store(store.clone(), TokenCodec::new(TEST_SECRET), 4);
    (state, store)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn register_user<S, B>(app: &S, name: &str, email: &str) -> Result<AuthResponse, String>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "name": name,
            "email": email,
            "password": TEST_PASSWORD
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    if !status.is_success() {
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    serde_json::from_slice(&body).map_err(|e| format!("Failed to parse registration response: {}", e))
}
