#![allow(dead_code)]

use anyhow::Result;
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use coffeeshop_api::auth::TokenVerifier;
use coffeeshop_api::config::AuthConfig;
use coffeeshop_api::handlers;
use coffeeshop_api::store::DrinkStore;
use coffeeshop_api::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_DOMAIN: &str = "test.issuer.local";
pub const TEST_AUDIENCE: &str = "drinks";

/// Build the full router over a fresh in-memory store and an HS256 verifier.
pub async fn build_app() -> Result<Router> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let store = DrinkStore::new(pool);
    store.ensure_schema().await?;

    let verifier = TokenVerifier::new(AuthConfig {
        domain: TEST_DOMAIN.to_string(),
        audience: TEST_AUDIENCE.to_string(),
        algorithm: "HS256".to_string(),
        secret: Some(TEST_SECRET.to_string()),
    })?;

    Ok(handlers::app(AppState::new(store, verifier)))
}

/// Mint a token carrying the given permission strings.
pub fn token(permissions: &[&str]) -> String {
    sign(json!({
        "iss": format!("https://{}/", TEST_DOMAIN),
        "aud": TEST_AUDIENCE,
        "sub": "auth0|test-user",
        "exp": 4102444800i64,
        "permissions": permissions,
    }))
}

/// Token from the full-access role.
pub fn manager_token() -> String {
    token(&["get:drinks-detail", "post:drinks", "patch:drinks", "delete:drinks"])
}

/// Otherwise valid token whose payload has no permissions claim at all.
pub fn token_without_permissions_claim() -> String {
    sign(json!({
        "iss": format!("https://{}/", TEST_DOMAIN),
        "aud": TEST_AUDIENCE,
        "sub": "auth0|test-user",
        "exp": 4102444800i64,
    }))
}

fn sign(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("token signing")
}

/// Drive one request through the router and decode the JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    path: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> Result<(u16, Value)> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| anyhow::anyhow!("request failed: {e}"))?;
    let status = response.status().as_u16();
    let bytes = response.into_body().collect().await?.to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}
