//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which builds an in-memory database, a config and
//! the full [`AppContext`], plus helpers for driving the router with
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use videometa::auth::Capability;
use videometa::config::{AuthConfig, Config, UserConfig};
use videometa::server::{create_router, AppContext};
use videometa_db::pool::{init_memory_pool, DbPool};

pub const EDITOR_KEY: &str = "editor-key";
pub const READER_KEY: &str = "reader-key";
pub const PUBLISHER_PASSWORD: &str = "abcd efgh ijkl mnop";

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
}

impl TestHarness {
    /// Default configuration: auth disabled, every request is an administrator.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Auth enabled with an editor (API key), a reader (API key) and a
    /// publisher (Basic application password).
    pub fn with_auth() -> Self {
        let mut config = Config::default();
        config.auth = AuthConfig {
            enabled: true,
            users: vec![
                UserConfig {
                    name: "editor".into(),
                    password_hash: None,
                    api_key: Some(EDITOR_KEY.into()),
                    capabilities: vec![Capability::Read, Capability::EditPosts],
                },
                UserConfig {
                    name: "reader".into(),
                    password_hash: None,
                    api_key: Some(READER_KEY.into()),
                    capabilities: vec![Capability::Read],
                },
                UserConfig {
                    name: "publisher".into(),
                    password_hash: Some(bcrypt::hash(PUBLISHER_PASSWORD, 4).unwrap()),
                    api_key: None,
                    capabilities: vec![
                        Capability::Read,
                        Capability::EditPosts,
                        Capability::PublishPosts,
                        Capability::DeletePosts,
                    ],
                },
            ],
        };
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(config, db.clone());
        Self { ctx, db }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    /// Send a request and return the status with the decoded JSON body
    /// (`Value::Null` for an empty body).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        auth: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), None).await
    }
}

pub fn bearer(key: &str) -> Option<String> {
    Some(format!("Bearer {key}"))
}

pub fn basic(user: &str, password: &str) -> Option<String> {
    Some(format!("Basic {}", STANDARD.encode(format!("{user}:{password}"))))
}
