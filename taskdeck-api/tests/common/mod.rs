//! Common test utilities for integration tests
//!
//! Every `TestContext` owns a private in-memory SQLite database with the
//! schema applied, and a router built exactly as the binary builds it.
//! Requests go through `tower::Service::call`; cookies are carried by hand.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use sqlx::SqlitePool;
use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::Config;
use taskdeck_shared::db::migrations::run_migrations;
use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
use taskdeck_shared::models::account::Account;
use tower::Service as _;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context with a fresh database
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_lookup(|key| match key {
            "SESSION_SECRET" => Some(TEST_SECRET.to_string()),
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            _ => None,
        })?;

        let db = create_pool(DatabaseConfig::in_memory()).await?;
        run_migrations(&db).await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext { db, app, config })
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().call(request).await.unwrap()
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, path: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).unwrap()).await
    }

    /// Registers `username` (email `<username>@x.com`, password `p1`)
    pub async fn register(&self, username: &str) -> Response<Body> {
        let form = format!("username={username}&email={username}%40x.com&name={username}&password=p1");
        self.post_form("/register", &form, None).await
    }

    /// Logs in and returns the `Cookie` header value for the new session
    pub async fn login(&self, username: &str, password: &str) -> Option<String> {
        let response = self
            .post_form("/login", &format!("username={username}&password={password}"), None)
            .await;
        cookie_pair(&response, "taskdeck_session")
    }

    /// Registers and logs in, returning the session cookie
    pub async fn signed_in(&self, username: &str) -> String {
        self.register(username).await;
        self.login(username, "p1").await.expect("login should set a session cookie")
    }

    pub async fn account(&self, username: &str) -> Account {
        Account::find_by_username(&self.db, username)
            .await
            .unwrap()
            .expect("account exists")
    }
}

/// `Location` header of a redirect
pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// `name=value` for a cookie set by the response, ignoring removals
pub fn cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .find(|pair| {
            pair.split_once('=')
                .map(|(n, value)| n == name && !value.is_empty())
                .unwrap_or(false)
        })
        .map(str::to_string)
}

/// Flash code set by the response
pub fn flash_code(response: &Response<Body>) -> Option<String> {
    cookie_pair(response, "taskdeck_flash")
        .and_then(|pair| pair.split_once('=').map(|(_, v)| v.to_string()))
}

/// Whether the response tells the browser to drop cookie `name`
pub fn removes_cookie(response: &Response<Body>, name: &str) -> bool {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&format!("{name}=;")) || (v.starts_with(&format!("{name}=")) && v.contains("Max-Age=0")))
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}
