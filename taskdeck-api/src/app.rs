/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with every route and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::AppState, config::Config};
/// use taskdeck_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let state = AppState::new(pool, config);
/// let app = taskdeck_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config, cookies, error::AppError, middleware::security::SecurityHeadersLayer, routes,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use sqlx::SqlitePool;
use std::sync::Arc;
use taskdeck_shared::{
    auth::session::{self, SessionState},
    flash::Flash,
    models::account::Account,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use uuid::Uuid;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Key for signing and checking session tokens
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// The logged-in account, inserted into request extensions by [`require_session`]
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    pub account: Account,
    pub session_id: Uuid,
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET       /health         liveness + database check
/// ├── GET|POST  /register       create account
/// ├── GET|POST  /login          start session
/// └── (session required)
///     ├── GET       /logout
///     ├── GET       /profile
///     ├── GET|POST  /                list / create tasks
///     ├── GET|POST  /update/:id      edit task
///     ├── GET       /delete/:id
///     └── GET       /complete/:id    toggle completion
/// ```
///
/// # Middleware Stack
///
/// 1. Session check (protected routes only)
/// 2. Logging (tower-http TraceLayer)
/// 3. Security headers
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/register",
            get(routes::auth::register_form).post(routes::auth::register),
        )
        .route(
            "/login",
            get(routes::auth::login_form).post(routes::auth::login),
        );

    let protected_routes = Router::new()
        .route("/logout", get(routes::auth::logout))
        .route("/profile", get(routes::profile::profile))
        .route(
            "/",
            get(routes::tasks::index).post(routes::tasks::create),
        )
        .route(
            "/update/:id",
            get(routes::tasks::edit_form).post(routes::tasks::update),
        )
        .route("/delete/:id", get(routes::tasks::delete))
        .route("/complete/:id", get(routes::tasks::complete))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Session middleware
///
/// Resolves the session cookie and injects [`CurrentAccount`] into request
/// extensions. Anonymous requests are redirected to `/login`.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let resolved = match cookies::session_token(&jar) {
        Some(token) => session::resolve(&state.db, &token, state.session_secret()).await?,
        None => SessionState::Anonymous,
    };

    let current = match resolved {
        SessionState::Authenticated {
            account_id,
            session_id,
        } => Account::find_by_id(&state.db, account_id)
            .await?
            .map(|account| CurrentAccount {
                account,
                session_id,
            }),
        SessionState::Anonymous => None,
    };

    match current {
        Some(current) => {
            req.extensions_mut().insert(current);
            Ok(next.run(req).await)
        }
        None => {
            tracing::debug!(path = %req.uri().path(), "Anonymous request to protected route");
            let jar = cookies::clear_session(jar).add(cookies::flash(Flash::LoginRequired));
            Ok((jar, Redirect::to("/login")).into_response())
        }
    }
}
