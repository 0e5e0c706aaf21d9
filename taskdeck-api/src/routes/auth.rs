/// Account endpoints
///
/// # Endpoints
///
/// - `GET  /register` - Registration form
/// - `POST /register` - Create account, then redirect to `/login`
/// - `GET  /login` - Login form
/// - `POST /login` - Start a session, then redirect to `/`
/// - `GET  /logout` - End the session, then redirect to `/login`

use crate::{
    app::{AppState, CurrentAccount},
    cookies,
    error::AppResult,
    views,
};
use axum::{
    extract::State,
    response::{Html, Redirect},
    Extension, Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use taskdeck_shared::{
    auth::{
        credentials::{self, NewAccount},
        session,
    },
    flash::Flash,
};

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

pub async fn register_form(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flash) = cookies::take_flash(jar);
    (jar, Html(views::register_page(flash)))
}

/// Register a new account
///
/// # Endpoint
///
/// ```text
/// POST /register
/// Content-Type: application/x-www-form-urlencoded
///
/// username=ana&email=a%40x.com&name=Ana&password=p1
/// ```
///
/// # Responses
///
/// - `303 -> /login` with "Account created!"
/// - `303 -> /register` with "Username or email already exists!" or a field error
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<NewAccount>,
) -> AppResult<(CookieJar, Redirect)> {
    credentials::register(&state.db, form).await?;

    let jar = CookieJar::new().add(cookies::flash(Flash::AccountCreated));
    Ok((jar, Redirect::to("/login")))
}

pub async fn login_form(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flash) = cookies::take_flash(jar);
    (jar, Html(views::login_page(flash)))
}

/// Check credentials and start a session
///
/// On success the browser receives the session cookie and is sent to `/`;
/// on failure it is sent back to `/login` with "Invalid credentials.".
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<(CookieJar, Redirect)> {
    let account = credentials::authenticate(&state.db, &form.username, &form.password).await?;

    let (_, token) = session::establish(
        &state.db,
        account.id,
        state.session_secret(),
        state.config.session_ttl(),
    )
    .await?;

    let jar = jar.add(cookies::session(token, state.config.api.production));
    Ok((jar, Redirect::to("/")))
}

/// End the current session
///
/// The session row is deleted, so the old cookie stops working even if the
/// browser keeps it.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Redirect)> {
    session::end(&state.db, current.session_id).await?;
    tracing::info!(account_id = current.account.id, "Logged out");

    let jar = cookies::clear_session(jar).add(cookies::flash(Flash::LoggedOut));
    Ok((jar, Redirect::to("/login")))
}
