/// Session and flash cookies
///
/// Both cookies are HttpOnly, SameSite=Lax and scoped to `/`. The session
/// cookie carries a signed token and is marked `Secure` in production; the
/// flash cookie carries a fixed [`Flash`] code and nothing else.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use taskdeck_shared::flash::Flash;

/// Name of the session token cookie
pub const SESSION_COOKIE: &str = "taskdeck_session";

/// Name of the one-shot flash cookie
pub const FLASH_COOKIE: &str = "taskdeck_flash";

fn base(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie holding a freshly signed session token
pub fn session(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = base(SESSION_COOKIE, token);
    cookie.set_secure(secure);
    cookie
}

/// Cookie carrying a flash code to the next page
pub fn flash(flash: Flash) -> Cookie<'static> {
    base(FLASH_COOKIE, flash.code())
}

/// Session token presented by the browser, if any
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Tells the browser to drop its session cookie
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Reads the pending flash and clears it
///
/// Unknown codes are dropped silently.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|cookie| cookie.value().parse::<Flash>().ok());

    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, None);
    }

    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
}
