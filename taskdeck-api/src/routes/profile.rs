/// Profile page: the current account and its task counters

use crate::{
    app::{AppState, CurrentAccount},
    cookies,
    error::AppResult,
    views,
};
use axum::{extract::State, response::Html, Extension};
use axum_extra::extract::cookie::CookieJar;
use taskdeck_shared::models::task::Task;

pub async fn profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let stats = Task::stats_by_owner(&state.db, current.account.id).await?;
    let (jar, flash) = cookies::take_flash(jar);

    Ok((jar, Html(views::profile_page(&current.account, stats, flash))))
}
