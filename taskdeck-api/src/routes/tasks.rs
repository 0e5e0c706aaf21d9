/// Task endpoints
///
/// Every handler runs behind the session middleware and acts only on tasks
/// owned by the current account.
///
/// # Endpoints
///
/// - `GET  /` - List own tasks, most recent first
/// - `POST /` - Create a task
/// - `GET  /update/:id` - Edit form
/// - `POST /update/:id` - Save edits
/// - `GET  /delete/:id` - Delete a task
/// - `GET  /complete/:id` - Toggle completion

use crate::{
    app::{AppState, CurrentAccount},
    cookies,
    error::{AppError, AppResult},
    views,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    response::{Html, Redirect},
    Extension, Form,
};
use axum_extra::extract::cookie::CookieJar;
use taskdeck_shared::{
    flash::Flash,
    models::task::{Task, TaskInput},
};

/// Task ID taken from the path
///
/// A segment that is not an integer is rejected the same way as an unknown
/// task: flash and redirect home.
#[derive(Debug, Clone, Copy)]
pub struct TaskId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for TaskId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Internal(format!("Missing task id: {e}")))?;

        raw.parse::<i64>()
            .map(TaskId)
            .map_err(|_| AppError::MalformedTaskId(raw))
    }
}

fn flash_home(flash: Flash) -> (CookieJar, Redirect) {
    (CookieJar::new().add(cookies::flash(flash)), Redirect::to("/"))
}

pub async fn index(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let tasks = Task::list_by_owner(&state.db, current.account.id).await?;
    let (jar, flash) = cookies::take_flash(jar);

    Ok((jar, Html(views::index_page(&current.account, &tasks, flash))))
}

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /
/// Content-Type: application/x-www-form-urlencoded
///
/// content=buy+milk&description=&deadline=friday
/// ```
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Form(input): Form<TaskInput>,
) -> AppResult<(CookieJar, Redirect)> {
    Task::create(&state.db, current.account.id, input).await?;
    Ok(flash_home(Flash::TaskAdded))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    TaskId(id): TaskId,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let task = Task::find_owned(&state.db, id, current.account.id).await?;
    let (jar, flash) = cookies::take_flash(jar);

    Ok((jar, Html(views::update_page(&current.account, &task, flash))))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    TaskId(id): TaskId,
    Form(input): Form<TaskInput>,
) -> AppResult<(CookieJar, Redirect)> {
    Task::update(&state.db, id, current.account.id, input)
        .await
        .map_err(|e| AppError::from(e).returning_to(format!("/update/{id}")))?;

    Ok(flash_home(Flash::TaskUpdated))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    TaskId(id): TaskId,
) -> AppResult<(CookieJar, Redirect)> {
    Task::delete(&state.db, id, current.account.id).await?;
    Ok(flash_home(Flash::TaskDeleted))
}

/// Toggle completion; status follows automatically
pub async fn complete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    TaskId(id): TaskId,
) -> AppResult<Redirect> {
    Task::toggle_completed(&state.db, id, current.account.id).await?;
    Ok(Redirect::to("/"))
}
