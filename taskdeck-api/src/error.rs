/// Error handling for the web server
///
/// Handlers return `Result<T, AppError>`. Expected failures (duplicate
/// registration, bad login, someone else's task, a bad form field) become a
/// `303 See Other` back to a sensible page with a flash message; anything
/// else is logged and rendered as a generic 500 page.
///
/// # Example
///
/// ```no_run
/// use axum::response::Redirect;
/// use taskdeck_api::error::AppResult;
///
/// async fn handler() -> AppResult<Redirect> {
///     Ok(Redirect::to("/"))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::fmt;
use taskdeck_shared::{
    auth::{credentials::CredentialError, session::SessionError},
    flash::{Flash, FormField},
    models::task::TaskError,
};

use crate::{cookies, views};

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

/// Unified handler error
#[derive(Debug)]
pub enum AppError {
    /// Username or email already registered
    Duplicate,

    /// Unknown username or wrong password
    InvalidCredentials,

    /// Task does not exist
    NotFound(i64),

    /// Path segment is not a task ID
    MalformedTaskId(String),

    /// Task belongs to another account
    Unauthorized(i64),

    /// A form field is missing or malformed; the user is sent back to `return_to`
    Validation {
        field: Option<FormField>,
        message: String,
        return_to: String,
    },

    /// Anything the user cannot fix (500)
    Internal(String),
}

impl AppError {
    /// Sends a validation failure back to the form at `path`
    pub fn returning_to(self, path: impl Into<String>) -> Self {
        match self {
            AppError::Validation { field, message, .. } => AppError::Validation {
                field,
                message,
                return_to: path.into(),
            },
            other => other,
        }
    }

    /// The flash shown to the user, if this error is shown as one
    pub fn flash(&self) -> Option<Flash> {
        match self {
            AppError::Duplicate => Some(Flash::AccountExists),
            AppError::InvalidCredentials => Some(Flash::InvalidCredentials),
            AppError::NotFound(_) | AppError::MalformedTaskId(_) => Some(Flash::TaskNotFound),
            AppError::Unauthorized(_) => Some(Flash::Unauthorized),
            AppError::Validation { field, .. } => {
                Some(Flash::Invalid(field.unwrap_or(FormField::Content)))
            }
            AppError::Internal(_) => None,
        }
    }

    fn redirect_target(&self) -> &str {
        match self {
            AppError::Duplicate => "/register",
            AppError::InvalidCredentials => "/login",
            AppError::NotFound(_) | AppError::MalformedTaskId(_) | AppError::Unauthorized(_) => "/",
            AppError::Validation { return_to, .. } => return_to,
            AppError::Internal(_) => "/",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Duplicate => write!(f, "Username or email already registered"),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::NotFound(id) => write!(f, "Task {} not found", id),
            AppError::MalformedTaskId(raw) => write!(f, "Not a task id: {:?}", raw),
            AppError::Unauthorized(id) => write!(f, "Task {} belongs to another account", id),
            AppError::Validation { message, .. } => write!(f, "Validation failed: {}", message),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(msg) = &self {
            // Log internal errors but don't expose details to clients
            tracing::error!("Internal error: {}", msg);
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(views::error_page())).into_response();
        }

        match self.flash() {
            Some(flash) => {
                tracing::debug!(flash = %flash, "Request rejected: {}", self);
                let jar = CookieJar::new().add(cookies::flash(flash));
                (jar, Redirect::to(self.redirect_target())).into_response()
            }
            None => (StatusCode::INTERNAL_SERVER_ERROR, Html(views::error_page())).into_response(),
        }
    }
}

impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(id) => AppError::NotFound(id),
            TaskError::Unauthorized { task_id, .. } => AppError::Unauthorized(task_id),
            TaskError::Validation { field, message } => AppError::Validation {
                field: FormField::from_name(&field),
                message,
                return_to: "/".to_string(),
            },
            TaskError::Database(e) => AppError::Internal(format!("Database error: {}", e)),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Duplicate => AppError::Duplicate,
            CredentialError::InvalidCredentials => AppError::InvalidCredentials,
            CredentialError::Validation { field, message } => AppError::Validation {
                field: FormField::from_name(&field),
                message,
                return_to: "/register".to_string(),
            },
            CredentialError::Password(e) => {
                AppError::Internal(format!("Password operation failed: {}", e))
            }
            CredentialError::Database(e) => AppError::Internal(format!("Database error: {}", e)),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Internal(format!("Session error: {}", err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(format!("Database error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    fn set_cookie(response: &Response) -> String {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join("; ")
    }

    #[test]
    fn test_duplicate_redirects_to_register() {
        let response = AppError::Duplicate.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/register");
        assert!(set_cookie(&response).contains("taskdeck_flash=account_exists"));
    }

    #[test]
    fn test_invalid_credentials_redirects_to_login() {
        let response = AppError::InvalidCredentials.into_response();
        assert_eq!(location(&response), "/login");
        assert!(set_cookie(&response).contains("invalid_credentials"));
    }

    #[test]
    fn test_task_errors_redirect_home() {
        let response = AppError::from(TaskError::Unauthorized { task_id: 4, account_id: 9 }).into_response();
        assert_eq!(location(&response), "/");
        assert!(set_cookie(&response).contains("taskdeck_flash=unauthorized"));

        let response = AppError::from(TaskError::NotFound(4)).into_response();
        assert!(set_cookie(&response).contains("task_not_found"));
    }

    #[test]
    fn test_malformed_task_id_is_shown_as_not_found() {
        let response = AppError::MalformedTaskId("abc".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        assert!(set_cookie(&response).contains("taskdeck_flash=task_not_found"));
    }

    #[test]
    fn test_validation_returns_to_form() {
        let err = AppError::from(TaskError::Validation {
            field: "content".to_string(),
            message: "Content is required".to_string(),
        })
        .returning_to("/update/7");

        let response = err.into_response();
        assert_eq!(location(&response), "/update/7");
        assert!(set_cookie(&response).contains("invalid_content"));
    }

    #[test]
    fn test_internal_error_hides_details() {
        let response = AppError::Internal("disk on fire".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(AppError::NotFound(3).to_string(), "Task 3 not found");
        assert_eq!(AppError::Duplicate.to_string(), "Username or email already registered");
    }
}
