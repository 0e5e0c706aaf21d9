/// One-shot user-facing messages
///
/// A flash survives exactly one redirect: the handler that produces it
/// stores its code in a cookie, the next rendered page shows it and clears
/// the cookie. Only codes from [`Flash`] travel through the cookie, so the
/// client can never inject message text.

use std::fmt;
use std::str::FromStr;

/// Visual category of a flash message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Success,
    Danger,
    Info,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Success => "success",
            Category::Danger => "danger",
            Category::Info => "info",
        }
    }
}

/// Form field a validation flash refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Username,
    Email,
    Name,
    Password,
    Content,
    Deadline,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Username => "username",
            FormField::Email => "email",
            FormField::Name => "name",
            FormField::Password => "password",
            FormField::Content => "content",
            FormField::Deadline => "deadline",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            FormField::Username => "Username",
            FormField::Email => "Email",
            FormField::Name => "Name",
            FormField::Password => "Password",
            FormField::Content => "Task content",
            FormField::Deadline => "Deadline",
        }
    }

    /// Maps a validator field name back to a form field
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "username" => Some(FormField::Username),
            "email" => Some(FormField::Email),
            "name" => Some(FormField::Name),
            "password" => Some(FormField::Password),
            "content" => Some(FormField::Content),
            "deadline" => Some(FormField::Deadline),
            _ => None,
        }
    }
}

/// Every message the app can flash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    AccountCreated,
    AccountExists,
    InvalidCredentials,
    LoggedOut,
    LoginRequired,
    TaskAdded,
    TaskUpdated,
    TaskDeleted,
    TaskNotFound,
    Unauthorized,
    Invalid(FormField),
}

impl Flash {
    pub fn category(&self) -> Category {
        match self {
            Flash::AccountCreated | Flash::TaskAdded | Flash::TaskUpdated => Category::Success,
            Flash::LoggedOut | Flash::LoginRequired | Flash::TaskDeleted => Category::Info,
            Flash::AccountExists
            | Flash::InvalidCredentials
            | Flash::TaskNotFound
            | Flash::Unauthorized
            | Flash::Invalid(_) => Category::Danger,
        }
    }

    /// Text shown to the user
    pub fn message(&self) -> String {
        match self {
            Flash::AccountCreated => "Account created! Please login.".to_string(),
            Flash::AccountExists => "Username or email already exists!".to_string(),
            Flash::InvalidCredentials => "Invalid credentials.".to_string(),
            Flash::LoggedOut => "Logged out.".to_string(),
            Flash::LoginRequired => "Please log in to access this page.".to_string(),
            Flash::TaskAdded => "Task added!".to_string(),
            Flash::TaskUpdated => "Task updated!".to_string(),
            Flash::TaskDeleted => "Task deleted.".to_string(),
            Flash::TaskNotFound => "Task not found.".to_string(),
            Flash::Unauthorized => "Unauthorized!".to_string(),
            Flash::Invalid(field) => format!("{} is missing or invalid.", field.label()),
        }
    }

    /// Cookie-safe code (snake_case, `invalid_<field>` for validation)
    pub fn code(&self) -> String {
        match self {
            Flash::AccountCreated => "account_created".to_string(),
            Flash::AccountExists => "account_exists".to_string(),
            Flash::InvalidCredentials => "invalid_credentials".to_string(),
            Flash::LoggedOut => "logged_out".to_string(),
            Flash::LoginRequired => "login_required".to_string(),
            Flash::TaskAdded => "task_added".to_string(),
            Flash::TaskUpdated => "task_updated".to_string(),
            Flash::TaskDeleted => "task_deleted".to_string(),
            Flash::TaskNotFound => "task_not_found".to_string(),
            Flash::Unauthorized => "unauthorized".to_string(),
            Flash::Invalid(field) => format!("invalid_{}", field.as_str()),
        }
    }
}

impl fmt::Display for Flash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

/// Error returned for an unknown flash code
#[derive(Debug, thiserror::Error)]
#[error("Unknown flash code: {0}")]
pub struct UnknownFlash(String);

impl FromStr for Flash {
    type Err = UnknownFlash;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let flash = match s {
            "account_created" => Flash::AccountCreated,
            "account_exists" => Flash::AccountExists,
            "invalid_credentials" => Flash::InvalidCredentials,
            "logged_out" => Flash::LoggedOut,
            "login_required" => Flash::LoginRequired,
            "task_added" => Flash::TaskAdded,
            "task_updated" => Flash::TaskUpdated,
            "task_deleted" => Flash::TaskDeleted,
            "task_not_found" => Flash::TaskNotFound,
            "unauthorized" => Flash::Unauthorized,
            other => other
                .strip_prefix("invalid_")
                .and_then(FormField::from_name)
                .map(Flash::Invalid)
                .ok_or_else(|| UnknownFlash(s.to_string()))?,
        };

        Ok(flash)
    }
}
