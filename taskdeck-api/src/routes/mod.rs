/// Route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and logout
/// - `tasks`: Task list and task editing
/// - `profile`: Account overview

pub mod auth;
pub mod health;
pub mod profile;
pub mod tasks;
