/// Database models for Taskdeck
///
/// This module contains all database models and their store operations.
///
/// # Models
///
/// - `account`: Registered user identities
/// - `task`: To-do items, each owned by one account
/// - `session`: Server-side login sessions
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::task::{Task, TaskInput};
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example(owner_id: i64) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let tasks = Task::list_by_owner(&pool, owner_id).await?;
/// # Ok(())
/// # }
/// ```

pub mod account;
pub mod session;
pub mod task;

use validator::ValidationErrors;

/// Picks one field violation to report, in field-name order so the choice is stable
pub(crate) fn first_violation(errors: &ValidationErrors) -> (String, String) {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field));
                (field.to_string(), message)
            })
        })
        .unwrap_or_else(|| ("form".to_string(), "Validation failed".to_string()))
}
