/// Authentication for Taskdeck
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: signed session tokens
/// - [`credentials`]: registration and login against the account table
/// - [`session`]: the Anonymous / Authenticated session state machine
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use taskdeck_shared::auth::credentials::authenticate;
/// use taskdeck_shared::auth::session::{establish, resolve, SessionState};
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example(secret: &str) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let account = authenticate(&pool, "ana", "p1").await?;
/// let (_session, token) = establish(&pool, account.id, secret, Duration::hours(1)).await?;
///
/// let state = resolve(&pool, &token, secret).await?;
/// assert!(matches!(state, SessionState::Authenticated { account_id, .. } if account_id == account.id));
/// # Ok(())
/// # }
/// ```

pub mod credentials;
pub mod jwt;
pub mod password;
pub mod session;
