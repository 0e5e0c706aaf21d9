/// Login session state machine
///
/// ```text
///            establish                   end / expiry
/// Anonymous ----------> Authenticated ----------------> Anonymous
/// ```
///
/// Establishing a session inserts a [`Session`] row and signs a token that
/// names it. Resolving a token succeeds only while the signature verifies
/// *and* the row still exists and has not expired, so ending a session
/// (deleting its row) takes effect immediately even though the token
/// itself is still validly signed.

use chrono::Duration;
use sqlx::sqlite::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::jwt::{create_token, validate_token, Claims, JwtError};
use crate::models::session::Session;

/// Who the current request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No valid session
    Anonymous,

    /// A live session for `account_id`
    Authenticated { account_id: i64, session_id: Uuid },
}

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Token could not be signed
    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Starts a session for `account_id` and returns it with its signed token
pub async fn establish(
    pool: &SqlitePool,
    account_id: i64,
    secret: &str,
    ttl: Duration,
) -> Result<(Session, String), SessionError> {
    let session = Session::create(pool, account_id, ttl).await?;
    let claims = Claims::new(account_id, session.id, ttl);
    let token = create_token(&claims, secret)?;

    debug!(account_id, session_id = %session.id, "Session established");
    Ok((session, token))
}

/// Maps a token to the session state it stands for
///
/// Any token problem (bad signature, expiry, revoked or unknown session,
/// account mismatch) yields `Anonymous`; only database failures are errors.
pub async fn resolve(
    pool: &SqlitePool,
    token: &str,
    secret: &str,
) -> Result<SessionState, sqlx::Error> {
    let claims = match validate_token(token, secret) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "Session token rejected");
            return Ok(SessionState::Anonymous);
        }
    };

    let session = match Session::find_by_id(pool, claims.sid).await? {
        Some(session) => session,
        None => return Ok(SessionState::Anonymous),
    };

    if session.account_id != claims.sub || session.is_expired() {
        return Ok(SessionState::Anonymous);
    }

    Ok(SessionState::Authenticated {
        account_id: session.account_id,
        session_id: session.id,
    })
}

/// Ends a session; ending one that no longer exists is not an error
pub async fn end(pool: &SqlitePool, session_id: Uuid) -> Result<(), sqlx::Error> {
    let removed = Session::delete(pool, session_id).await?;
    debug!(session_id = %session_id, removed, "Session ended");
    Ok(())
}

/// Removes expired session rows
pub async fn purge_expired(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    Session::delete_expired(pool).await
}
