/// Session model and database operations
///
/// A session row binds a random ID to an account until it expires or the
/// user logs out. The browser only ever holds a signed token naming the
/// session (see [`crate::auth::session`]); deleting the row revokes it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE session (
///     id BLOB PRIMARY KEY NOT NULL,
///     user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
///     created_at DATETIME NOT NULL,
///     expires_at DATETIME NOT NULL
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

/// Server-side login session
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    /// Random session ID (UUID v4)
    pub id: Uuid,

    /// Account the session authenticates
    pub account_id: i64,

    /// When the session was established
    pub created_at: DateTime<Utc>,

    /// When the session stops resolving
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Inserts a new session for `account_id` lasting `ttl`
    pub async fn create(
        pool: &SqlitePool,
        account_id: i64,
        ttl: Duration,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO session (id, user_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id AS account_id, created_at, expires_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(now)
        .bind(now + ttl)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Finds a session by ID, expired or not
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id AS account_id, created_at, expires_at
            FROM session
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Deletes a session
    ///
    /// Returns true if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM session WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every session whose expiry has passed
    ///
    /// Returns the number of rows removed.
    pub async fn delete_expired(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM session WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Checks if the session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_expiring_at(expires_at: DateTime<Utc>) -> Session {
        Session {
            id: Uuid::new_v4(),
            account_id: 1,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_is_expired() {
        assert!(session_expiring_at(Utc::now() - Duration::seconds(1)).is_expired());
        assert!(!session_expiring_at(Utc::now() + Duration::hours(1)).is_expired());
    }
}
