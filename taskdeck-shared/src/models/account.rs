/// Account model and database operations
///
/// This module provides the Account model and the row-level operations the
/// credential store is built on. Accounts are created on registration and
/// never deleted; the only update is replacing a legacy password hash.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE user (
///     id INTEGER PRIMARY KEY,
///     username VARCHAR(150) NOT NULL UNIQUE,
///     email VARCHAR(150) NOT NULL UNIQUE,
///     password VARCHAR(150) NOT NULL,
///     name VARCHAR(150) NOT NULL,
///     date_created DATETIME
/// );
/// ```
///
/// Databases upgraded from the legacy deployment may hold rows with a NULL
/// `email`, `name` or `date_created`; reads coalesce those to empty values.
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::account::{Account, CreateAccount};
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let account = Account::create(&pool, CreateAccount {
///     username: "ana".to_string(),
///     email: "a@x.com".to_string(),
///     name: "Ana".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = Account::find_by_username(&pool, "ana").await?;
/// assert_eq!(found.map(|a| a.id), Some(account.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;

const ACCOUNT_COLUMNS: &str = "id, username, \
    COALESCE(email, '') AS email, \
    COALESCE(password, '') AS password_hash, \
    COALESCE(name, '') AS name, \
    COALESCE(date_created, CURRENT_TIMESTAMP) AS created_at";

/// A registered user identity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    /// Unique account ID
    pub id: i64,

    /// Login name, unique across all accounts
    pub username: String,

    /// Email address, unique across all accounts
    pub email: String,

    /// Argon2id password hash (PHC string), or bcrypt for legacy rows
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Display name
    pub name: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new account
///
/// The password must already be hashed; see [`crate::auth::credentials::register`].
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

impl Account {
    /// Inserts a new account row
    ///
    /// # Errors
    ///
    /// Returns an error if the username or email violates a unique
    /// constraint, or the database is unreachable.
    pub async fn create(pool: &SqlitePool, data: CreateAccount) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO user (username, email, password, name, date_created) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING {ACCOUNT_COLUMNS}"
        );

        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(data.username)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.name)
            .bind(Utc::now())
            .fetch_one(pool)
            .await?;

        Ok(account)
    }

    /// Finds an account by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM user WHERE id = ?");

        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(account)
    }

    /// Finds an account by exact username
    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM user WHERE username = ?");

        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(account)
    }

    /// Checks whether the username or the email is already taken
    pub async fn username_or_email_taken(
        pool: &SqlitePool,
        username: &str,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user WHERE username = ? OR email = ?")
                .bind(username)
                .bind(email)
                .fetch_one(pool)
                .await?;

        Ok(count > 0)
    }

    /// Replaces the stored password hash
    pub async fn update_password_hash(
        pool: &SqlitePool,
        id: i64,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE user SET password = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Counts total number of accounts
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
