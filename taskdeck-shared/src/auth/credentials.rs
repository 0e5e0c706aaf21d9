/// Credential store: registration and login
///
/// Registration validates the submitted fields, refuses a username or email
/// that is already taken, hashes the password and inserts the account.
/// Authentication looks the account up by exact username and verifies the
/// password against the stored hash.
///
/// Hashing and verification run on the blocking thread pool.
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::auth::credentials::{authenticate, register, NewAccount};
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let account = register(&pool, NewAccount::new("ana", "a@x.com", "Ana", "p1")).await?;
/// let same = authenticate(&pool, "ana", "p1").await?;
/// assert_eq!(account.id, same.id);
/// # Ok(())
/// # }
/// ```

use serde::Deserialize;
use sqlx::sqlite::SqlitePool;
use tracing::{info, warn};
use validator::Validate;

use super::password::{hash_password, needs_rehash, verify_password, PasswordError};
use crate::models::account::{Account, CreateAccount};
use crate::models::first_violation;

/// Registration form
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewAccount {
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Username is required (at most 150 characters)"))]
    pub username: String,

    #[serde(default)]
    #[validate(
        email(message = "Email must be a valid address"),
        length(max = 150, message = "Email must be at most 150 characters")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Name is required (at most 150 characters)"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl NewAccount {
    pub fn new(username: &str, email: &str, name: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
        }
    }
}

/// Error type for the credential store
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Username or email already registered
    #[error("Username or email already registered")]
    Duplicate,

    /// Unknown username or wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// A submitted field is missing or malformed
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Hashing failed
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

async fn hash_blocking(password: String) -> Result<String, CredentialError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::HashError(format!("Hashing task failed: {}", e)))?
        .map_err(CredentialError::from)
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::VerifyError(format!("Verification task failed: {}", e)))?
}

/// Registers a new account
///
/// Username, email and name are trimmed; the password is taken verbatim.
/// No row is written unless every check passes.
///
/// # Errors
///
/// - `CredentialError::Validation` for a missing or malformed field
/// - `CredentialError::Duplicate` if the username or email is taken,
///   including when a concurrent registration wins the race
pub async fn register(pool: &SqlitePool, input: NewAccount) -> Result<Account, CredentialError> {
    let input = NewAccount {
        username: input.username.trim().to_string(),
        email: input.email.trim().to_string(),
        name: input.name.trim().to_string(),
        password: input.password,
    };

    input.validate().map_err(|e| {
        let (field, message) = first_violation(&e);
        CredentialError::Validation { field, message }
    })?;

    if Account::username_or_email_taken(pool, &input.username, &input.email).await? {
        info!(username = %input.username, "Registration refused: duplicate");
        return Err(CredentialError::Duplicate);
    }

    let password_hash = hash_blocking(input.password).await?;

    let account = insert_account(
        pool,
        CreateAccount {
            username: input.username,
            email: input.email,
            name: input.name,
            password_hash,
        },
    )
    .await?;

    info!(account_id = account.id, username = %account.username, "Account registered");
    Ok(account)
}

/// Inserts the row, reporting a unique constraint hit as `Duplicate`
async fn insert_account(pool: &SqlitePool, data: CreateAccount) -> Result<Account, CredentialError> {
    Account::create(pool, data).await.map_err(|e| {
        if is_unique_violation(&e) {
            info!("Registration refused: unique constraint");
            CredentialError::Duplicate
        } else {
            CredentialError::Database(e)
        }
    })
}

/// Checks a username and password
///
/// Unknown usernames and wrong passwords are indistinguishable to the
/// caller. A legacy bcrypt hash is replaced by an Argon2id hash on the first
/// successful login; a failed replacement is logged and the login still
/// succeeds. A stored hash that cannot be parsed at all is logged and
/// treated as a failed login.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Account, CredentialError> {
    let mut account = match Account::find_by_username(pool, username.trim()).await? {
        Some(account) => account,
        None => return Err(CredentialError::InvalidCredentials),
    };

    match verify_blocking(password.to_string(), account.password_hash.clone()).await {
        Ok(true) => {}
        Ok(false) => return Err(CredentialError::InvalidCredentials),
        Err(e) => {
            warn!(account_id = account.id, error = %e, "Stored password hash could not be verified");
            return Err(CredentialError::InvalidCredentials);
        }
    }

    if needs_rehash(&account.password_hash) {
        match rehash(pool, account.id, password.to_string()).await {
            Ok(hash) => {
                info!(account_id = account.id, "Legacy password hash upgraded");
                account.password_hash = hash;
            }
            Err(e) => warn!(account_id = account.id, error = %e, "Legacy password hash kept"),
        }
    }

    info!(account_id = account.id, "Login succeeded");
    Ok(account)
}

async fn rehash(pool: &SqlitePool, account_id: i64, password: String) -> Result<String, CredentialError> {
    let hash = hash_blocking(password).await?;
    Account::update_password_hash(pool, account_id, &hash).await?;
    Ok(hash)
}
