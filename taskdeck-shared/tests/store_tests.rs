/// Integration tests for the credential and task stores

use sqlx::SqlitePool;
use taskdeck_shared::auth::credentials::{authenticate, register, CredentialError, NewAccount};
use taskdeck_shared::db::migrations::run_migrations;
use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
use taskdeck_shared::models::account::Account;
use taskdeck_shared::models::task::{Task, TaskError, TaskInput, TaskStatus};

async fn setup() -> SqlitePool {
    let pool = create_pool(DatabaseConfig::in_memory())
        .await
        .expect("Failed to create in-memory pool");
    run_migrations(&pool).await.expect("Migrations failed");
    pool
}

async fn account(pool: &SqlitePool, username: &str) -> Account {
    register(
        pool,
        NewAccount::new(username, &format!("{username}@x.com"), username, "p1"),
    )
    .await
    .expect("Registration failed")
}

#[tokio::test]
async fn test_register_and_authenticate() {
    let pool = setup().await;

    let ana = account(&pool, "ana").await;
    assert_eq!(ana.email, "ana@x.com");
    assert!(ana.password_hash.starts_with("$argon2id$"));

    let logged_in = authenticate(&pool, "ana", "p1").await.expect("Login failed");
    assert_eq!(logged_in.id, ana.id);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_look_the_same() {
    let pool = setup().await;
    account(&pool, "ana").await;

    let wrong = authenticate(&pool, "ana", "p2").await.unwrap_err();
    let unknown = authenticate(&pool, "bob", "p1").await.unwrap_err();

    assert!(matches!(wrong, CredentialError::InvalidCredentials));
    assert!(matches!(unknown, CredentialError::InvalidCredentials));
}

#[tokio::test]
async fn test_duplicate_username_or_email_creates_no_row() {
    let pool = setup().await;
    account(&pool, "ana").await;

    let same_username = register(&pool, NewAccount::new("ana", "other@x.com", "Ana", "p1")).await;
    assert!(matches!(same_username, Err(CredentialError::Duplicate)));

    let same_email = register(&pool, NewAccount::new("bob", "ana@x.com", "Bob", "p1")).await;
    assert!(matches!(same_email, Err(CredentialError::Duplicate)));

    assert_eq!(Account::count(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_registration_creates_no_row() {
    let pool = setup().await;

    let result = register(&pool, NewAccount::new("ana", "not-an-email", "Ana", "p1")).await;
    match result {
        Err(CredentialError::Validation { field, .. }) => assert_eq!(field, "email"),
        other => panic!("expected validation error, got {other:?}"),
    }

    assert_eq!(Account::count(&pool).await.unwrap(), 0);
}

async fn stored_hash(pool: &SqlitePool, username: &str) -> String {
    let (hash,): (String,) = sqlx::query_as("SELECT password FROM user WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await
        .unwrap();
    hash
}

#[tokio::test]
async fn test_legacy_bcrypt_account_logs_in_after_upgrade() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();

    sqlx::query(
        "CREATE TABLE user (
            id INTEGER PRIMARY KEY,
            username VARCHAR(150) NOT NULL UNIQUE,
            password VARCHAR(150) NOT NULL,
            date_created DATETIME
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    let legacy = bcrypt::hash("p1", 4).unwrap();
    sqlx::query("INSERT INTO user (username, password, date_created) VALUES ('ana', ?, '2025-01-01 12:00:00.123456')")
        .bind(&legacy)
        .execute(&pool)
        .await
        .unwrap();

    run_migrations(&pool).await.expect("Upgrade failed");

    let wrong = authenticate(&pool, "ana", "p2").await;
    assert!(matches!(wrong, Err(CredentialError::InvalidCredentials)));
    assert_eq!(stored_hash(&pool, "ana").await, legacy);

    let ana = authenticate(&pool, "ana", "p1").await.expect("Legacy login failed");
    assert!(ana.password_hash.starts_with("$argon2id$"));

    // The bcrypt hash is gone; the new hash keeps working
    let upgraded = stored_hash(&pool, "ana").await;
    assert!(upgraded.starts_with("$argon2id$"));
    assert_eq!(authenticate(&pool, "ana", "p1").await.unwrap().id, ana.id);
    assert!(matches!(
        authenticate(&pool, "ana", "p2").await,
        Err(CredentialError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_unparseable_stored_hash_is_invalid_credentials() {
    let pool = setup().await;

    sqlx::query("INSERT INTO user (username, email, password, name) VALUES ('old', 'old@x.com', 'plaintext?', 'Old')")
        .execute(&pool)
        .await
        .unwrap();

    let result = authenticate(&pool, "old", "plaintext?").await;
    assert!(matches!(result, Err(CredentialError::InvalidCredentials)));
}

#[tokio::test]
async fn test_status_tracks_completed() {
    let pool = setup().await;
    let ana = account(&pool, "ana").await;

    let task = Task::create(&pool, ana.id, TaskInput::new("write report", Some("q3"), Some("friday")))
        .await
        .unwrap();
    assert!(!task.completed);
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.description, "q3");
    assert_eq!(task.deadline, "friday");

    let toggled = Task::toggle_completed(&pool, task.id, ana.id).await.unwrap();
    assert!(toggled.completed);
    assert_eq!(toggled.status, TaskStatus::Completed);

    let back = Task::toggle_completed(&pool, task.id, ana.id).await.unwrap();
    assert!(!back.completed);
    assert_eq!(back.status, TaskStatus::Pending);

    let (stored,): (String,) = sqlx::query_as("SELECT status FROM task WHERE id = ?")
        .bind(task.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, "Pending");
}

#[tokio::test]
async fn test_inconsistent_legacy_status_is_derived_on_read() {
    let pool = setup().await;
    let ana = account(&pool, "ana").await;

    sqlx::query("INSERT INTO task (content, status, completed, user_id) VALUES ('old', 'Pending', 1, ?)")
        .bind(ana.id)
        .execute(&pool)
        .await
        .unwrap();

    let tasks = Task::list_by_owner(&pool, ana.id).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].completed);
    assert_eq!(tasks[0].status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_listing_is_isolated_per_account() {
    let pool = setup().await;
    let ana = account(&pool, "ana").await;
    let bob = account(&pool, "bob").await;

    Task::create(&pool, ana.id, TaskInput::new("ana 1", None, None)).await.unwrap();
    Task::create(&pool, ana.id, TaskInput::new("ana 2", None, None)).await.unwrap();
    Task::create(&pool, bob.id, TaskInput::new("bob 1", None, None)).await.unwrap();

    let ana_tasks = Task::list_by_owner(&pool, ana.id).await.unwrap();
    assert_eq!(ana_tasks.len(), 2);
    assert!(ana_tasks.iter().all(|t| t.owner_id == ana.id));
    // Most recent first
    assert_eq!(ana_tasks[0].content, "ana 2");

    let bob_tasks = Task::list_by_owner(&pool, bob.id).await.unwrap();
    assert_eq!(bob_tasks.len(), 1);
    assert_eq!(bob_tasks[0].content, "bob 1");
}

#[tokio::test]
async fn test_foreign_task_cannot_be_changed() {
    let pool = setup().await;
    let ana = account(&pool, "ana").await;
    let bob = account(&pool, "bob").await;

    let task = Task::create(&pool, ana.id, TaskInput::new("private", None, None))
        .await
        .unwrap();

    let update = Task::update(&pool, task.id, bob.id, TaskInput::new("hijacked", None, None)).await;
    assert!(matches!(update, Err(TaskError::Unauthorized { .. })));

    let toggle = Task::toggle_completed(&pool, task.id, bob.id).await;
    assert!(matches!(toggle, Err(TaskError::Unauthorized { .. })));

    let delete = Task::delete(&pool, task.id, bob.id).await;
    assert!(matches!(delete, Err(TaskError::Unauthorized { .. })));

    let unchanged = Task::find_by_id(&pool, task.id).await.unwrap().expect("still there");
    assert_eq!(unchanged.content, "private");
    assert!(!unchanged.completed);
}

#[tokio::test]
async fn test_missing_task_is_not_found() {
    let pool = setup().await;
    let ana = account(&pool, "ana").await;

    assert!(matches!(
        Task::delete(&pool, 999, ana.id).await,
        Err(TaskError::NotFound(999))
    ));
    assert!(matches!(
        Task::find_owned(&pool, 999, ana.id).await,
        Err(TaskError::NotFound(999))
    ));
    assert!(matches!(
        Task::update(&pool, 999, ana.id, TaskInput::new("ghost", None, None)).await,
        Err(TaskError::NotFound(999))
    ));
    assert!(matches!(
        Task::toggle_completed(&pool, 999, ana.id).await,
        Err(TaskError::NotFound(999))
    ));
    // Checked before validation too
    assert!(matches!(
        Task::update(&pool, 999, ana.id, TaskInput::new("", None, None)).await,
        Err(TaskError::NotFound(999))
    ));
}

#[tokio::test]
async fn test_update_replaces_fields() {
    let pool = setup().await;
    let ana = account(&pool, "ana").await;

    let task = Task::create(&pool, ana.id, TaskInput::new("draft", Some("d"), Some("mon")))
        .await
        .unwrap();

    let updated = Task::update(&pool, task.id, ana.id, TaskInput::new("final", None, Some("tue")))
        .await
        .unwrap();
    assert_eq!(updated.content, "final");
    assert_eq!(updated.description, "");
    assert_eq!(updated.deadline, "tue");

    let invalid = Task::update(&pool, task.id, ana.id, TaskInput::new("", None, None)).await;
    assert!(matches!(invalid, Err(TaskError::Validation { .. })));
    let kept = Task::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(kept.content, "final");
}

#[tokio::test]
async fn test_stats_by_owner() {
    let pool = setup().await;
    let ana = account(&pool, "ana").await;

    let a = Task::create(&pool, ana.id, TaskInput::new("a", None, None)).await.unwrap();
    Task::create(&pool, ana.id, TaskInput::new("b", None, None)).await.unwrap();
    Task::toggle_completed(&pool, a.id, ana.id).await.unwrap();

    let stats = Task::stats_by_owner(&pool, ana.id).await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending(), 1);
}

#[tokio::test]
async fn test_buy_milk_scenario() {
    let pool = setup().await;

    register(&pool, NewAccount::new("ana", "a@x.com", "Ana", "p1")).await.unwrap();
    let ana = authenticate(&pool, "ana", "p1").await.unwrap();

    let task = Task::create(&pool, ana.id, TaskInput::new("buy milk", None, None)).await.unwrap();
    let tasks = Task::list_by_owner(&pool, ana.id).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].status, TaskStatus::Pending);

    let done = Task::toggle_completed(&pool, task.id, ana.id).await.unwrap();
    assert_eq!(done.status, TaskStatus::Completed);

    Task::delete(&pool, task.id, ana.id).await.unwrap();
    assert!(Task::list_by_owner(&pool, ana.id).await.unwrap().is_empty());
}
