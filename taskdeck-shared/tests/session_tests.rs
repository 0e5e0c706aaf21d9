/// Integration tests for the session state machine

use chrono::Duration;
use sqlx::SqlitePool;
use taskdeck_shared::auth::credentials::{register, NewAccount};
use taskdeck_shared::auth::jwt::{create_token, Claims};
use taskdeck_shared::auth::session::{end, establish, purge_expired, resolve, SessionState};
use taskdeck_shared::db::migrations::run_migrations;
use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
use taskdeck_shared::models::session::Session;
use uuid::Uuid;

const SECRET: &str = "session-test-secret-at-least-32-bytes";

async fn setup() -> (SqlitePool, i64) {
    let pool = create_pool(DatabaseConfig::in_memory()).await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    let account = register(&pool, NewAccount::new("ana", "a@x.com", "Ana", "p1"))
        .await
        .expect("register");
    (pool, account.id)
}

#[tokio::test]
async fn test_established_session_resolves() {
    let (pool, account_id) = setup().await;

    let (session, token) = establish(&pool, account_id, SECRET, Duration::hours(1))
        .await
        .unwrap();

    let state = resolve(&pool, &token, SECRET).await.unwrap();
    assert_eq!(
        state,
        SessionState::Authenticated {
            account_id,
            session_id: session.id
        }
    );
}

#[tokio::test]
async fn test_ended_session_resolves_anonymous() {
    let (pool, account_id) = setup().await;
    let (session, token) = establish(&pool, account_id, SECRET, Duration::hours(1))
        .await
        .unwrap();

    end(&pool, session.id).await.unwrap();
    assert_eq!(resolve(&pool, &token, SECRET).await.unwrap(), SessionState::Anonymous);

    // Ending twice is harmless
    end(&pool, session.id).await.unwrap();
}

#[tokio::test]
async fn test_garbage_and_foreign_tokens_resolve_anonymous() {
    let (pool, account_id) = setup().await;
    let (_, token) = establish(&pool, account_id, SECRET, Duration::hours(1))
        .await
        .unwrap();

    assert_eq!(resolve(&pool, "", SECRET).await.unwrap(), SessionState::Anonymous);
    assert_eq!(resolve(&pool, "garbage", SECRET).await.unwrap(), SessionState::Anonymous);

    let other_secret = "another-secret-that-is-32-bytes-long!";
    assert_eq!(resolve(&pool, &token, other_secret).await.unwrap(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_token_for_unknown_session_resolves_anonymous() {
    let (pool, account_id) = setup().await;

    let claims = Claims::new(account_id, Uuid::new_v4(), Duration::hours(1));
    let token = create_token(&claims, SECRET).unwrap();

    assert_eq!(resolve(&pool, &token, SECRET).await.unwrap(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_token_naming_another_account_resolves_anonymous() {
    let (pool, account_id) = setup().await;
    let (session, _) = establish(&pool, account_id, SECRET, Duration::hours(1))
        .await
        .unwrap();

    let forged = Claims::new(account_id + 1, session.id, Duration::hours(1));
    let token = create_token(&forged, SECRET).unwrap();

    assert_eq!(resolve(&pool, &token, SECRET).await.unwrap(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_expired_rows_do_not_resolve_and_are_purged() {
    let (pool, account_id) = setup().await;

    let expired = Session::create(&pool, account_id, Duration::seconds(-60)).await.unwrap();
    let claims = Claims::new(account_id, expired.id, Duration::hours(1));
    let token = create_token(&claims, SECRET).unwrap();
    assert_eq!(resolve(&pool, &token, SECRET).await.unwrap(), SessionState::Anonymous);

    let (live, _) = establish(&pool, account_id, SECRET, Duration::hours(1)).await.unwrap();

    assert_eq!(purge_expired(&pool).await.unwrap(), 1);
    assert!(Session::find_by_id(&pool, expired.id).await.unwrap().is_none());
    assert!(Session::find_by_id(&pool, live.id).await.unwrap().is_some());
}
