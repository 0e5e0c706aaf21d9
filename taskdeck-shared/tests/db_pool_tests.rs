/// Integration tests for the SQLite pool
///
/// File-backed tests create a uniquely named database under the system temp
/// directory and remove it afterwards.

use std::path::PathBuf;

use taskdeck_shared::db::pool::{close_pool, create_pool, health_check, DatabaseConfig};
use uuid::Uuid;

struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("taskdeck-test-{}.db", Uuid::new_v4()));
        Self { path }
    }

    fn url(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

#[tokio::test]
async fn test_file_database_is_created() {
    let db = TempDb::new();
    let config = DatabaseConfig {
        url: db.url(),
        ..Default::default()
    };

    let pool = create_pool(config).await.expect("Failed to create pool");
    assert!(db.path.exists());
    assert!(health_check(&pool).await.is_ok());

    close_pool(pool).await;
}

#[tokio::test]
async fn test_connection_pragmas() {
    let db = TempDb::new();
    let config = DatabaseConfig {
        url: db.url(),
        ..Default::default()
    };
    let pool = create_pool(config).await.expect("Failed to create pool");

    let (journal_mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(journal_mode.to_lowercase(), "wal");

    let (foreign_keys,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(foreign_keys, 1);

    close_pool(pool).await;
}

#[tokio::test]
async fn test_in_memory_pool_keeps_state_between_queries() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.expect("pool");

    sqlx::query("CREATE TABLE t (v INTEGER)").execute(&pool).await.unwrap();
    sqlx::query("INSERT INTO t (v) VALUES (42)").execute(&pool).await.unwrap();

    let (v,): (i64,) = sqlx::query_as("SELECT v FROM t").fetch_one(&pool).await.unwrap();
    assert_eq!(v, 42);
}
