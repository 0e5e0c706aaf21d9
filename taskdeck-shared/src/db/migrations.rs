/// Versioned schema upgrader
///
/// The schema is described by [`MIGRATIONS`], an ordered list of numbered
/// steps. Each applied step is recorded in `_taskdeck_migrations`, so running
/// the upgrader again only executes versions it has not seen before.
///
/// Databases created by the legacy deployment already contain `user` and
/// `task` tables but may lack the `email` and `name` columns. Those are
/// handled by [`MigrationStep::EnsureColumn`], which inspects
/// `PRAGMA table_info` before issuing `ALTER TABLE ... ADD COLUMN`.
///
/// # Failure policy
///
/// - [`MigrationStep::Execute`]: a failure aborts startup.
/// - [`MigrationStep::EnsureColumn`] / [`MigrationStep::BestEffort`]: a
///   failure is logged at WARN, the version is left unrecorded and retried on
///   the next start. Startup continues.
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskdeck_shared::db::migrations::{run_migrations, get_migration_status};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig::default()).await?;
///
///     let report = run_migrations(&pool).await?;
///     println!("Applied {} migrations", report.applied.len());
///
///     let status = get_migration_status(&pool).await?;
///     assert!(status.is_up_to_date);
///     Ok(())
/// }
/// ```

use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// A single schema change
#[derive(Debug, Clone, Copy)]
pub enum MigrationStep {
    /// Statement that must succeed
    Execute(&'static str),

    /// Add a column when the table does not have it yet
    EnsureColumn {
        table: &'static str,
        column: &'static str,
        definition: &'static str,
    },

    /// Statement whose failure is tolerated
    BestEffort(&'static str),
}

/// A numbered entry in the migration list
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub step: MigrationStep,
}

/// Ordered schema history. Append only; never renumber.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_user_table",
        step: MigrationStep::Execute(
            r#"
            CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username VARCHAR(150) NOT NULL UNIQUE,
                email VARCHAR(150) NOT NULL UNIQUE,
                password VARCHAR(150) NOT NULL,
                name VARCHAR(150) NOT NULL,
                date_created DATETIME
            )
            "#,
        ),
    },
    Migration {
        version: 2,
        name: "create_task_table",
        step: MigrationStep::Execute(
            r#"
            CREATE TABLE IF NOT EXISTS task (
                id INTEGER PRIMARY KEY,
                content VARCHAR(200) NOT NULL,
                description TEXT,
                deadline VARCHAR(50),
                status VARCHAR(20) NOT NULL DEFAULT 'Pending',
                completed BOOLEAN NOT NULL DEFAULT 0,
                date_created DATETIME,
                user_id INTEGER NOT NULL REFERENCES user(id)
            )
            "#,
        ),
    },
    Migration {
        version: 3,
        name: "ensure_user_email",
        step: MigrationStep::EnsureColumn {
            table: "user",
            column: "email",
            definition: "TEXT",
        },
    },
    Migration {
        version: 4,
        name: "ensure_user_name",
        step: MigrationStep::EnsureColumn {
            table: "user",
            column: "name",
            definition: "TEXT",
        },
    },
    Migration {
        version: 5,
        name: "unique_user_email",
        step: MigrationStep::BestEffort(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_user_email ON user(email)",
        ),
    },
    Migration {
        version: 6,
        name: "create_session_table",
        step: MigrationStep::Execute(
            r#"
            CREATE TABLE IF NOT EXISTS session (
                id BLOB PRIMARY KEY NOT NULL,
                user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                created_at DATETIME NOT NULL,
                expires_at DATETIME NOT NULL
            )
            "#,
        ),
    },
    Migration {
        version: 7,
        name: "index_task_owner",
        step: MigrationStep::Execute(
            "CREATE INDEX IF NOT EXISTS idx_task_user_created ON task(user_id, date_created)",
        ),
    },
];

/// Error type for the schema upgrader
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// A required step failed
    #[error("Migration {version} ({name}) failed: {source}")]
    StepFailed {
        version: i64,
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Bookkeeping query failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of a single upgrader run
#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    /// Versions executed and recorded during this run
    pub applied: Vec<i64>,

    /// Versions that were already recorded
    pub already_applied: usize,

    /// Best-effort versions that failed and will be retried next start
    pub tolerated_failures: Vec<i64>,
}

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Number of migrations that have been applied
    pub applied_migrations: usize,

    /// Latest applied migration version
    pub latest_version: Option<i64>,

    /// Whether every known migration is recorded
    pub is_up_to_date: bool,
}

async fn ensure_history_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _taskdeck_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn applied_versions(pool: &SqlitePool) -> Result<HashSet<i64>, sqlx::Error> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT version FROM _taskdeck_migrations")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|(v,)| v).collect())
}

async fn record(pool: &SqlitePool, migration: &Migration) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO _taskdeck_migrations (version, name, applied_at) VALUES (?, ?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(())
}

/// Checks whether `table` currently has a column called `column`
pub async fn column_exists(
    pool: &SqlitePool,
    table: &str,
    column: &str,
) -> Result<bool, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?")
            .bind(table)
            .bind(column)
            .fetch_one(pool)
            .await?;

    Ok(count > 0)
}

/// Checks whether a table exists
pub async fn table_exists(pool: &SqlitePool, table: &str) -> Result<bool, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_one(pool)
            .await?;

    Ok(count > 0)
}

/// Adds `column` to `table` unless it is already there
///
/// Returns `Ok(true)` when the column was added and `Ok(false)` when it was
/// already present.
pub async fn ensure_column(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<bool, sqlx::Error> {
    if column_exists(pool, table, column).await? {
        debug!(table, column, "Column already present");
        return Ok(false);
    }

    // Identifiers cannot be bound; they only come from the MIGRATIONS table.
    let sql = format!("ALTER TABLE {table} ADD COLUMN {column} {definition}");
    sqlx::query(&sql).execute(pool).await?;

    info!(table, column, "Added missing column");
    Ok(true)
}

/// Runs every migration that is not recorded yet
///
/// # Errors
///
/// Returns an error if a required step fails or the history table cannot be
/// read or written. Best-effort failures are reported in
/// [`MigrationReport::tolerated_failures`] instead.
pub async fn run_migrations(pool: &SqlitePool) -> Result<MigrationReport, MigrationError> {
    info!("Starting database migrations");

    ensure_history_table(pool).await?;
    let done = applied_versions(pool).await?;
    let mut report = MigrationReport::default();

    for migration in MIGRATIONS {
        if done.contains(&migration.version) {
            report.already_applied += 1;
            continue;
        }

        let outcome = match migration.step {
            MigrationStep::Execute(sql) => {
                sqlx::query(sql).execute(pool).await.map_err(|source| {
                    warn!(version = migration.version, name = migration.name, "Migration failed: {}", source);
                    MigrationError::StepFailed {
                        version: migration.version,
                        name: migration.name,
                        source,
                    }
                })?;
                Ok(())
            }
            MigrationStep::EnsureColumn {
                table,
                column,
                definition,
            } => ensure_column(pool, table, column, definition).await.map(|_| ()),
            MigrationStep::BestEffort(sql) => sqlx::query(sql).execute(pool).await.map(|_| ()),
        };

        match outcome {
            Ok(()) => {
                record(pool, migration).await?;
                info!(version = migration.version, name = migration.name, "Applied migration");
                report.applied.push(migration.version);
            }
            Err(e) => {
                warn!(
                    version = migration.version,
                    name = migration.name,
                    "Skipping best-effort migration: {}",
                    e
                );
                report.tolerated_failures.push(migration.version);
            }
        }
    }

    info!(
        applied = report.applied.len(),
        already_applied = report.already_applied,
        tolerated_failures = report.tolerated_failures.len(),
        "Database migrations finished"
    );

    Ok(report)
}

/// Gets the current migration status
pub async fn get_migration_status(pool: &SqlitePool) -> Result<MigrationStatus, sqlx::Error> {
    debug!("Checking migration status");

    if !table_exists(pool, "_taskdeck_migrations").await? {
        debug!("Migrations table does not exist yet");
        return Ok(MigrationStatus {
            applied_migrations: 0,
            latest_version: None,
            is_up_to_date: false,
        });
    }

    let done = applied_versions(pool).await?;
    let latest_version = done.iter().copied().max();
    let is_up_to_date = MIGRATIONS.iter().all(|m| done.contains(&m.version));

    Ok(MigrationStatus {
        applied_migrations: done.len(),
        latest_version,
        is_up_to_date,
    })
}
