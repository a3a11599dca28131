use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::auth::gate::Role;
use crate::auth::password;
use crate::errors::AppError;
use crate::models::user::{self, NewUser};

/// Create the directory holding a file-backed SQLite database.
pub fn ensure_parent_dir(database_url: &str) -> std::io::Result<()> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }
    match Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

/// WAL + busy timeout so concurrent writers queue instead of failing.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(10));
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Ensure `username` exists with the admin role. Role elevation has no
/// route; this is the out-of-band path used at startup.
pub async fn seed_bootstrap_admin(
    pool: &SqlitePool,
    username: &str,
    plain_password: &str,
) -> Result<(), AppError> {
    match user::find_by_username(pool, username).await? {
        Some(existing) if existing.role() == Role::Admin => {}
        Some(existing) => {
            user::set_role(pool, existing.id, Role::Admin).await?;
            log::info!("Promoted {} to admin", username);
        }
        None => {
            let hash = password::hash_password(plain_password)?;
            user::create(
                pool,
                &NewUser {
                    username: username.to_string(),
                    password: hash,
                    role: Role::Admin,
                },
            )
            .await?;
            log::info!("Created bootstrap admin {}", username);
        }
    }
    Ok(())
}
