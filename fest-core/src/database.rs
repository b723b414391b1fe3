use std::env;

use libsql::{Builder, Connection, Database};
use tracing::info;

use crate::common::error::{FestError, Result};

/// Owns the libSQL database handle and hands out connections. One connection
/// is borrowed per import call or detection query and dropped before the call
/// returns.
pub struct DatabaseManager {
    db: Database,
}

impl DatabaseManager {
    /// Connect to a remote Turso database using `LIBSQL_URL` and
    /// `LIBSQL_AUTH_TOKEN` from the environment.
    pub async fn from_env() -> Result<Self> {
        let url = env::var("LIBSQL_URL").map_err(|_| FestError::StoreUnavailable {
            message: "LIBSQL_URL environment variable not set".to_string(),
        })?;

        let auth_token = env::var("LIBSQL_AUTH_TOKEN").map_err(|_| FestError::StoreUnavailable {
            message: "LIBSQL_AUTH_TOKEN environment variable not set".to_string(),
        })?;

        info!("Connecting to Turso database at {}", url);

        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| FestError::StoreUnavailable {
                message: format!("failed to connect to database: {e}"),
            })?;

        Ok(Self { db })
    }

    /// Open a local database file. The test suites point this at a
    /// temporary file so every connection sees the same data.
    pub async fn new_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| FestError::from_store(format!("failed to open local database: {e}")))?;

        Ok(Self { db })
    }

    /// Get a connection to the database.
    pub fn connect(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| FestError::from_store(format!("failed to get database connection: {e}")))
    }

    /// Apply the embedded schema migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        let conn = self.connect()?;

        let create_tables = include_str!("../migrations/001_create_tables.sql");
        conn.execute_batch(create_tables)
            .await
            .map_err(|e| FestError::from_store(format!("failed to run schema migration: {e}")))?;

        let create_indexes = include_str!("../migrations/002_indexes.sql");
        conn.execute_batch(create_indexes)
            .await
            .map_err(|e| FestError::from_store(format!("failed to run index migration: {e}")))?;

        info!("Database migrations completed successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_apply_to_a_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fest.db");
        let db = DatabaseManager::new_local(path.to_str().unwrap()).await.unwrap();
        db.run_migrations().await.unwrap();

        // Second run must be a no-op, not an error.
        db.run_migrations().await.unwrap();

        let conn = db.connect().unwrap();
        let mut rows = conn
            .query("SELECT COUNT(*) FROM events", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        let count: i64 = row.get(0).unwrap();
        assert_eq!(count, 0);
    }
}
