//! Embedded migration utilities.

use std::{error::Error as StdError, fmt};

use cfg_if::cfg_if;
use diesel::result::{Error as DieselError, QueryResult};
use diesel_migrations::MigrationHarness;
use tracing::info;

use super::connection::{DbConnection, MIGRATIONS};

#[derive(Debug)]
struct MigrationHarnessError(Box<dyn StdError + Send + Sync>);

impl fmt::Display for MigrationHarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "migration harness error: {}", self.0)
    }
}

impl StdError for MigrationHarnessError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.0)
    }
}

fn harness_error(e: Box<dyn StdError + Send + Sync>) -> DieselError {
    DieselError::SerializationError(Box::new(MigrationHarnessError(e)))
}

cfg_if! {
    if #[cfg(feature = "sqlite")] {
        /// Run embedded database migrations.
        ///
        /// # Errors
        /// Returns any error produced by Diesel while running migrations.
        #[must_use = "handle the result"]
        pub async fn run_migrations(conn: &mut DbConnection) -> QueryResult<()> {
            conn.spawn_blocking(|c| {
                if let Ok(false) = c.has_pending_migration(MIGRATIONS) {
                    info!("no pending migrations; skipping apply");
                    return Ok(());
                }
                info!("applying pending migrations");
                c.run_pending_migrations(MIGRATIONS)
                    .map(|_| ())
                    .map_err(harness_error)
            })
            .await?;
            Ok(())
        }

        /// Apply embedded migrations for the current backend.
        ///
        /// # Errors
        /// Returns any error produced by Diesel while running migrations.
        #[must_use = "handle the result"]
        pub async fn apply_migrations(conn: &mut DbConnection, _database_url: &str) -> QueryResult<()> {
            run_migrations(conn).await
        }
    } else if #[cfg(all(feature = "postgres", not(feature = "sqlite")))] {
        use diesel::{Connection, result::ConnectionError};
        use tokio::task;

        #[derive(Debug)]
        struct MigrationConnectionError(ConnectionError);

        impl fmt::Display for MigrationConnectionError {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "migration connection error: {}", self.0)
            }
        }

        impl StdError for MigrationConnectionError {
            fn source(&self) -> Option<&(dyn StdError + 'static)> { Some(&self.0) }
        }

        /// Run embedded database migrations.
        ///
        /// Postgres migrations use a dedicated synchronous connection because
        /// the async pool cannot hand out a blocking harness.
        ///
        /// # Errors
        /// Returns any error produced by Diesel while running migrations.
        #[must_use = "handle the result"]
        pub async fn run_migrations(database_url: &str) -> QueryResult<()> {
            use diesel::pg::PgConnection;
            let url = database_url.to_owned();
            task::spawn_blocking(move || -> QueryResult<()> {
                let mut conn = PgConnection::establish(&url).map_err(|e| {
                    DieselError::SerializationError(Box::new(MigrationConnectionError(e)))
                })?;
                if let Ok(false) = conn.has_pending_migration(MIGRATIONS) {
                    info!("no pending migrations; skipping apply");
                    return Ok(());
                }
                info!("applying pending migrations");
                conn.run_pending_migrations(MIGRATIONS)
                    .map(|_| ())
                    .map_err(harness_error)
            })
            .await
            .map_err(|e| DieselError::SerializationError(Box::new(std::io::Error::other(e))))??;
            Ok(())
        }

        /// Apply embedded migrations for the current backend.
        ///
        /// # Errors
        /// Returns any error produced by Diesel while running migrations.
        #[must_use = "handle the result"]
        pub async fn apply_migrations(conn: &mut DbConnection, url: &str) -> QueryResult<()> {
            let _ = conn;
            run_migrations(url).await
        }
    }
}
