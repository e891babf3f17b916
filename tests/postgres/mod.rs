//! Shared `PostgreSQL` database for the repository integration tests.
//!
//! `TASKHUB_TEST_DATABASE_URL` points the tests at an existing database.
//! Without it, one embedded cluster is started per test binary through
//! `postgresql_embedded`. Either way the `tasks` schema is applied once,
//! before any test connects, and a failure to reach the database fails the
//! test instead of skipping it.

use std::sync::OnceLock;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use postgresql_embedded::{PostgreSQL, Settings, Status};
use taskhub::task::adapters::postgres::TaskPgPool;
use tokio::runtime::Runtime;

/// Error type for database setup failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DATABASE_URL_VAR: &str = "TASKHUB_TEST_DATABASE_URL";
const DATABASE_NAME: &str = "taskhub_test";
const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_tasks/up.sql");

static SHARED_DATABASE: OnceLock<Result<TestDatabase, String>> = OnceLock::new();

/// Database the tests connect to, together with the server that owns it.
pub struct TestDatabase {
    url: String,
    // Held so the embedded server outlives every test in the binary.
    _server: Option<PostgreSQL>,
}

impl TestDatabase {
    fn external(url: String) -> Self {
        Self { url, _server: None }
    }

    fn embedded() -> Result<Self, BoxError> {
        let runtime = test_runtime()?;
        let mut postgres = PostgreSQL::new(Settings::default());
        runtime.block_on(async {
            postgres.setup().await?;
            if !matches!(postgres.status(), Status::Started) {
                postgres.start().await?;
            }
            if !postgres.database_exists(DATABASE_NAME).await? {
                postgres.create_database(DATABASE_NAME).await?;
            }
            Ok::<(), postgresql_embedded::Error>(())
        })?;
        let url = postgres.settings().url(DATABASE_NAME);
        Ok(Self {
            url,
            _server: Some(postgres),
        })
    }

    fn apply_schema(&self) -> Result<(), BoxError> {
        let mut connection = PgConnection::establish(&self.url)?;
        connection.batch_execute(CREATE_SCHEMA_SQL)?;
        Ok(())
    }

    /// Builds a small connection pool against the shared database.
    pub fn pool(&self) -> Result<TaskPgPool, BoxError> {
        let pool = Pool::builder()
            .max_size(2)
            .build(ConnectionManager::<PgConnection>::new(self.url.as_str()))?;
        Ok(pool)
    }
}

fn test_runtime() -> Result<Runtime, BoxError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime)
}

fn start_database() -> Result<TestDatabase, BoxError> {
    let database = match std::env::var(DATABASE_URL_VAR) {
        Ok(url) if !url.trim().is_empty() => TestDatabase::external(url),
        _ => TestDatabase::embedded()?,
    };
    database.apply_schema()?;
    Ok(database)
}

/// Returns the shared database, starting it on first use.
///
/// Startup runs on its own thread so that it can drive a private runtime
/// while the calling test is inside `#[tokio::test]`.
pub fn shared_database() -> Result<&'static TestDatabase, BoxError> {
    let outcome = SHARED_DATABASE.get_or_init(|| {
        std::thread::spawn(|| start_database().map_err(|err| err.to_string()))
            .join()
            .unwrap_or_else(|_| Err("PostgreSQL startup thread panicked".to_owned()))
    });
    outcome
        .as_ref()
        .map_err(|message| format!("failed to prepare PostgreSQL for tests: {message}").into())
}
