//! # Database Infrastructure
//!
//! Opens the [SurrealDB](https://surrealdb.com) session the phonebook stores its records in,
//! and brings the schema up to date before anyone reads from it.
//!
//! - Any url the `any` engine accepts: `mem://`, `rocksdb://`, `ws://`, `http://`.
//! - Remote engines get a few health checks with backoff before the connect is declared failed.
//! - Feature slices ship versioned [`Migration`]s that run once, in registration order.
//!
//! ## Example
//!
//! ```rust
//! use phonebook_database::{Database, DatabaseError, Migration};
//!
//! const SCHEMA: Migration = Migration::new("demo", "0001", "DEFINE TABLE IF NOT EXISTS demo SCHEMALESS;");
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder()
//!         .url("mem://")
//!         .session("phonebook", "phonebook")
//!         .migration(SCHEMA)
//!         .init()
//!         .await?;
//!
//!     assert!(db.is_healthy().await);
//!     Ok(())
//! }
//! ```

mod engine;
mod error;
mod migrations;

pub use engine::{Engine, Retry};
pub use error::{DatabaseError, DatabaseErrorExt};
pub use migrations::Migration;

use migrations::MigrationRunner;
use phonebook_domain::config::DatabaseConfig;
use std::ops::Deref;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
struct Session {
    client: Surreal<Any>,
    engine: Engine,
    namespace: String,
    database: String,
}

/// Shared handle to an open `SurrealDB` session.
///
/// Cloning is cheap; every clone talks to the same engine. Derefs to the raw client
/// for queries.
#[derive(Debug, Clone)]
pub struct Database {
    session: Arc<Session>,
}

impl Database {
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::default()
    }

    #[must_use]
    pub fn engine(&self) -> Engine {
        self.session.engine
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.session.namespace
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.session.database
    }

    /// Returns `true` when the engine answers a health check.
    pub async fn is_healthy(&self) -> bool {
        self.session.client.health().await.is_ok()
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.session.client
    }
}

/// Collects connection settings and schema migrations, then opens the session.
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    url: Option<String>,
    namespace: Option<String>,
    database: Option<String>,
    credentials: Option<(String, String)>,
    retry: Retry,
    migrations: Vec<Migration>,
}

impl DatabaseBuilder {
    /// Takes url, session and credentials from a loaded config section.
    pub fn config(mut self, cfg: &DatabaseConfig) -> Self {
        self = self.url(&cfg.url).session(&cfg.namespace, &cfg.database);
        if let Some(creds) = &cfg.credentials {
            self = self.auth(&creds.username, &creds.password);
        }
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the namespace and database name.
    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self.database = Some(database.into());
        self
    }

    /// Signs in as root with these credentials after connecting.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Overrides the warm-up schedule used for remote engines.
    pub fn retry(mut self, retry: Retry) -> Self {
        self.retry = retry;
        self
    }

    /// Registers a schema migration to run during [`DatabaseBuilder::init`].
    pub fn migration(mut self, migration: Migration) -> Self {
        self.migrations.push(migration);
        self
    }

    /// Opens the session.
    ///
    /// # Process
    /// 1. Checks that url, namespace and database were supplied.
    /// 2. Starts the engine. Remote engines are health-checked on the [`Retry`] schedule.
    /// 3. Signs in when credentials were given, then selects namespace and database.
    /// 4. Applies every registered [`Migration`] not recorded as applied yet.
    ///
    /// # Errors
    /// * [`DatabaseError::MissingSetting`] if url, namespace or database is absent.
    /// * [`DatabaseError::Unreachable`] if the engine fails to start or stays unhealthy.
    /// * [`DatabaseError::SignIn`] if the credentials are refused.
    /// * [`DatabaseError::Surreal`] if selecting the session fails.
    /// * [`DatabaseError::Migration`] if a schema script is rejected.
    #[instrument(skip_all, fields(url = self.url))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = self.url.ok_or(DatabaseError::MissingSetting { setting: "url" })?;
        let namespace = self.namespace.ok_or(DatabaseError::MissingSetting { setting: "namespace" })?;
        let database = self.database.ok_or(DatabaseError::MissingSetting { setting: "database" })?;

        let engine = Engine::of(&url).ok_or_else(|| DatabaseError::Unreachable {
            message: "unsupported url scheme".into(),
            context: Some(url.clone().into()),
        })?;

        let client = connect(url.as_str()).await.map_err(|e| DatabaseError::Unreachable {
            message: e.to_string().into(),
            context: Some("Starting engine".into()),
        })?;

        if engine.needs_warmup() {
            wait_until_healthy(&client, self.retry, &url).await?;
        }

        if let Some((username, password)) = &self.credentials {
            client
                .signin(Root { username: username.as_str(), password: password.as_str() })
                .await
                .map_err(|e| DatabaseError::SignIn {
                    message: e.to_string().into(),
                    context: Some(url.clone().into()),
                })?;
        }

        client
            .use_ns(namespace.as_str())
            .use_db(database.as_str())
            .await
            .context("Selecting namespace and database")?;

        info!(%engine, %namespace, %database, "SurrealDB session open");

        if !self.migrations.is_empty() {
            let report = MigrationRunner::new(&client).run(&self.migrations).await?;
            info!(applied = ?report.applied, up_to_date = ?report.skipped, "Schema migrations done");
        }

        Ok(Database { session: Arc::new(Session { client, engine, namespace, database }) })
    }
}

async fn wait_until_healthy(
    client: &Surreal<Any>,
    retry: Retry,
    url: &str,
) -> Result<(), DatabaseError> {
    let mut delays = retry.delays();
    loop {
        match client.health().await {
            Ok(()) => return Ok(()),
            Err(err) => match delays.next() {
                Some(delay) => {
                    warn!(?delay, error = %err, "Database not ready, retrying");
                    tokio::time::sleep(delay).await;
                }
                None => {
                    debug!(error = %err, "Giving up on database health check");
                    return Err(DatabaseError::Unreachable {
                        message: "unhealthy after retries".into(),
                        context: Some(url.to_owned().into()),
                    });
                }
            },
        }
    }
}
