//! # Database Infrastructure
//!
//! This crate provides a unified interface for initializing and managing [SurrealDB](https://surrealdb.com)
//! connections across the workspace.
//!
//! ## Key Features
//! - **Engine Agnostic**: Supports `mem://`, `rocksdb://`, `ws://`, and `http://` via the `any` engine.
//! - **Resilient Connectivity**: Built-in retry logic for health checks during engine startup.
//! - **Versioned Schema**: Bundled `.surql` migrations are applied once and checksummed.
//! - **Builder Pattern**: Fluent API for configuring connections and authentication.
//!
//! ## Example
//!
//! ```rust
//! use moringa_database::{Database, DatabaseError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder()
//!         .url("mem://")
//!         .session("moringa", "site")
//!         .init()
//!         .await?;
//!
//!     let _version = db.version().await?;
//!
//!     Ok(())
//! }
//! ```

mod error;
mod migrations;

pub use error::{DatabaseError, DatabaseErrorExt};
pub use migrations::MigrationReport;

use migrations::MigrationRunner;
use moringa_domain::config::DatabaseConfig;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use tracing::{info, instrument, warn};

/// Health probes before giving up on a freshly started engine.
pub const HEALTH_CHECK_ATTEMPTS: u32 = 3;

/// Inner state of the [`Database`] wrapper.
#[derive(Debug)]
pub struct DatabaseInner {
    instance: Surreal<Any>,
    ns: String,
    db: String,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        info!(ns = %self.ns, db = %self.db, "SurrealDB session handle dropped");
    }
}

/// `SurrealDB` client wrapper that provides thread-safety and contextual error handling.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Creates a new [`DatabaseBuilder`].
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Namespace of the active session.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.ns
    }

    /// Database name of the active session.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.inner.db
    }

    /// Applies every bundled migration that has not been recorded yet.
    ///
    /// Runs automatically in [`DatabaseBuilder::init`]; calling it again is a no-op
    /// that reports every version as skipped.
    ///
    /// # Errors
    /// * [`DatabaseError::Migration`] if a recorded checksum differs from the bundled script.
    /// * [`DatabaseError::Surreal`] if a script is rejected by the engine.
    pub async fn migrate(&self) -> Result<MigrationReport, DatabaseError> {
        MigrationRunner::new(&self.inner.instance).run().await
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

/// Connection parameters for [`Database`]. Nothing happens until [`init`](Self::init).
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    url: Option<String>,
    ns: Option<String>,
    db: Option<String>,
    auth: Option<(String, String)>,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-filled from the `[database]` config section.
    pub fn from_config(cfg: &DatabaseConfig) -> Self {
        let builder = Self::new().url(&cfg.url).session(&cfg.namespace, &cfg.database);
        match &cfg.credentials {
            Some(creds) => builder.auth(&creds.username, &creds.password),
            None => builder,
        }
    }

    /// Engine URL: `mem://`, `rocksdb://path`, `ws://host:port` or `http://host:port`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.ns = Some(namespace.into());
        self.db = Some(database.into());
        self
    }

    /// Signs in as a root user after connecting.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some((username.into(), password.into()));
        self
    }

    /// Connects, selects the session and brings the schema up to date.
    ///
    /// The engine gets [`HEALTH_CHECK_ATTEMPTS`] health probes, 500ms apart at first
    /// and doubling after each failure.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] if the URL or the session is missing.
    /// * [`DatabaseError::Connection`] if the engine cannot start or stays unhealthy.
    /// * [`DatabaseError::Auth`] if the credentials are rejected.
    /// * [`DatabaseError::Surreal`] if the namespace or database cannot be selected.
    /// * [`DatabaseError::Migration`] if a bundled migration conflicts with the recorded one.
    #[instrument(skip(self), fields(url = self.url, ns = self.ns, db = self.db))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = required(self.url, "URL")?;
        let ns = required(self.ns, "Namespace")?;
        let db = required(self.db, "Database")?;

        let instance = connect(&url).await.map_err(|e| DatabaseError::Connection {
            message: e.to_string().into(),
            context: Some("Initializing engine".into()),
        })?;

        wait_until_healthy(&instance, &url).await?;

        if let Some((username, password)) = self.auth {
            instance.signin(Root { username, password }).await.map_err(|e| DatabaseError::Auth {
                message: e.to_string().into(),
                context: Some(url.clone().into()),
            })?;
        }

        instance.use_ns(&ns).use_db(&db).await.context("Activating session")?;

        let version = instance.version().await.map_or_else(|_| "unknown".to_owned(), |v| v.to_string());
        info!(namespace = %ns, database = %db, %version, "SurrealDB connection established");

        let database = Database { inner: Arc::new(DatabaseInner { instance, ns, db }) };

        let report = database.migrate().await?;
        for version in &report.applied {
            info!(version, "Applied migration");
        }
        info!(skipped = report.skipped.len(), "Database schema is up to date");

        Ok(database)
    }
}

fn required(value: Option<String>, what: &'static str) -> Result<String, DatabaseError> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| DatabaseError::Validation {
        message: format!("{what} is required").into(),
        context: None,
    })
}

async fn wait_until_healthy(instance: &Surreal<Any>, url: &str) -> Result<(), DatabaseError> {
    let mut delay = Duration::from_millis(500);

    for attempt in 1..=HEALTH_CHECK_ATTEMPTS {
        match instance.health().await {
            Ok(()) => return Ok(()),
            Err(e) if attempt < HEALTH_CHECK_ATTEMPTS => {
                warn!(attempt, ?delay, error = %e, "Database not ready, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
            },
            Err(e) => {
                return Err(DatabaseError::Connection {
                    message: format!("Unhealthy after {attempt} attempts: {e}").into(),
                    context: Some(url.to_owned().into()),
                });
            },
        }
    }

    Ok(())
}
