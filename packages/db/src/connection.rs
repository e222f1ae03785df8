//! Database connection management.

use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect as connect_any};
use surrealdb::opt::auth::Root;
use thiserror::Error;

use jobs_core::ValidationErrors;

use crate::config::env_var;

/// Database connection handle. Cheap to clone; clones share the connection.
pub type Database = Surreal<Any>;

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Connection mode: "mem://", "file://path" or a remote endpoint
    pub endpoint: String,
    /// Namespace to use
    pub namespace: String,
    /// Database name to use
    pub database: String,
    /// Optional root credentials for authentication
    pub credentials: Option<(String, String)>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            endpoint: "mem://".to_string(),
            namespace: "cms".to_string(),
            database: "jobs".to_string(),
            credentials: None,
        }
    }
}

impl DbConfig {
    /// Create a config for in-memory testing.
    pub fn memory() -> Self {
        Self::default()
    }

    /// Create a config for file-based persistence.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            endpoint: format!("file://{}", path.into()),
            ..Default::default()
        }
    }

    /// Create a config for RocksDB persistence (requires rocksdb feature).
    pub fn rocksdb(path: impl Into<String>) -> Self {
        Self {
            endpoint: format!("rocksdb://{}", path.into()),
            ..Default::default()
        }
    }

    /// Build a config from environment variables.
    ///
    /// - `DB_ENDPOINT` (default: `mem://`)
    /// - `DB_NAMESPACE` (default: `cms`)
    /// - `DB_DATABASE` (default: `jobs`)
    /// - `DB_USERNAME` + `DB_PASSWORD` (optional; both required to sign in)
    pub fn from_env() -> Result<Self, DbError> {
        let defaults = Self::default();

        let credentials = match (env_var("DB_USERNAME")?, env_var("DB_PASSWORD")?) {
            (Some(user), Some(pass)) => Some((user, pass)),
            (None, None) => None,
            _ => {
                return Err(DbError::Config(
                    "DB_USERNAME and DB_PASSWORD must be set together".into(),
                ));
            }
        };

        Ok(Self {
            endpoint: env_var("DB_ENDPOINT")?.unwrap_or(defaults.endpoint),
            namespace: env_var("DB_NAMESPACE")?.unwrap_or(defaults.namespace),
            database: env_var("DB_DATABASE")?.unwrap_or(defaults.database),
            credentials,
        })
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set root credentials for authentication.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }
}

/// Errors surfaced by the repositories.
#[derive(Debug, Error)]
pub enum DbError {
    /// One or more field constraints failed; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("Not found: {0}")]
    NotFound(String),
    /// The store could not be reached or rejected the statement.
    #[error("Store unavailable: {0}")]
    Store(#[from] surrealdb::Error),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Keyword search is disabled")]
    SearchDisabled,
    #[error("Keyword index error: {0}")]
    Index(#[from] search::IndexError),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Open a connection and select the configured namespace and database.
pub async fn connect(config: &DbConfig) -> Result<Database, DbError> {
    tracing::info!("Connecting to database: {}", config.endpoint);

    let db = connect_any(config.endpoint.as_str()).await?;

    // Authenticate if credentials provided
    if let Some((username, password)) = &config.credentials {
        db.signin(Root { username, password }).await?;
    }

    db.use_ns(&config.namespace).use_db(&config.database).await?;

    tracing::info!(
        "Connected to database: {}/{}",
        config.namespace,
        config.database
    );

    Ok(db)
}

