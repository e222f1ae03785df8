//! SurrealDB integration for localized job listings.
//!
//! This crate provides database connectivity, the translation store and the
//! repositories for listings and their applications.
//!
//! # Features
//!
//! - `memory` (default): Use in-memory storage for testing
//! - `rocksdb`: Use RocksDB for persistent file-based storage

mod config;
mod connection;
pub mod query;
mod records;
pub mod repositories;
mod schema;

pub use config::{DEFAULT_LATEST_LIMIT, RepositoryConfig};
pub use connection::{Database, DbConfig, DbError, connect};
pub use query::{Comparison, FilterValue, JobQuery, SortDirection};
pub use repositories::{JobApplicationRepository, JobListingRepository, TranslationStore};
pub use schema::init_schema;

/// Connect and initialize the schema.
///
/// This should be called once at application startup; the returned handle
/// is shared by cloning it into each repository.
pub async fn init(config: &DbConfig) -> Result<Database, DbError> {
    let db = connect(config).await?;
    init_schema(&db).await?;
    Ok(db)
}
