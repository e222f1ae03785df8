#![allow(dead_code)]

use db::{Database, DbConfig, DbError, JobApplicationRepository, JobListingRepository, RepositoryConfig};
use jobs_core::Locale;

/// A fresh in-memory database with the schema applied.
pub async fn setup_db() -> Result<Database, DbError> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    db::init(&DbConfig::memory()).await
}

pub async fn listings() -> Result<JobListingRepository, DbError> {
    let db = setup_db().await?;
    Ok(JobListingRepository::new(db, RepositoryConfig::default()))
}

pub async fn repositories() -> Result<(JobListingRepository, JobApplicationRepository), DbError> {
    let db = setup_db().await?;
    Ok((
        JobListingRepository::new(db.clone(), RepositoryConfig::default()),
        JobApplicationRepository::new(db),
    ))
}

pub fn locale(tag: &str) -> Locale {
    Locale::parse(tag).expect("valid locale")
}
