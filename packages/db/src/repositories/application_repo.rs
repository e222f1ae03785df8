//! Application repository.

use jobs_core::{JobApplication, JobApplicationId, JobListingId};
use serde::Deserialize;

use crate::records::{APPLICATION_TABLE, ApplicationRecord, LISTING_TABLE, ListingRecord};
use crate::{Database, DbError};

/// Repository for applications submitted against job listings.
///
/// Applications are removed together with their listing by
/// `JobListingRepository::delete`.
#[derive(Clone)]
pub struct JobApplicationRepository {
    db: Database,
}

#[derive(Debug, Deserialize)]
struct CountRecord {
    count: usize,
}

impl JobApplicationRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Store an application. The listing must exist.
    pub async fn create(&self, application: &JobApplication) -> Result<JobApplication, DbError> {
        let listing: Option<ListingRecord> = self
            .db
            .select((LISTING_TABLE, application.job_id.to_string()))
            .await?;
        if listing.is_none() {
            return Err(DbError::NotFound(format!(
                "Job listing not found: {}",
                application.job_id
            )));
        }

        let mut response = self
            .db
            .query(
                "CREATE type::thing('job_application', $id) SET \
                 job_id = $job_id, name = $name, email = $email, phone = $phone, \
                 cover_letter = $cover_letter, created_at = <datetime> $created_at",
            )
            .bind(("id", application.id.to_string()))
            .bind(("job_id", application.job_id.to_string()))
            .bind(("name", application.name.clone()))
            .bind(("email", application.email.clone()))
            .bind(("phone", application.phone.clone()))
            .bind(("cover_letter", application.cover_letter.clone()))
            .bind(("created_at", application.created_at.to_rfc3339()))
            .await?;

        let created: Option<ApplicationRecord> = response.take(0)?;
        tracing::debug!(
            "Created application {} for listing {}",
            application.id,
            application.job_id
        );

        created
            .ok_or_else(|| DbError::Query("Failed to create application".into()))?
            .into_application()
    }

    pub async fn get(&self, id: JobApplicationId) -> Result<JobApplication, DbError> {
        let record: Option<ApplicationRecord> =
            self.db.select((APPLICATION_TABLE, id.to_string())).await?;

        record
            .ok_or_else(|| DbError::NotFound(format!("Application not found: {}", id)))?
            .into_application()
    }

    /// Applications for a listing, oldest first.
    pub async fn list_for_job(&self, job_id: JobListingId) -> Result<Vec<JobApplication>, DbError> {
        let mut response = self
            .db
            .query("SELECT * FROM job_application WHERE job_id = $job_id ORDER BY created_at ASC")
            .bind(("job_id", job_id.to_string()))
            .await?;

        let records: Vec<ApplicationRecord> = response.take(0)?;
        records
            .into_iter()
            .map(ApplicationRecord::into_application)
            .collect()
    }

    pub async fn count_for_job(&self, job_id: JobListingId) -> Result<usize, DbError> {
        let mut response = self
            .db
            .query("SELECT count() FROM job_application WHERE job_id = $job_id GROUP ALL")
            .bind(("job_id", job_id.to_string()))
            .await?;

        let counts: Vec<CountRecord> = response.take(0)?;
        Ok(counts.first().map(|c| c.count).unwrap_or(0))
    }

    pub async fn delete(&self, id: JobApplicationId) -> Result<(), DbError> {
        let deleted: Option<ApplicationRecord> =
            self.db.delete((APPLICATION_TABLE, id.to_string())).await?;

        if deleted.is_none() {
            return Err(DbError::NotFound(format!("Application not found: {}", id)));
        }

        tracing::debug!("Deleted application {}", id);
        Ok(())
    }
}
