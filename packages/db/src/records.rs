//! Internal record types for SurrealDB and their domain conversions.

use chrono::{DateTime, Utc};
use jobs_core::{
    JobApplication, JobApplicationId, JobListing, JobListingId, JobTranslation, Locale,
};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::DbError;

pub(crate) const LISTING_TABLE: &str = "job_listing";
pub(crate) const TRANSLATION_TABLE: &str = "job_translation";
pub(crate) const APPLICATION_TABLE: &str = "job_application";

/// Base listing row as read back from the store.
#[derive(Debug, Deserialize)]
pub(crate) struct ListingRecord {
    pub id: Option<Thing>,
    pub draft: bool,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingRecord {
    pub fn listing_id(&self) -> Result<JobListingId, DbError> {
        let raw = self.id.as_ref().map(|t| t.id.to_raw()).unwrap_or_default();
        JobListingId::parse(&raw)
            .map_err(|e| DbError::Serialization(format!("bad listing id {raw:?}: {e}")))
    }

    pub fn into_listing(self, translations: Vec<JobTranslation>) -> Result<JobListing, DbError> {
        Ok(JobListing {
            id: self.listing_id()?,
            draft: self.draft,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            translations,
        })
    }
}

/// Translation row, read and written as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TranslationRecord {
    pub listing: String,
    pub locale: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(default)]
    pub employment_terms: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub languages: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

impl TranslationRecord {
    pub fn from_translation(listing: JobListingId, t: &JobTranslation) -> Self {
        Self {
            listing: listing.to_string(),
            locale: t.locale.to_string(),
            title: t.title.clone(),
            slug: t.slug.clone(),
            description: t.description.clone(),
            employment_terms: t.employment_terms.clone(),
            hours: t.hours.clone(),
            education: t.education.clone(),
            experience: t.experience.clone(),
            skills: t.skills.clone(),
            languages: t.languages.clone(),
            salary: t.salary.clone(),
            length: t.length.clone(),
            contact: t.contact.clone(),
            reference: t.reference.clone(),
        }
    }

    pub fn into_translation(self) -> Result<JobTranslation, DbError> {
        let locale =
            Locale::parse(&self.locale).map_err(|e| DbError::Serialization(e.to_string()))?;
        Ok(JobTranslation {
            locale,
            title: self.title,
            slug: self.slug,
            description: self.description,
            employment_terms: self.employment_terms,
            hours: self.hours,
            education: self.education,
            experience: self.experience,
            skills: self.skills,
            languages: self.languages,
            salary: self.salary,
            length: self.length,
            contact: self.contact,
            reference: self.reference,
        })
    }
}

/// Application row as read back from the store.
#[derive(Debug, Deserialize)]
pub(crate) struct ApplicationRecord {
    pub id: Option<Thing>,
    pub job_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn into_application(self) -> Result<JobApplication, DbError> {
        let raw = self.id.as_ref().map(|t| t.id.to_raw()).unwrap_or_default();
        let id = JobApplicationId::parse(&raw)
            .map_err(|e| DbError::Serialization(format!("bad application id {raw:?}: {e}")))?;
        let job_id = JobListingId::parse(&self.job_id)
            .map_err(|e| DbError::Serialization(format!("bad listing id {:?}: {e}", self.job_id)))?;

        Ok(JobApplication {
            id,
            job_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            cover_letter: self.cover_letter,
            created_at: self.created_at,
        })
    }
}
