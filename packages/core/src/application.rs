//! Applications submitted against a job listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::JobListingId;

/// Unique identifier for a job application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobApplicationId(pub Ulid);

impl JobApplicationId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn parse(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for JobApplicationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An application for a listing. Deleted together with its listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: JobApplicationId,
    /// The listing applied for.
    pub job_id: JobListingId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl JobApplication {
    pub fn new(job_id: JobListingId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: JobApplicationId::new(),
            job_id,
            name: name.into(),
            email: email.into(),
            phone: None,
            cover_letter: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_cover_letter(mut self, cover_letter: impl Into<String>) -> Self {
        self.cover_letter = Some(cover_letter.into());
        self
    }
}
