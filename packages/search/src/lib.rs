//! Keyword index used for full-text search over job listings.
//!
//! The index is treated as an external service: the repository pushes
//! documents after every committed write and asks it for ranked keys. Only
//! four fields are indexed: title, description, employment terms and hours.
//!
//! - [`KeywordIndex`] is the contract a backend implements.
//! - [`MemoryKeywordIndex`] is an in-process backend for single-node
//!   deployments and tests.

mod memory;
mod query;

use std::future::Future;

use jobs_core::{JobListingId, JobTranslation, Locale};
use serde::{Deserialize, Serialize};

pub use memory::MemoryKeywordIndex;
pub use query::{SearchQuery, tokenize};

/// Default minimum token length; shorter words are not indexed.
pub const DEFAULT_MIN_WORD_SIZE: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("keyword index unavailable: {0}")]
    Unavailable(String),

    #[error("invalid document key: {0}")]
    InvalidKey(String),
}

/// Identifies one indexed document: a listing in one locale.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentKey {
    pub listing: JobListingId,
    pub locale: Locale,
}

impl DocumentKey {
    pub fn new(listing: JobListingId, locale: Locale) -> Self {
        Self { listing, locale }
    }

    /// Parse the `listing/locale` form produced by `Display`.
    pub fn parse(s: &str) -> Result<Self, IndexError> {
        let (listing, locale) = s
            .split_once('/')
            .ok_or_else(|| IndexError::InvalidKey(s.to_string()))?;
        let listing = JobListingId::parse(listing).map_err(|_| IndexError::InvalidKey(s.to_string()))?;
        let locale = Locale::parse(locale).map_err(|_| IndexError::InvalidKey(s.to_string()))?;
        Ok(Self { listing, locale })
    }
}

impl std::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.listing, self.locale)
    }
}

/// The indexed subset of a listing translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub title: String,
    pub description: String,
    pub employment_terms: Option<String>,
    pub hours: Option<String>,
}

impl From<&JobTranslation> for IndexDocument {
    fn from(t: &JobTranslation) -> Self {
        Self {
            title: t.title.clone(),
            description: t.description.clone(),
            employment_terms: t.employment_terms.clone(),
            hours: t.hours.clone(),
        }
    }
}

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub key: DocumentKey,
    pub score: u32,
}

/// Backend contract for the keyword index.
///
/// Implementations own their ranking and tokenization; callers rely only on
/// the index reflecting the latest upserted documents.
pub trait KeywordIndex: Send + Sync {
    /// Insert or replace a document.
    fn upsert(
        &self,
        key: &DocumentKey,
        document: &IndexDocument,
    ) -> impl Future<Output = Result<(), IndexError>> + Send;

    /// Remove a document. Removing an unknown key is not an error.
    fn remove(&self, key: &DocumentKey) -> impl Future<Output = Result<(), IndexError>> + Send;

    /// Drop every document.
    fn clear(&self) -> impl Future<Output = Result<(), IndexError>> + Send;

    /// Documents matching `query`, best match first.
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<SearchHit>, IndexError>> + Send;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods)]

    use super::*;

    #[test]
    fn document_keys_round_trip_through_display() {
        let key = DocumentKey::new(JobListingId::new(), Locale::parse("nl").unwrap());
        let parsed = DocumentKey::parse(&key.to_string()).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(matches!(DocumentKey::parse("nope"), Err(IndexError::InvalidKey(_))));
        assert!(matches!(DocumentKey::parse("nope/en"), Err(IndexError::InvalidKey(_))));
    }
}
