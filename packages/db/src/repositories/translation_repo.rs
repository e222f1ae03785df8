//! Translation store: one row per (listing, locale).

use std::collections::HashMap;

use jobs_core::{JobListingId, JobTranslation, Locale};
use surrealdb::engine::any::Any;
use surrealdb::method::Query;

use crate::query::{FilterValue, Statement};
use crate::records::{TRANSLATION_TABLE, TranslationRecord};
use crate::{Database, DbError};

/// Read access to translated listing content.
///
/// Writes go through the listing repository so they share its transaction.
#[derive(Clone)]
pub struct TranslationStore {
    db: Database,
}

impl TranslationStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Translations of one listing, optionally restricted to `locale`.
    pub async fn for_listing(
        &self,
        id: JobListingId,
        locale: Option<&Locale>,
    ) -> Result<Vec<JobTranslation>, DbError> {
        let mut grouped = self.for_listings(&[id], locale).await?;
        Ok(grouped.remove(&id).unwrap_or_default())
    }

    /// Translations of several listings grouped by listing.
    pub async fn for_listings(
        &self,
        ids: &[JobListingId],
        locale: Option<&Locale>,
    ) -> Result<HashMap<JobListingId, Vec<JobTranslation>>, DbError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        let mut response = match locale {
            Some(locale) => {
                self.db
                    .query("SELECT * FROM job_translation WHERE listing IN $ids AND locale = $locale ORDER BY locale ASC")
                    .bind(("ids", ids))
                    .bind(("locale", locale.to_string()))
                    .await?
            }
            None => {
                self.db
                    .query("SELECT * FROM job_translation WHERE listing IN $ids ORDER BY locale ASC")
                    .bind(("ids", ids))
                    .await?
            }
        };

        let records: Vec<TranslationRecord> = response.take(0)?;
        group_by_listing(records)
    }

    /// Every translation row, for rebuilding the keyword index.
    pub async fn all(&self) -> Result<Vec<(JobListingId, JobTranslation)>, DbError> {
        let records: Vec<TranslationRecord> = self.db.select(TRANSLATION_TABLE).await?;

        records
            .into_iter()
            .map(|r| Ok((parse_listing(&r.listing)?, r.into_translation()?)))
            .collect()
    }

    /// Listing that owns `slug` in `locale`.
    pub async fn slug_owner(
        &self,
        slug: &str,
        locale: &Locale,
    ) -> Result<Option<JobListingId>, DbError> {
        let mut response = self
            .db
            .query("SELECT VALUE listing FROM job_translation WHERE slug = $slug AND locale = $locale LIMIT 1")
            .bind(("slug", slug.to_string()))
            .bind(("locale", locale.to_string()))
            .await?;

        let owners: Vec<String> = response.take(0)?;
        owners.first().map(|raw| parse_listing(raw)).transpose()
    }

    /// Whether any listing other than `except` uses `title`, in any locale.
    ///
    /// Comparison is exact (case-sensitive), matching the store's collation.
    pub async fn title_taken(&self, title: &str, except: JobListingId) -> Result<bool, DbError> {
        let mut response = self
            .db
            .query("SELECT VALUE listing FROM job_translation WHERE title = $title AND listing != $listing LIMIT 1")
            .bind(("title", title.to_string()))
            .bind(("listing", except.to_string()))
            .await?;

        let owners: Vec<String> = response.take(0)?;
        Ok(!owners.is_empty())
    }

    /// Run a rendered translation statement for the listings in `ids`.
    pub(crate) async fn select(
        &self,
        statement: Statement,
        ids: &[JobListingId],
    ) -> Result<HashMap<JobListingId, Vec<JobTranslation>>, DbError> {
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        let request = bind_filters(self.db.query(statement.sql), statement.bindings);
        let mut response = request.bind(("ids", ids)).await?;

        let records: Vec<TranslationRecord> = response.take(0)?;
        group_by_listing(records)
    }
}

/// Bind rendered filter values; timestamps go in as RFC 3339 strings.
pub(crate) fn bind_filters(
    mut request: Query<'_, Any>,
    bindings: Vec<(String, FilterValue)>,
) -> Query<'_, Any> {
    for (name, value) in bindings {
        request = match value {
            FilterValue::Bool(v) => request.bind((name, v)),
            FilterValue::Text(v) => request.bind((name, v)),
            FilterValue::Time(v) => request.bind((name, v.to_rfc3339())),
        };
    }
    request
}

fn group_by_listing(
    records: Vec<TranslationRecord>,
) -> Result<HashMap<JobListingId, Vec<JobTranslation>>, DbError> {
    let mut grouped: HashMap<JobListingId, Vec<JobTranslation>> = HashMap::new();
    for record in records {
        let id = parse_listing(&record.listing)?;
        grouped.entry(id).or_default().push(record.into_translation()?);
    }
    Ok(grouped)
}

fn parse_listing(raw: &str) -> Result<JobListingId, DbError> {
    JobListingId::parse(raw).map_err(|e| DbError::Serialization(format!("bad listing id {raw:?}: {e}")))
}
