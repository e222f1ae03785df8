//! Job listing repository: validated writes, localized reads and search.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jobs_core::{
    JobAttributes, JobField, JobListing, JobListingId, JobTranslation, Locale, Parameterize,
    SlugStrategy, ValidationErrors, validate, validation,
};
use search::{DocumentKey, IndexDocument, KeywordIndex, MemoryKeywordIndex};

use crate::query::{JobQuery, SortDirection};
use crate::records::{LISTING_TABLE, ListingRecord, TRANSLATION_TABLE, TranslationRecord};
use crate::repositories::TranslationStore;
use crate::repositories::translation_repo::bind_filters;
use crate::{Database, DbError, RepositoryConfig};

/// Give up looking for a free slug after this many candidates.
const MAX_SLUG_ATTEMPTS: u32 = 100;

/// Thrown inside the save transaction when another listing owns the title.
const TITLE_TAKEN_SIGNAL: &str = "job_listing_title_taken";

/// Name of the unique (slug, locale) index, as reported by the store.
const SLUG_INDEX: &str = "job_translation_slug";

/// Marker in the store's message for optimistic transaction conflicts.
const RETRYABLE_CONFLICT: &str = "can be retried";

/// Saves attempted before a slug lost to a concurrent writer is reported.
const MAX_SAVE_ATTEMPTS: u32 = 3;

/// Writes the base record and one translation row atomically. The title
/// check is repeated here so concurrent writers cannot both commit it.
const SAVE_LISTING: &str = r#"
BEGIN TRANSACTION;
LET $taken = (SELECT VALUE listing FROM job_translation WHERE title = $title AND listing != $listing);
IF array::len($taken) > 0 {
    THROW "job_listing_title_taken";
};
UPSERT type::thing('job_listing', $listing) SET
    draft = $draft,
    published_at = <datetime> $published_at,
    created_at = <datetime> $created_at,
    updated_at = <datetime> $updated_at;
UPSERT type::thing('job_translation', [$listing, $locale]) CONTENT $translation;
COMMIT TRANSACTION;
"#;

/// Applications and translations go first, then the listing itself.
const DELETE_LISTING: &str = r#"
BEGIN TRANSACTION;
DELETE job_application WHERE job_id = $listing;
DELETE job_translation WHERE listing = $listing;
DELETE type::thing('job_listing', $listing);
COMMIT TRANSACTION;
"#;

/// Repository for job listings.
///
/// Slug generation and the keyword index are injected strategies; the
/// locale is always passed by the caller.
pub struct JobListingRepository<I = MemoryKeywordIndex, S = Parameterize> {
    db: Database,
    translations: TranslationStore,
    config: RepositoryConfig,
    slugs: S,
    index: I,
}

impl JobListingRepository {
    /// Repository with the default slug strategy and an in-memory keyword index.
    pub fn new(db: Database, config: RepositoryConfig) -> Self {
        Self::with_strategies(db, config, Parameterize::default(), MemoryKeywordIndex::new())
    }
}

impl<I: KeywordIndex, S: SlugStrategy> JobListingRepository<I, S> {
    pub fn with_strategies(db: Database, config: RepositoryConfig, slugs: S, index: I) -> Self {
        Self {
            translations: TranslationStore::new(db.clone()),
            db,
            config,
            slugs,
            index,
        }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn translations(&self) -> &TranslationStore {
        &self.translations
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Create a listing with its first translation.
    pub async fn create(&self, locale: &Locale, attrs: JobAttributes) -> Result<JobListing, DbError> {
        let id = JobListingId::new();
        self.check(id, &attrs).await?;

        let slug = self.generate_slug(id, &attrs.title, locale).await?;
        let now = Utc::now();
        let base = BaseRow {
            draft: attrs.draft.unwrap_or(false),
            published_at: attrs.published_at.unwrap_or(now),
            created_at: now,
            updated_at: now,
        };
        let translation = attrs.into_translation(locale.clone(), slug);

        let translation = self.persist(id, &base, translation).await?;
        tracing::debug!("Created job listing {} ({})", id, translation.slug);

        self.sync_index(id, &translation).await;
        self.get(id).await
    }

    /// Update a listing's translation for `locale` and any base attributes set
    /// in `attrs`.
    ///
    /// Adds the locale variant when the listing has none yet. Unset `draft`
    /// and `published_at` keep their stored values. The slug is only
    /// regenerated when the title differs from the stored one.
    pub async fn update(
        &self,
        id: JobListingId,
        locale: &Locale,
        attrs: JobAttributes,
    ) -> Result<JobListing, DbError> {
        let existing = self.base_record(id).await?;
        self.check(id, &attrs).await?;

        let current = self
            .translations
            .for_listing(id, Some(locale))
            .await?
            .into_iter()
            .next();

        let slug = match current {
            Some(t) if t.title == attrs.title => t.slug,
            _ => self.generate_slug(id, &attrs.title, locale).await?,
        };

        let base = BaseRow {
            draft: attrs.draft.unwrap_or(existing.draft),
            published_at: attrs.published_at.unwrap_or(existing.published_at),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        let translation = attrs.into_translation(locale.clone(), slug);

        let translation = self.persist(id, &base, translation).await?;
        tracing::debug!("Updated job listing {} in {}", id, locale);

        self.sync_index(id, &translation).await;
        self.get(id).await
    }

    /// Delete a listing together with its applications and translations.
    pub async fn delete(&self, id: JobListingId) -> Result<(), DbError> {
        self.base_record(id).await?;
        let translations = self.translations.for_listing(id, None).await?;

        self.db
            .query(DELETE_LISTING)
            .bind(("listing", id.to_string()))
            .await?
            .check()?;
        tracing::debug!("Deleted job listing {}", id);

        if self.config.search_enabled {
            for t in translations {
                let key = DocumentKey::new(id, t.locale);
                if let Err(e) = self.index.remove(&key).await {
                    tracing::warn!("Failed to remove {} from keyword index: {}", key, e);
                }
            }
        }

        Ok(())
    }

    /// Get a listing with all of its translations.
    pub async fn get(&self, id: JobListingId) -> Result<JobListing, DbError> {
        let record = self.base_record(id).await?;
        let translations = self.translations.for_listing(id, None).await?;
        record.into_listing(translations)
    }

    /// Get a listing by its slug in `locale`.
    pub async fn find_by_slug(&self, slug: &str, locale: &Locale) -> Result<JobListing, DbError> {
        let id = self
            .translations
            .slug_owner(slug, locale)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Job listing not found: {slug} ({locale})")))?;
        self.get(id).await
    }

    /// Get a listing by slug, falling back to its id.
    pub async fn find(&self, slug_or_id: &str, locale: &Locale) -> Result<JobListing, DbError> {
        if let Some(id) = self.translations.slug_owner(slug_or_id, locale).await? {
            return self.get(id).await;
        }

        match JobListingId::parse(slug_or_id) {
            Ok(id) => self.get(id).await,
            Err(_) => Err(DbError::NotFound(format!(
                "Job listing not found: {slug_or_id}"
            ))),
        }
    }

    /// At most `limit` listings, newest first. Not locale-filtered.
    pub async fn latest(&self, limit: usize) -> Result<Vec<JobListing>, DbError> {
        let mut response = self
            .db
            .query("SELECT * FROM job_listing ORDER BY created_at DESC LIMIT $limit")
            .bind(("limit", i64::try_from(limit).unwrap_or(i64::MAX)))
            .await?;

        let records: Vec<ListingRecord> = response.take(0)?;
        let ids = records
            .iter()
            .map(ListingRecord::listing_id)
            .collect::<Result<Vec<_>, _>>()?;
        let mut translations = self.translations.for_listings(&ids, None).await?;

        records
            .into_iter()
            .zip(ids)
            .map(|(record, id)| record.into_listing(translations.remove(&id).unwrap_or_default()))
            .collect()
    }

    /// [`latest`](Self::latest) with the configured default size.
    pub async fn latest_default(&self) -> Result<Vec<JobListing>, DbError> {
        self.latest(self.config.latest_limit).await
    }

    /// Listings that are live right now in `locale`.
    pub async fn live(&self, locale: Option<&Locale>) -> Result<Vec<JobListing>, DbError> {
        self.published_before(Utc::now(), locale).await
    }

    /// Non-draft listings with `published_at <= as_of` that have a
    /// translation in `locale` (or the configured default locale).
    ///
    /// The boundary is inclusive, matching [`JobListing::is_live_at`].
    pub async fn published_before(
        &self,
        as_of: DateTime<Utc>,
        locale: Option<&Locale>,
    ) -> Result<Vec<JobListing>, DbError> {
        self.fetch(&JobQuery::published_before(as_of), locale).await
    }

    /// Run a localized query.
    ///
    /// `locale` applies when the query has no locale condition of its own;
    /// without either the configured default locale is used. Returned
    /// listings carry the translation rows that satisfied the query.
    pub async fn fetch(
        &self,
        query: &JobQuery,
        locale: Option<&Locale>,
    ) -> Result<Vec<JobListing>, DbError> {
        let base = query.base_statement(LISTING_TABLE)?;
        let mut response = bind_filters(self.db.query(base.sql), base.bindings).await?;
        let records: Vec<ListingRecord> = response.take(0)?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let ids = records
            .iter()
            .map(ListingRecord::listing_id)
            .collect::<Result<Vec<_>, _>>()?;
        let locale = locale.unwrap_or(&self.config.default_locale);
        let statement = query.translation_statement(TRANSLATION_TABLE, locale)?;
        let mut translations = self.translations.select(statement, &ids).await?;

        let mut listings = Vec::with_capacity(records.len());
        for (record, id) in records.into_iter().zip(ids) {
            if let Some(rows) = translations.remove(&id) {
                listings.push(record.into_listing(rows)?);
            }
        }

        if let Some((field, direction)) = query.translated_order() {
            listings.sort_by(|a, b| {
                let ordering = sort_key(a, field).cmp(&sort_key(b, field));
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.max_results() {
            listings.truncate(limit);
        }

        Ok(listings)
    }

    /// Keyword search over title, description, employment terms and hours.
    ///
    /// Results follow the index ranking; each carries its `locale` translation.
    pub async fn search(&self, terms: &str, locale: &Locale) -> Result<Vec<JobListing>, DbError> {
        if !self.config.search_enabled {
            return Err(DbError::SearchDisabled);
        }

        let hits = self.index.search(terms).await?;
        let mut seen = HashSet::new();
        let mut listings = Vec::new();

        for hit in hits.into_iter().filter(|h| &h.key.locale == locale) {
            if !seen.insert(hit.key.listing) {
                continue;
            }
            match self.localized(hit.key.listing, locale).await {
                Ok(listing) => listings.push(listing),
                Err(DbError::NotFound(_)) => {
                    tracing::warn!("Keyword index references missing listing {}", hit.key);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(listings)
    }

    /// Rebuild the keyword index from the translation store.
    ///
    /// Returns the number of indexed documents.
    pub async fn reindex(&self) -> Result<usize, DbError> {
        if !self.config.search_enabled {
            return Err(DbError::SearchDisabled);
        }

        self.index.clear().await?;
        let rows = self.translations.all().await?;
        for (id, translation) in &rows {
            let key = DocumentKey::new(*id, translation.locale.clone());
            self.index.upsert(&key, &IndexDocument::from(translation)).await?;
        }

        tracing::info!("Rebuilt keyword index with {} documents", rows.len());
        Ok(rows.len())
    }

    async fn base_record(&self, id: JobListingId) -> Result<ListingRecord, DbError> {
        let record: Option<ListingRecord> = self.db.select((LISTING_TABLE, id.to_string())).await?;

        record.ok_or_else(|| DbError::NotFound(format!("Job listing not found: {}", id)))
    }

    async fn localized(&self, id: JobListingId, locale: &Locale) -> Result<JobListing, DbError> {
        let record = self.base_record(id).await?;
        let translations = self.translations.for_listing(id, Some(locale)).await?;
        record.into_listing(translations)
    }

    /// Presence, length and title uniqueness, reported together.
    async fn check(&self, id: JobListingId, attrs: &JobAttributes) -> Result<(), DbError> {
        let mut errors = validate(attrs).err().unwrap_or_default();

        if !attrs.title.trim().is_empty() && self.translations.title_taken(&attrs.title, id).await? {
            errors.add(JobField::Title, validation::TAKEN);
        }

        Ok(errors.into_result()?)
    }

    /// First free slug candidate for `title` in `locale`.
    ///
    /// A candidate already owned by `id` itself is reused.
    async fn generate_slug(
        &self,
        id: JobListingId,
        title: &str,
        locale: &Locale,
    ) -> Result<String, DbError> {
        let base = self.slugs.slugify(title);
        if base.is_empty() {
            return Err(ValidationErrors::single(JobField::Slug, validation::BLANK).into());
        }

        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let candidate = self.slugs.candidate(&base, attempt);
            if self.slugs.is_reserved(&candidate) {
                continue;
            }
            match self.translations.slug_owner(&candidate, locale).await? {
                Some(owner) if owner != id => continue,
                _ => return Ok(candidate),
            }
        }

        Err(ValidationErrors::single(JobField::Slug, validation::TAKEN).into())
    }

    /// Save, moving to a fresh slug when a concurrent writer took the
    /// chosen one between generation and commit.
    async fn persist(
        &self,
        id: JobListingId,
        base: &BaseRow,
        mut translation: JobTranslation,
    ) -> Result<JobTranslation, DbError> {
        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            match self.save(id, base, &translation).await? {
                Saved::Committed => return Ok(translation),
                Saved::Conflict if attempt < MAX_SAVE_ATTEMPTS => {
                    tracing::debug!(
                        "Slug {} for {} lost to a concurrent write, retrying",
                        translation.slug,
                        id
                    );
                    translation.slug = self
                        .generate_slug(id, &translation.title, &translation.locale)
                        .await?;
                }
                Saved::Conflict => break,
            }
        }

        Err(ValidationErrors::single(JobField::Slug, validation::TAKEN).into())
    }

    async fn save(
        &self,
        id: JobListingId,
        base: &BaseRow,
        translation: &JobTranslation,
    ) -> Result<Saved, DbError> {
        let result = self
            .db
            .query(SAVE_LISTING)
            .bind(("listing", id.to_string()))
            .bind(("locale", translation.locale.to_string()))
            .bind(("title", translation.title.clone()))
            .bind(("draft", base.draft))
            .bind(("published_at", base.published_at.to_rfc3339()))
            .bind(("created_at", base.created_at.to_rfc3339()))
            .bind(("updated_at", base.updated_at.to_rfc3339()))
            .bind(("translation", TranslationRecord::from_translation(id, translation)))
            .await;

        let mut errors: Vec<_> = match result {
            Ok(mut response) => response.take_errors().into_iter().collect(),
            Err(e) if e.to_string().contains(RETRYABLE_CONFLICT) => return Ok(Saved::Conflict),
            Err(e) => return Err(e.into()),
        };
        if errors.is_empty() {
            return Ok(Saved::Committed);
        }

        // A failed transaction reports on every statement; look for the cause.
        let messages: Vec<String> = errors.iter().map(|(_, e)| e.to_string()).collect();
        if messages.iter().any(|m| m.contains(TITLE_TAKEN_SIGNAL)) {
            return Err(ValidationErrors::single(JobField::Title, validation::TAKEN).into());
        }
        if messages
            .iter()
            .any(|m| m.contains(SLUG_INDEX) || m.contains(RETRYABLE_CONFLICT))
        {
            return Ok(Saved::Conflict);
        }

        errors.sort_by_key(|(i, _)| *i);
        let (_, first) = errors.remove(0);
        Err(DbError::Store(first))
    }

    /// Push the indexed fields to the keyword index.
    ///
    /// Failures leave the index stale but never fail the write.
    async fn sync_index(&self, id: JobListingId, translation: &JobTranslation) {
        if !self.config.search_enabled {
            return;
        }

        let key = DocumentKey::new(id, translation.locale.clone());
        if let Err(e) = self.index.upsert(&key, &IndexDocument::from(translation)).await {
            tracing::warn!("Failed to update keyword index for {}: {}", key, e);
        }
    }
}

fn sort_key(listing: &JobListing, field: JobField) -> Option<String> {
    listing
        .translations
        .first()
        .and_then(|t| t.text(field))
        .map(str::to_lowercase)
}

/// Base record values written alongside a translation.
struct BaseRow {
    draft: bool,
    published_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

enum Saved {
    Committed,
    /// The slug index or a concurrent transaction rejected the write.
    Conflict,
}
