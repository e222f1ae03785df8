//! Database schema definitions using SurrealQL.

use crate::{Database, DbError};

/// Initialize the database schema.
///
/// This creates all necessary tables, fields, and indexes. Safe to run on
/// every startup.
pub async fn init_schema(db: &Database) -> Result<(), DbError> {
    tracing::info!("Initializing database schema...");

    // Base listing table
    db.query(LISTING_SCHEMA).await?.check()?;

    // One row per (listing, locale)
    db.query(TRANSLATION_SCHEMA).await?.check()?;

    // Applications, deleted with their listing
    db.query(APPLICATION_SCHEMA).await?.check()?;

    tracing::info!("Database schema initialized");

    Ok(())
}

/// Locale-independent listing attributes.
const LISTING_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS job_listing SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS draft ON job_listing TYPE bool DEFAULT false;
DEFINE FIELD IF NOT EXISTS published_at ON job_listing TYPE datetime;
DEFINE FIELD IF NOT EXISTS created_at ON job_listing TYPE datetime;
DEFINE FIELD IF NOT EXISTS updated_at ON job_listing TYPE datetime;

-- Indexes for the "latest" and "live" views
DEFINE INDEX IF NOT EXISTS job_listing_created ON job_listing FIELDS created_at;
DEFINE INDEX IF NOT EXISTS job_listing_live ON job_listing FIELDS draft, published_at;
"#;

/// Translated listing content.
const TRANSLATION_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS job_translation SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS listing ON job_translation TYPE string;
DEFINE FIELD IF NOT EXISTS locale ON job_translation TYPE string;
DEFINE FIELD IF NOT EXISTS title ON job_translation TYPE string;
DEFINE FIELD IF NOT EXISTS slug ON job_translation TYPE string;
DEFINE FIELD IF NOT EXISTS description ON job_translation TYPE string;
DEFINE FIELD IF NOT EXISTS employment_terms ON job_translation TYPE option<string>;
DEFINE FIELD IF NOT EXISTS hours ON job_translation TYPE option<string>;
DEFINE FIELD IF NOT EXISTS education ON job_translation TYPE option<string>;
DEFINE FIELD IF NOT EXISTS experience ON job_translation TYPE option<string>;
DEFINE FIELD IF NOT EXISTS skills ON job_translation TYPE option<string>;
DEFINE FIELD IF NOT EXISTS languages ON job_translation TYPE option<string>;
DEFINE FIELD IF NOT EXISTS salary ON job_translation TYPE option<string>;
DEFINE FIELD IF NOT EXISTS length ON job_translation TYPE option<string>;
DEFINE FIELD IF NOT EXISTS contact ON job_translation TYPE option<string>;
DEFINE FIELD IF NOT EXISTS reference ON job_translation TYPE option<string>;

-- Rows are keyed job_translation:[listing, locale], which makes each pair
-- unique. A compound index led by `listing` made `listing IN $ids` lookups
-- come back empty, so it is dropped from older databases.
REMOVE INDEX IF EXISTS job_translation_row ON job_translation;
DEFINE INDEX IF NOT EXISTS job_translation_slug ON job_translation FIELDS slug, locale UNIQUE;
DEFINE INDEX IF NOT EXISTS job_translation_title ON job_translation FIELDS title;
"#;

/// Job applications.
const APPLICATION_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS job_application SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS job_id ON job_application TYPE string;
DEFINE FIELD IF NOT EXISTS name ON job_application TYPE string;
DEFINE FIELD IF NOT EXISTS email ON job_application TYPE string;
DEFINE FIELD IF NOT EXISTS phone ON job_application TYPE option<string>;
DEFINE FIELD IF NOT EXISTS cover_letter ON job_application TYPE option<string>;
DEFINE FIELD IF NOT EXISTS created_at ON job_application TYPE datetime;

DEFINE INDEX IF NOT EXISTS job_application_job ON job_application FIELDS job_id;
"#;
