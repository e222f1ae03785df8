//! Job listing domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::Locale;

/// Unique identifier for a job listing, using ULID for chronological sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobListingId(pub Ulid);

impl JobListingId {
    /// Create a new unique listing ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a listing ID from a string.
    pub fn parse(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for JobListingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every attribute of a listing that can be filtered or reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobField {
    Title,
    Slug,
    Description,
    EmploymentTerms,
    Hours,
    Education,
    Experience,
    Skills,
    Languages,
    Salary,
    Length,
    Contact,
    Reference,
    Locale,
    Draft,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}

impl JobField {
    /// Fields stored per locale in the translation store.
    pub const TRANSLATED: [JobField; 13] = [
        JobField::Title,
        JobField::Slug,
        JobField::Description,
        JobField::EmploymentTerms,
        JobField::Hours,
        JobField::Education,
        JobField::Experience,
        JobField::Skills,
        JobField::Languages,
        JobField::Salary,
        JobField::Length,
        JobField::Contact,
        JobField::Reference,
    ];

    /// Column name in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobField::Title => "title",
            JobField::Slug => "slug",
            JobField::Description => "description",
            JobField::EmploymentTerms => "employment_terms",
            JobField::Hours => "hours",
            JobField::Education => "education",
            JobField::Experience => "experience",
            JobField::Skills => "skills",
            JobField::Languages => "languages",
            JobField::Salary => "salary",
            JobField::Length => "length",
            JobField::Contact => "contact",
            JobField::Reference => "reference",
            JobField::Locale => "locale",
            JobField::Draft => "draft",
            JobField::PublishedAt => "published_at",
            JobField::CreatedAt => "created_at",
            JobField::UpdatedAt => "updated_at",
        }
    }

    /// Whether the field lives on the translation row rather than the base record.
    ///
    /// `Locale` counts as translated: it is the translation row's key.
    pub fn is_translated(&self) -> bool {
        *self == JobField::Locale || Self::TRANSLATED.contains(self)
    }
}

impl std::fmt::Display for JobField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of a listing in one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTranslation {
    pub locale: Locale,
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

impl JobTranslation {
    /// Value of a translated text field; `None` for unset optional fields
    /// and for fields that are not translated.
    pub fn text(&self, field: JobField) -> Option<&str> {
        match field {
            JobField::Title => Some(&self.title),
            JobField::Slug => Some(&self.slug),
            JobField::Description => Some(&self.description),
            JobField::Locale => Some(self.locale.as_str()),
            JobField::EmploymentTerms => self.employment_terms.as_deref(),
            JobField::Hours => self.hours.as_deref(),
            JobField::Education => self.education.as_deref(),
            JobField::Experience => self.experience.as_deref(),
            JobField::Skills => self.skills.as_deref(),
            JobField::Languages => self.languages.as_deref(),
            JobField::Salary => self.salary.as_deref(),
            JobField::Length => self.length.as_deref(),
            JobField::Contact => self.contact.as_deref(),
            JobField::Reference => self.reference.as_deref(),
            JobField::Draft | JobField::PublishedAt | JobField::CreatedAt | JobField::UpdatedAt => None,
        }
    }
}

/// A job posting with the translations loaded for the current read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    /// Locale-independent identifier.
    pub id: JobListingId,
    /// Drafts are never live, whatever their publish date.
    pub draft: bool,
    /// When the listing becomes visible.
    pub published_at: DateTime<Utc>,
    /// Set once, when the listing is created.
    pub created_at: DateTime<Utc>,
    /// When the listing was last written.
    pub updated_at: DateTime<Utc>,
    /// Translation rows loaded with the listing. Locale-filtered reads
    /// only carry the requested locale.
    #[serde(default)]
    pub translations: Vec<JobTranslation>,
}

impl JobListing {
    /// Whether the listing is visible right now.
    ///
    /// Evaluated against the clock on every call.
    pub fn is_live(&self) -> bool {
        self.is_live_at(Utc::now())
    }

    /// Whether the listing is visible at `now`.
    ///
    /// The publish boundary is inclusive: a listing published exactly at
    /// `now` is live. The collection query uses the same boundary.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        !self.draft && self.published_at <= now
    }

    /// Translation for `locale`, if loaded.
    pub fn translation(&self, locale: &Locale) -> Option<&JobTranslation> {
        self.translations.iter().find(|t| &t.locale == locale)
    }

    /// Title in `locale`, if loaded.
    pub fn title(&self, locale: &Locale) -> Option<&str> {
        self.translation(locale).map(|t| t.title.as_str())
    }

    /// Slug in `locale`, if loaded.
    pub fn slug(&self, locale: &Locale) -> Option<&str> {
        self.translation(locale).map(|t| t.slug.as_str())
    }
}

/// Caller-supplied attributes for creating or updating a listing in one locale.
///
/// Translated values replace the locale's translation row. `draft` and
/// `published_at` belong to the base record and are only written when set;
/// a new listing defaults to a non-draft published at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAttributes {
    pub title: String,
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
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl JobAttributes {
    /// Translated attributes only; base attributes are left unset.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            employment_terms: None,
            hours: None,
            education: None,
            experience: None,
            skills: None,
            languages: None,
            salary: None,
            length: None,
            contact: None,
            reference: None,
            draft: None,
            published_at: None,
        }
    }

    pub fn with_draft(mut self, draft: bool) -> Self {
        self.draft = Some(draft);
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set an optional translated text field.
    ///
    /// Non-text fields (`title`, `description`, `slug`, `locale` and the base
    /// attributes) are left untouched.
    pub fn with_text(mut self, field: JobField, value: impl Into<String>) -> Self {
        if let Some(slot) = self.optional_text_mut(field) {
            *slot = Some(value.into());
        }
        self
    }

    /// Optional text fields paired with their value, in declaration order.
    pub fn optional_texts(&self) -> [(JobField, Option<&str>); 10] {
        [
            (JobField::EmploymentTerms, self.employment_terms.as_deref()),
            (JobField::Hours, self.hours.as_deref()),
            (JobField::Education, self.education.as_deref()),
            (JobField::Experience, self.experience.as_deref()),
            (JobField::Skills, self.skills.as_deref()),
            (JobField::Languages, self.languages.as_deref()),
            (JobField::Salary, self.salary.as_deref()),
            (JobField::Length, self.length.as_deref()),
            (JobField::Contact, self.contact.as_deref()),
            (JobField::Reference, self.reference.as_deref()),
        ]
    }

    fn optional_text_mut(&mut self, field: JobField) -> Option<&mut Option<String>> {
        match field {
            JobField::EmploymentTerms => Some(&mut self.employment_terms),
            JobField::Hours => Some(&mut self.hours),
            JobField::Education => Some(&mut self.education),
            JobField::Experience => Some(&mut self.experience),
            JobField::Skills => Some(&mut self.skills),
            JobField::Languages => Some(&mut self.languages),
            JobField::Salary => Some(&mut self.salary),
            JobField::Length => Some(&mut self.length),
            JobField::Contact => Some(&mut self.contact),
            JobField::Reference => Some(&mut self.reference),
            _ => None,
        }
    }

    /// Build the translation row for `locale` with an already computed slug.
    pub fn into_translation(self, locale: Locale, slug: String) -> JobTranslation {
        JobTranslation {
            locale,
            title: self.title,
            slug,
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
        }
    }
}
