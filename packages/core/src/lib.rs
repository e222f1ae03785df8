//! Core domain types for localized job listings.
//!
//! This crate contains the types shared by the persistence and search packages:
//! - JobListing and JobTranslation for localized listing content
//! - JobApplication for the dependent application records
//! - The validation layer and the slug strategy used before every write

mod application;
mod listing;
mod locale;
pub mod slug;
pub mod validation;

pub use application::{JobApplication, JobApplicationId};
pub use listing::{JobAttributes, JobField, JobListing, JobListingId, JobTranslation};
pub use locale::{Locale, LocaleError};
pub use slug::{Parameterize, SlugStrategy};
pub use validation::{FieldError, MAX_TEXT_LENGTH, ValidationErrors, validate};
