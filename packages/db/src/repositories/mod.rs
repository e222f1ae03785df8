//! Repository implementations for database operations.

mod application_repo;
mod listing_repo;
pub(crate) mod translation_repo;

pub use application_repo::JobApplicationRepository;
pub use listing_repo::JobListingRepository;
pub use translation_repo::TranslationStore;
