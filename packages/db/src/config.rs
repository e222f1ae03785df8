//! Repository configuration.

use jobs_core::Locale;

use crate::DbError;

/// Number of listings returned by `latest_default`.
pub const DEFAULT_LATEST_LIMIT: usize = 5;

/// Behavior switches for [`JobListingRepository`](crate::repositories::JobListingRepository).
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Locale used by read paths when the caller does not name one.
    pub default_locale: Locale,
    /// When false the keyword index is neither updated nor queried.
    pub search_enabled: bool,
    /// Default size of the "latest listings" view.
    pub latest_limit: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            default_locale: Locale::default(),
            search_enabled: true,
            latest_limit: DEFAULT_LATEST_LIMIT,
        }
    }
}

impl RepositoryConfig {
    /// Build a config from environment variables.
    ///
    /// - `JOBS_DEFAULT_LOCALE` (default: `en`)
    /// - `JOBS_SEARCH_ENABLED` (`true`/`false`, default: true)
    /// - `JOBS_LATEST_LIMIT` (default: 5)
    pub fn from_env() -> Result<Self, DbError> {
        let defaults = Self::default();

        let default_locale = match env_var("JOBS_DEFAULT_LOCALE")? {
            Some(tag) => Locale::parse(&tag).map_err(|e| DbError::Config(e.to_string()))?,
            None => defaults.default_locale,
        };

        let latest_limit = match env_var("JOBS_LATEST_LIMIT")? {
            Some(v) => v.parse().map_err(|_| {
                DbError::Config(format!("invalid JOBS_LATEST_LIMIT={v} (expected a number)"))
            })?,
            None => defaults.latest_limit,
        };

        Ok(Self {
            default_locale,
            search_enabled: parse_bool_env("JOBS_SEARCH_ENABLED")?.unwrap_or(defaults.search_enabled),
            latest_limit,
        })
    }

    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    pub fn with_search_enabled(mut self, enabled: bool) -> Self {
        self.search_enabled = enabled;
        self
    }

    pub fn with_latest_limit(mut self, limit: usize) -> Self {
        self.latest_limit = limit;
        self
    }
}

/// Read an environment variable, treating blank values as unset.
pub(crate) fn env_var(var_name: &str) -> Result<Option<String>, DbError> {
    match std::env::var(var_name) {
        Ok(v) => Ok(non_empty(v)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(DbError::Config(format!("failed reading {var_name}: {e}"))),
    }
}

pub(crate) fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_bool_env(var_name: &str) -> Result<Option<bool>, DbError> {
    let Some(v) = env_var(var_name)? else {
        return Ok(None);
    };

    let parsed = match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => true,
        "0" | "false" | "no" | "n" => false,
        _ => {
            return Err(DbError::Config(format!(
                "invalid boolean for {var_name}={v} (expected true/false)"
            )));
        }
    };
    Ok(Some(parsed))
}
