//! Locale identifiers used to key translated content.

use serde::{Deserialize, Serialize};

/// A language tag such as `en`, `nl` or `pt-BR`.
///
/// Locales are always passed explicitly by the caller; nothing in this
/// workspace reads an ambient "current locale".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

/// Error returned when a string is not a usable locale tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid locale tag: {0:?}")]
pub struct LocaleError(pub String);

impl Locale {
    /// Parse a locale tag.
    ///
    /// The primary subtag must be 2-3 ASCII letters; further subtags are
    /// ASCII alphanumerics separated by `-`. Case follows BCP 47 conventions
    /// (`pt-BR`, `zh-Hant-TW`) so differently cased tags compare equal.
    pub fn parse(tag: &str) -> Result<Self, LocaleError> {
        let tag = tag.trim();
        let mut parts = tag.split('-');

        let primary = parts.next().unwrap_or_default();
        if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(LocaleError(tag.to_string()));
        }

        let mut normalized = primary.to_ascii_lowercase();
        for part in parts {
            if part.is_empty() || part.len() > 8 || !part.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(LocaleError(tag.to_string()));
            }
            normalized.push('-');
            normalized.push_str(&normalize_subtag(part));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Regions are upper case, scripts title case, everything else lower case.
fn normalize_subtag(part: &str) -> String {
    let alphabetic = part.chars().all(|c| c.is_ascii_alphabetic());
    match part.len() {
        2 if alphabetic => part.to_ascii_uppercase(),
        4 if alphabetic => {
            let (first, rest) = part.split_at(1);
            format!("{}{}", first.to_ascii_uppercase(), rest.to_ascii_lowercase())
        }
        _ => part.to_ascii_lowercase(),
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

impl std::str::FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
