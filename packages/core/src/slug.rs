//! Friendly identifiers derived from listing titles.

/// Turns a title into URL-safe slug candidates.
///
/// The repository asks for candidates in order (`attempt` 1, 2, ...) until
/// it finds one that no other listing owns in the same locale.
pub trait SlugStrategy: Send + Sync {
    /// Normalize `source` into a slug. May return an empty string when
    /// nothing in `source` survives normalization.
    fn slugify(&self, source: &str) -> String;

    /// Candidate number `attempt` for `base`. Attempt 1 is `base` itself.
    fn candidate(&self, base: &str, attempt: u32) -> String {
        if attempt <= 1 {
            base.to_string()
        } else {
            format!("{base}-{attempt}")
        }
    }

    /// Slugs that must never be issued because they collide with routes.
    fn is_reserved(&self, _slug: &str) -> bool {
        false
    }
}

/// Default slug strategy.
///
/// # Steps
/// - Transliterate Unicode to ASCII with `deunicode` (e.g., "Café" → "Cafe").
/// - Lowercase; keep ASCII alphanumerics.
/// - Collapse every other run of characters into a single separator.
/// - Trim separators from both ends.
#[derive(Debug, Clone)]
pub struct Parameterize {
    separator: char,
    reserved: Vec<String>,
}

impl Default for Parameterize {
    fn default() -> Self {
        Self {
            separator: '-',
            reserved: vec!["new".to_string(), "edit".to_string()],
        }
    }
}

impl Parameterize {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Replace the reserved word list.
    pub fn with_reserved<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved = words.into_iter().map(Into::into).collect();
        self
    }
}

impl SlugStrategy for Parameterize {
    fn slugify(&self, source: &str) -> String {
        let transliterated = deunicode::deunicode(source);
        let mut out = String::with_capacity(transliterated.len());
        let mut pending_separator = false;

        for ch in transliterated.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_separator && !out.is_empty() {
                    out.push(self.separator);
                }
                pending_separator = false;
                out.push(ch.to_ascii_lowercase());
            } else {
                pending_separator = true;
            }
        }

        out
    }

    fn candidate(&self, base: &str, attempt: u32) -> String {
        if attempt <= 1 {
            base.to_string()
        } else {
            format!("{base}{}{attempt}", self.separator)
        }
    }

    fn is_reserved(&self, slug: &str) -> bool {
        self.reserved.iter().any(|r| r == slug)
    }
}
