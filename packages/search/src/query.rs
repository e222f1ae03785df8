//! Tokenization and query parsing.

/// Split `text` into normalized index terms.
///
/// Text is folded to ASCII, lowercased and split on anything that is not
/// alphanumeric. Terms shorter than `min_word_size` are dropped.
pub fn tokenize(text: &str, min_word_size: usize) -> Vec<String> {
    deunicode::deunicode(text)
        .to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty() && t.len() >= min_word_size)
        .map(str::to_string)
        .collect()
}

/// A parsed search string.
///
/// - `word` and `+word`: the document must contain the word.
/// - `-word`: the document must not contain the word.
/// - `"some phrase"`: every word of the phrase is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub required: Vec<String>,
    pub excluded: Vec<String>,
}

impl SearchQuery {
    pub fn parse(input: &str, min_word_size: usize) -> Self {
        let mut query = Self::default();
        let mut rest = input.trim();

        while !rest.is_empty() {
            if let Some(after_quote) = rest.strip_prefix('"') {
                // An unterminated quote runs to the end of the input.
                let (phrase, tail) = after_quote.split_once('"').unwrap_or((after_quote, ""));
                query.required.extend(tokenize(phrase, min_word_size));
                rest = tail.trim_start();
                continue;
            }

            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let (word, tail) = rest.split_at(end);
            rest = tail.trim_start();

            if let Some(negated) = word.strip_prefix('-') {
                query.excluded.extend(tokenize(negated, min_word_size));
            } else {
                let word = word.strip_prefix('+').unwrap_or(word);
                query.required.extend(tokenize(word, min_word_size));
            }
        }

        query.required.sort();
        query.required.dedup();
        query.excluded.sort();
        query.excluded.dedup();
        query
    }

    /// A query without required terms matches nothing.
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }
}
