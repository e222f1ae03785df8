//! In-process keyword index.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    DEFAULT_MIN_WORD_SIZE, DocumentKey, IndexDocument, IndexError, KeywordIndex, SearchHit,
    SearchQuery, tokenize,
};

/// Title terms count double when ranking.
const TITLE_WEIGHT: u32 = 2;

/// Keyword index held in memory.
///
/// Each document is stored as a weighted term-frequency table. Search scans
/// all documents, which is fine for the few thousand listings a CMS holds.
#[derive(Debug)]
pub struct MemoryKeywordIndex {
    min_word_size: usize,
    documents: RwLock<HashMap<DocumentKey, HashMap<String, u32>>>,
}

impl Default for MemoryKeywordIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryKeywordIndex {
    pub fn new() -> Self {
        Self::with_min_word_size(DEFAULT_MIN_WORD_SIZE)
    }

    pub fn with_min_word_size(min_word_size: usize) -> Self {
        Self {
            min_word_size: min_word_size.max(1),
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Number of indexed documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    fn term_frequencies(&self, document: &IndexDocument) -> HashMap<String, u32> {
        let mut terms = HashMap::new();

        for term in tokenize(&document.title, self.min_word_size) {
            *terms.entry(term).or_insert(0) += TITLE_WEIGHT;
        }

        let body = [
            Some(document.description.as_str()),
            document.employment_terms.as_deref(),
            document.hours.as_deref(),
        ];
        for text in body.into_iter().flatten() {
            for term in tokenize(text, self.min_word_size) {
                *terms.entry(term).or_insert(0) += 1;
            }
        }

        terms
    }
}

impl KeywordIndex for MemoryKeywordIndex {
    async fn upsert(&self, key: &DocumentKey, document: &IndexDocument) -> Result<(), IndexError> {
        let terms = self.term_frequencies(document);
        tracing::trace!("Indexed {} with {} terms", key, terms.len());
        self.documents.write().await.insert(key.clone(), terms);
        Ok(())
    }

    async fn remove(&self, key: &DocumentKey) -> Result<(), IndexError> {
        self.documents.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), IndexError> {
        self.documents.write().await.clear();
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, IndexError> {
        let query = SearchQuery::parse(query, self.min_word_size);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let documents = self.documents.read().await;
        let mut hits: Vec<SearchHit> = documents
            .iter()
            .filter(|(_, terms)| !query.excluded.iter().any(|t| terms.contains_key(t)))
            .filter_map(|(key, terms)| {
                let mut score = 0u32;
                for term in &query.required {
                    score += *terms.get(term)?;
                }
                Some(SearchHit {
                    key: key.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.key.cmp(&b.key)));
        Ok(hits)
    }
}
