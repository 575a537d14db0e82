use dashmap::DashMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search backend unavailable: {0}")]
    Unavailable(String),
}

/// Already-analyzed terms of one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDocument {
    pub id: Uuid,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: Uuid,
    pub score: u32,
}

/// Storage for the search index. Implementations receive analyzed terms only.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    async fn upsert(&self, document: SearchDocument) -> Result<(), SearchError>;
    async fn remove(&self, id: Uuid) -> Result<(), SearchError>;
    /// Documents containing every term, best first.
    async fn lookup(&self, terms: &[String], limit: usize) -> Result<Vec<SearchHit>, SearchError>;
    async fn clear(&self) -> Result<(), SearchError>;
}

/// Inverted index kept in process memory.
#[derive(Debug, Default)]
pub struct InMemorySearchBackend {
    postings: DashMap<String, HashMap<Uuid, u32>>,
    documents: DashMap<Uuid, HashSet<String>>,
}

impl InMemorySearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn unlink(&self, id: Uuid) {
        if let Some((_, terms)) = self.documents.remove(&id) {
            for term in terms {
                let now_empty = match self.postings.get_mut(&term) {
                    Some(mut docs) => {
                        docs.remove(&id);
                        docs.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    self.postings.remove_if(&term, |_, docs| docs.is_empty());
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl SearchBackend for InMemorySearchBackend {
    async fn upsert(&self, document: SearchDocument) -> Result<(), SearchError> {
        self.unlink(document.id);

        let mut counts: HashMap<String, u32> = HashMap::new();
        for term in document.terms {
            *counts.entry(term).or_default() += 1;
        }
        for (term, count) in &counts {
            self.postings
                .entry(term.clone())
                .or_default()
                .insert(document.id, *count);
        }
        self.documents
            .insert(document.id, counts.into_keys().collect());
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<(), SearchError> {
        self.unlink(id);
        Ok(())
    }

    async fn lookup(&self, terms: &[String], limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        let mut unique: Vec<&String> = terms.iter().collect();
        unique.sort();
        unique.dedup();
        let Some((first, rest)) = unique.split_first() else {
            return Ok(Vec::new());
        };

        let mut scores: HashMap<Uuid, u32> = match self.postings.get(*first) {
            Some(docs) => docs.clone(),
            None => return Ok(Vec::new()),
        };
        for term in rest {
            let Some(docs) = self.postings.get(*term) else {
                return Ok(Vec::new());
            };
            scores.retain(|id, _| docs.contains_key(id));
            for (id, score) in scores.iter_mut() {
                *score += docs.get(id).copied().unwrap_or(0);
            }
        }

        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .map(|(id, score)| SearchHit { id, score })
            .collect();
        hits.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn clear(&self) -> Result<(), SearchError> {
        self.postings.clear();
        self.documents.clear();
        Ok(())
    }
}
