//! Product full-text search.
//!
//! Text is run through [`RussianAnalyzer`] both when indexed and when queried, so a
//! query for «сумки» finds a product named «Сумка».

pub mod analyzer;
pub mod backend;
pub mod index;

pub use analyzer::RussianAnalyzer;
pub use backend::{InMemorySearchBackend, SearchBackend, SearchDocument, SearchError, SearchHit};
pub use index::ProductSearchIndex;
