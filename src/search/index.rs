use super::analyzer::RussianAnalyzer;
use super::backend::{SearchBackend, SearchDocument, SearchError, SearchHit};
use crate::domain::{gtin::legacy_short_form, Gtins};
use crate::entities::product;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Keeps product text in a [`SearchBackend`].
///
/// Indexed: code, name, description and barcodes. A padded legacy barcode is also
/// indexed in the short form it was entered with. Inactive products are kept out of
/// the index.
#[derive(Clone)]
pub struct ProductSearchIndex {
    backend: Arc<dyn SearchBackend>,
    analyzer: Arc<RussianAnalyzer>,
}

impl ProductSearchIndex {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            analyzer: Arc::new(RussianAnalyzer::new()),
        }
    }

    pub fn document(&self, product: &product::Model, gtins: &Gtins) -> SearchDocument {
        let mut terms = self.analyzer.analyze(&product.code);
        terms.extend(self.analyzer.analyze(&product.name));
        if let Some(description) = &product.description {
            terms.extend(self.analyzer.analyze(description));
        }
        for gtin in gtins.iter() {
            terms.push(gtin.to_string());
            if let Some(short) = legacy_short_form(gtin) {
                terms.push(short.to_string());
            }
        }
        SearchDocument {
            id: product.id,
            terms,
        }
    }

    pub async fn index(&self, product: &product::Model, gtins: &Gtins) -> Result<(), SearchError> {
        if !product.is_active {
            return self.remove(product.id).await;
        }
        let document = self.document(product, gtins);
        debug!(product_id = %product.id, terms = document.terms.len(), "indexing product");
        self.backend.upsert(document).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), SearchError> {
        self.backend.remove(id).await
    }

    pub async fn clear(&self) -> Result<(), SearchError> {
        self.backend.clear().await
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        let terms = self.analyzer.analyze(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        self.backend.lookup(&terms, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::InMemorySearchBackend;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn product(name: &str, description: Option<&str>) -> product::Model {
        product::Model {
            id: Uuid::new_v4(),
            code: "A-100".to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            price: Decimal::new(1990, 0),
            foreign_price: None,
            currency_id: None,
            supplier_id: None,
            gtin: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn finds_products_by_inflected_words() {
        let index = ProductSearchIndex::new(Arc::new(InMemorySearchBackend::new()));
        let bag = product("Сумка кожаная", Some("Для телефонов"));
        let cable = product("Кабель", None);
        index.index(&bag, &Gtins::new()).await.unwrap();
        index.index(&cable, &Gtins::new()).await.unwrap();

        let hits = index.search("кожаные сумки", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, bag.id);

        let hits = index.search("телефона", 10).await.unwrap();
        assert_eq!(hits[0].id, bag.id);
    }

    #[tokio::test]
    async fn barcode_is_searchable_and_inactive_products_drop_out() {
        let index = ProductSearchIndex::new(Arc::new(InMemorySearchBackend::new()));
        let mut item = product("Кабель", None);
        let gtins = Gtins::from_legacy(Some("4600000000008"));
        index.index(&item, &gtins).await.unwrap();
        assert_eq!(index.search("4600000000008", 5).await.unwrap().len(), 1);

        let padded = product("Ремешок", None);
        index
            .index(&padded, &Gtins::from_legacy(Some("46000000016")))
            .await
            .unwrap();
        let hits = index.search("46000000016", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, padded.id);
        assert_eq!(index.search("0046000000016", 5).await.unwrap().len(), 1);

        item.is_active = false;
        index.index(&item, &gtins).await.unwrap();
        assert!(index.search("кабель", 5).await.unwrap().is_empty());
    }
}
