use crate::{db::DbPool, entities::product_review, errors::ServiceError};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Longest advantage, disadvantage or comment text a review may carry.
pub const MAX_REVIEW_POINT_LEN: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewReview {
    #[validate(length(min = 1, max = 255))]
    pub author: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 1000))]
    pub advantage: Option<String>,
    #[validate(length(max = 1000))]
    pub disadvantage: Option<String>,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

#[derive(Clone)]
pub struct ReviewService {
    db_pool: Arc<DbPool>,
}

impl ReviewService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn add_review(
        &self,
        product_id: Uuid,
        input: NewReview,
    ) -> Result<product_review::Model, ServiceError> {
        input.validate()?;
        let blank_to_none = |text: Option<String>| text.filter(|t| !t.trim().is_empty());
        let model = product_review::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            author: Set(input.author),
            rating: Set(input.rating),
            advantage: Set(blank_to_none(input.advantage)),
            disadvantage: Set(blank_to_none(input.disadvantage)),
            comment: Set(blank_to_none(input.comment)),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "review"))?;
        info!(review_id = %model.id, product_id = %product_id, "review added");
        Ok(model)
    }

    /// Newest first
    #[instrument(skip(self))]
    pub async fn reviews_for(&self, product_id: Uuid) -> Result<Vec<product_review::Model>, ServiceError> {
        Ok(product_review::Entity::find()
            .filter(product_review::Column::ProductId.eq(product_id))
            .order_by_desc(product_review::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(advantage: &str, rating: i16) -> NewReview {
        NewReview {
            author: "Ольга".into(),
            rating,
            advantage: Some(advantage.into()),
            disadvantage: None,
            comment: None,
        }
    }

    #[test]
    fn bounded_text_and_rating() {
        assert!(review("Лёгкий", 5).validate().is_ok());
        assert!(review(&"а".repeat(MAX_REVIEW_POINT_LEN as usize), 4)
            .validate()
            .is_ok());
        assert!(review(&"а".repeat(MAX_REVIEW_POINT_LEN as usize + 1), 4)
            .validate()
            .is_err());
        let mut long_comment = review("Лёгкий", 4);
        long_comment.comment = Some("б".repeat(MAX_REVIEW_POINT_LEN as usize));
        assert!(long_comment.validate().is_ok());
        long_comment.comment = Some("б".repeat(MAX_REVIEW_POINT_LEN as usize + 1));
        assert!(long_comment.validate().is_err());

        assert!(review("Лёгкий", 0).validate().is_err());
        assert!(review("Лёгкий", 6).validate().is_err());
    }
}
