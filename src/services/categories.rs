use crate::{
    db::DbPool,
    entities::{category, product, product_category},
    errors::ServiceError,
};
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let ok = !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("slug"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCategory {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 255), custom = "validate_slug")]
    pub slug: String,
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub position: i32,
    /// Facet filter configuration; an empty list when omitted.
    #[serde(default)]
    pub filters: Option<serde_json::Value>,
}

/// Category tree and product placement.
#[derive(Clone)]
pub struct CategoryService {
    db_pool: Arc<DbPool>,
}

impl CategoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn create_category(&self, input: NewCategory) -> Result<category::Model, ServiceError> {
        input.validate()?;
        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            parent_id: Set(input.parent_id),
            name: Set(input.name),
            slug: Set(input.slug),
            position: Set(input.position),
            filters: Set(input.filters.unwrap_or_else(|| serde_json::json!([]))),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "category"))?;
        info!(category_id = %model.id, slug = %model.slug, "category created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: Uuid) -> Result<category::Model, ServiceError> {
        category::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("category", id))
    }

    /// Direct children of `parent`, or the roots when `parent` is `None`.
    #[instrument(skip(self))]
    pub async fn children(&self, parent: Option<Uuid>) -> Result<Vec<category::Model>, ServiceError> {
        let query = match parent {
            Some(id) => category::Entity::find().filter(category::Column::ParentId.eq(id)),
            None => category::Entity::find().filter(category::Column::ParentId.is_null()),
        };
        Ok(query
            .order_by_asc(category::Column::Position)
            .order_by_asc(category::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    /// Path from the root down to the category itself.
    #[instrument(skip(self))]
    pub async fn ancestors(&self, id: Uuid) -> Result<Vec<category::Model>, ServiceError> {
        let mut path = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(id);
        while let Some(current) = next {
            if !seen.insert(current) {
                return Err(ServiceError::InvalidOperation(format!(
                    "category {} is part of a cycle",
                    current
                )));
            }
            let node = self.get_category(current).await?;
            next = node.parent_id;
            path.push(node);
        }
        path.reverse();
        Ok(path)
    }

    /// Re-parents a category. Moving it under itself or its own subtree is refused.
    #[instrument(skip(self))]
    pub async fn move_to(
        &self,
        id: Uuid,
        new_parent: Option<Uuid>,
    ) -> Result<category::Model, ServiceError> {
        let node = self.get_category(id).await?;
        if let Some(parent_id) = new_parent {
            let lineage = self.ancestors(parent_id).await?;
            if lineage.iter().any(|c| c.id == id) {
                return Err(ServiceError::InvalidOperation(format!(
                    "cannot move category {} under its own subtree",
                    id
                )));
            }
        }
        let mut active: category::ActiveModel = node.into();
        active.parent_id = Set(new_parent);
        let model = active.update(&*self.db_pool).await?;
        info!(category_id = %id, parent_id = ?new_parent, "category moved");
        Ok(model)
    }

    #[instrument(skip(self, filters))]
    pub async fn set_filters(
        &self,
        id: Uuid,
        filters: serde_json::Value,
    ) -> Result<category::Model, ServiceError> {
        let mut active: category::ActiveModel = self.get_category(id).await?.into();
        active.filters = Set(filters);
        Ok(active.update(&*self.db_pool).await?)
    }

    /// Idempotent.
    #[instrument(skip(self))]
    pub async fn assign_product(&self, category_id: Uuid, product_id: Uuid) -> Result<(), ServiceError> {
        product_category::Entity::insert(product_category::ActiveModel {
            product_id: Set(product_id),
            category_id: Set(category_id),
        })
        .on_conflict(
            OnConflict::columns([
                product_category::Column::ProductId,
                product_category::Column::CategoryId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "product category"))?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn unassign_product(&self, category_id: Uuid, product_id: Uuid) -> Result<(), ServiceError> {
        product_category::Entity::delete_many()
            .filter(product_category::Column::CategoryId.eq(category_id))
            .filter(product_category::Column::ProductId.eq(product_id))
            .exec(&*self.db_pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn products_in(&self, category_id: Uuid) -> Result<Vec<product::Model>, ServiceError> {
        let category = self.get_category(category_id).await?;
        Ok(category
            .find_related(product::Entity)
            .order_by_asc(product::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    /// Deletes the category with its whole subtree; products only lose the link.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = category::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_delete(e, "category", id))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("category", id));
        }
        info!(category_id = %id, "category subtree deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("phones-and-tablets", true)]
    #[test_case("usb_c", true)]
    #[test_case("Phones", false)]
    #[test_case("телефоны", false)]
    #[test_case("", false)]
    fn slug_rules(slug: &str, valid: bool) {
        assert_eq!(validate_slug(slug).is_ok(), valid);
    }
}
