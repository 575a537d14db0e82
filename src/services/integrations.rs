use crate::{
    db::DbPool,
    domain::AdminFieldConfig,
    entities::integration,
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct IntegrationService {
    db_pool: Arc<DbPool>,
}

impl IntegrationService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, admin_fields))]
    pub async fn create_integration(
        &self,
        name: &str,
        admin_fields: &AdminFieldConfig,
        uses_boxes: bool,
    ) -> Result<integration::Model, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "integration name must not be empty".to_string(),
            ));
        }
        let model = integration::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            admin_fields: Set(admin_fields.to_json()),
            uses_boxes: Set(uses_boxes),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "integration"))?;
        info!(integration_id = %model.id, name = %model.name, "integration created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_integration(&self, id: Uuid) -> Result<integration::Model, ServiceError> {
        integration::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("integration", id))
    }

    #[instrument(skip(self))]
    pub async fn find_by_name(&self, name: &str) -> Result<Option<integration::Model>, ServiceError> {
        Ok(integration::Entity::find()
            .filter(integration::Column::Name.eq(name))
            .one(&*self.db_pool)
            .await?)
    }

    /// Stored admin field configuration, decoded
    #[instrument(skip(self))]
    pub async fn admin_fields(&self, id: Uuid) -> Result<AdminFieldConfig, ServiceError> {
        self.get_integration(id)
            .await?
            .admin_field_config()
            .map_err(|e| ServiceError::InvalidOperation(e.to_string()))
    }

    #[instrument(skip(self, config))]
    pub async fn set_admin_fields(
        &self,
        id: Uuid,
        config: &AdminFieldConfig,
    ) -> Result<integration::Model, ServiceError> {
        let mut active: integration::ActiveModel = self.get_integration(id).await?.into();
        active.admin_fields = Set(config.to_json());
        let model = active.update(&*self.db_pool).await?;
        info!(integration_id = %id, fields = config.len(), "admin fields updated");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn set_uses_boxes(&self, id: Uuid, uses_boxes: bool) -> Result<integration::Model, ServiceError> {
        let mut active: integration::ActiveModel = self.get_integration(id).await?.into();
        active.uses_boxes = Set(uses_boxes);
        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_integrations(&self) -> Result<Vec<integration::Model>, ServiceError> {
        Ok(integration::Entity::find()
            .order_by_asc(integration::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }
}
