use crate::{
    db::DbPool,
    domain::{
        gtin::{legacy_short_form, normalize_legacy},
        CountryRole, Gtin, Gtins,
    },
    entities::{country, product, product_category, product_country, product_gtin},
    errors::ServiceError,
    search::ProductSearchIndex,
};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::{Validate, ValidationError};

const DEFAULT_SEARCH_LIMIT: usize = 50;

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("negative_price"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    pub foreign_price: Option<Decimal>,
    pub currency_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    #[serde(default)]
    pub gtins: Vec<String>,
    #[serde(default)]
    pub manufacture_countries: Vec<Uuid>,
    #[serde(default)]
    pub development_countries: Vec<Uuid>,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub foreign_price: Option<Option<Decimal>>,
    pub currency_id: Option<Option<Uuid>>,
    pub supplier_id: Option<Option<Uuid>>,
}

fn parse_gtins(values: &[String]) -> Result<Gtins, ServiceError> {
    Gtins::parse_all(values).map_err(|e| ServiceError::ValidationError(e.to_string()))
}

/// Barcode rows of the product plus whatever still sits in the legacy single column.
async fn load_gtins<C: ConnectionTrait>(db: &C, product: &product::Model) -> Result<Gtins, ServiceError> {
    let mut gtins: Gtins = product_gtin::Entity::find()
        .filter(product_gtin::Column::ProductId.eq(product.id))
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.gtin)
        .collect();
    gtins.extend(Gtins::from_legacy(product.gtin.as_deref()));
    Ok(gtins)
}

/// Moves a value left in the legacy column into `product_gtins` and clears the column,
/// so later edits of the barcode set apply to it as well.
async fn absorb_legacy_gtin<C: ConnectionTrait>(
    db: &C,
    product: &product::Model,
) -> Result<(), ServiceError> {
    let Some(raw) = product.gtin.as_deref() else {
        return Ok(());
    };
    insert_gtins(db, product.id, Gtins::from_legacy(Some(raw))).await?;
    let mut active: product::ActiveModel = product.clone().into();
    active.gtin = Set(None);
    active.update(db).await?;
    debug!(product_id = %product.id, legacy = raw, "legacy barcode moved into barcode set");
    Ok(())
}

async fn insert_gtins<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    gtins: impl IntoIterator<Item = String>,
) -> Result<(), ServiceError> {
    let rows: Vec<product_gtin::ActiveModel> = gtins
        .into_iter()
        .map(|gtin| product_gtin::ActiveModel {
            product_id: Set(product_id),
            gtin: Set(gtin),
        })
        .collect();
    if rows.is_empty() {
        return Ok(());
    }
    product_gtin::Entity::insert_many(rows)
        .on_conflict(
            OnConflict::columns([product_gtin::Column::ProductId, product_gtin::Column::Gtin])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await
        .map_err(|e| ServiceError::from_write(e, "product barcode"))?;
    Ok(())
}

async fn insert_countries<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    role: CountryRole,
    country_ids: &[Uuid],
) -> Result<(), ServiceError> {
    let mut unique = country_ids.to_vec();
    unique.sort();
    unique.dedup();
    if unique.is_empty() {
        return Ok(());
    }
    let rows = unique.into_iter().map(|country_id| product_country::ActiveModel {
        product_id: Set(product_id),
        country_id: Set(country_id),
        role: Set(role),
    });
    product_country::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await
        .map_err(|e| ServiceError::from_write(e, "product country"))?;
    Ok(())
}

/// Products, their barcodes, country lists and category links.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
    search: Option<ProductSearchIndex>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>, search: Option<ProductSearchIndex>) -> Self {
        Self { db_pool, search }
    }

    /// The index follows the database; a failed index update is logged and repaired
    /// by [`CatalogService::reindex_all`].
    async fn reindex(&self, product: &product::Model) {
        let Some(search) = &self.search else {
            return;
        };
        let gtins = match load_gtins(&*self.db_pool, product).await {
            Ok(gtins) => gtins,
            Err(e) => {
                warn!(product_id = %product.id, error = %e, "could not load barcodes for indexing");
                Gtins::new()
            }
        };
        if let Err(e) = search.index(product, &gtins).await {
            warn!(product_id = %product.id, error = %e, "search index update failed");
        }
    }

    /// Creates a product with its barcodes, countries and categories in one transaction.
    #[instrument(skip(self))]
    pub async fn create_product(&self, input: NewProduct) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let gtins = parse_gtins(&input.gtins)?;

        let txn = self.db_pool.begin().await?;
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code),
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            foreign_price: Set(input.foreign_price),
            currency_id: Set(input.currency_id),
            supplier_id: Set(input.supplier_id),
            gtin: Set(None),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::from_write(e, "product"))?;

        insert_gtins(&txn, model.id, gtins).await?;
        insert_countries(&txn, model.id, CountryRole::Manufacture, &input.manufacture_countries)
            .await?;
        insert_countries(&txn, model.id, CountryRole::Development, &input.development_countries)
            .await?;
        let mut category_ids = input.category_ids;
        category_ids.sort();
        category_ids.dedup();
        if !category_ids.is_empty() {
            let links = category_ids
                .into_iter()
                .map(|category_id| product_category::ActiveModel {
                    product_id: Set(model.id),
                    category_id: Set(category_id),
                });
            product_category::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| ServiceError::from_write(e, "product category"))?;
        }
        txn.commit().await?;

        info!(product_id = %model.id, code = %model.code, "product created");
        self.reindex(&model).await;
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", id))
    }

    #[instrument(skip(self))]
    pub async fn find_by_code(&self, code: &str) -> Result<Option<product::Model>, ServiceError> {
        Ok(product::Entity::find()
            .filter(product::Column::Code.eq(code))
            .one(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: Uuid,
        update: ProductUpdate,
    ) -> Result<product::Model, ServiceError> {
        let mut active: product::ActiveModel = self.get_product(id).await?.into();
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError("name must not be empty".into()));
            }
            active.name = Set(name);
        }
        if let Some(description) = update.description {
            active.description = Set(description);
        }
        if let Some(price) = update.price {
            validate_price(&price)
                .map_err(|_| ServiceError::ValidationError("price must not be negative".into()))?;
            active.price = Set(price);
        }
        if let Some(foreign_price) = update.foreign_price {
            active.foreign_price = Set(foreign_price);
        }
        if let Some(currency_id) = update.currency_id {
            active.currency_id = Set(currency_id);
        }
        if let Some(supplier_id) = update.supplier_id {
            active.supplier_id = Set(supplier_id);
        }
        let model = active
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_write(e, "product"))?;
        info!(product_id = %id, "product updated");
        self.reindex(&model).await;
        Ok(model)
    }

    /// Products are withdrawn from sale by flag rather than deleted.
    #[instrument(skip(self))]
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<product::Model, ServiceError> {
        let mut active: product::ActiveModel = self.get_product(id).await?.into();
        active.is_active = Set(is_active);
        let model = active.update(&*self.db_pool).await?;
        info!(product_id = %id, is_active, "product availability changed");
        self.reindex(&model).await;
        Ok(model)
    }

    /// Refused while a box or an order item references the product.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = product::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::from_delete(e, "product", id))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("product", id));
        }
        if let Some(search) = &self.search {
            if let Err(e) = search.remove(id).await {
                warn!(product_id = %id, error = %e, "search index removal failed");
            }
        }
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn gtins(&self, product_id: Uuid) -> Result<Gtins, ServiceError> {
        let product = self.get_product(product_id).await?;
        load_gtins(&*self.db_pool, &product).await
    }

    /// Replaces the product's barcodes with a validated set.
    #[instrument(skip(self))]
    pub async fn set_gtins(&self, product_id: Uuid, values: Vec<String>) -> Result<Gtins, ServiceError> {
        let gtins = parse_gtins(&values)?;
        let product = self.get_product(product_id).await?;

        let txn = self.db_pool.begin().await?;
        product_gtin::Entity::delete_many()
            .filter(product_gtin::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?;
        insert_gtins(&txn, product_id, gtins.clone()).await?;
        let product = if product.gtin.is_some() {
            let mut active: product::ActiveModel = product.into();
            active.gtin = Set(None);
            active.update(&txn).await?
        } else {
            product
        };
        txn.commit().await?;

        info!(product_id = %product_id, count = gtins.len(), "barcodes replaced");
        self.reindex(&product).await;
        Ok(gtins)
    }

    #[instrument(skip(self))]
    pub async fn add_gtin(&self, product_id: Uuid, gtin: Gtin) -> Result<Gtins, ServiceError> {
        let product = self.get_product(product_id).await?;
        let txn = self.db_pool.begin().await?;
        absorb_legacy_gtin(&txn, &product).await?;
        insert_gtins(&txn, product_id, [String::from(gtin)]).await?;
        txn.commit().await?;
        self.reindex(&product).await;
        self.gtins(product_id).await
    }

    /// Adds a barcode taken from old data, normalized but not check-digit validated.
    #[instrument(skip(self))]
    pub async fn add_legacy_gtin(&self, product_id: Uuid, raw: &str) -> Result<Gtins, ServiceError> {
        let product = self.get_product(product_id).await?;
        let Some(value) = normalize_legacy(raw) else {
            return Err(ServiceError::ValidationError("barcode is empty".into()));
        };
        let txn = self.db_pool.begin().await?;
        absorb_legacy_gtin(&txn, &product).await?;
        insert_gtins(&txn, product_id, [value]).await?;
        txn.commit().await?;
        self.reindex(&product).await;
        self.gtins(product_id).await
    }

    #[instrument(skip(self))]
    pub async fn remove_gtin(&self, product_id: Uuid, gtin: &str) -> Result<bool, ServiceError> {
        let product = self.get_product(product_id).await?;
        let txn = self.db_pool.begin().await?;
        absorb_legacy_gtin(&txn, &product).await?;
        let result = product_gtin::Entity::delete_many()
            .filter(product_gtin::Column::ProductId.eq(product_id))
            .filter(product_gtin::Column::Gtin.eq(gtin.trim()))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        if result.rows_affected > 0 {
            let product = self.get_product(product_id).await?;
            self.reindex(&product).await;
        }
        Ok(result.rows_affected > 0)
    }

    /// Products carrying the barcode. Lookups also match the padded legacy form.
    #[instrument(skip(self))]
    pub async fn find_by_gtin(&self, code: &str) -> Result<Vec<product::Model>, ServiceError> {
        let mut candidates = vec![code.trim().to_string()];
        if let Some(normalized) = normalize_legacy(code) {
            if !candidates.contains(&normalized) {
                candidates.push(normalized);
            }
        }
        let product_ids: Vec<Uuid> = product_gtin::Entity::find()
            .filter(product_gtin::Column::Gtin.is_in(candidates.clone()))
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(|row| row.product_id)
            .collect();

        // The legacy column may hold the short form of a padded barcode.
        let mut legacy_candidates = candidates.clone();
        for candidate in &candidates {
            if let Some(short) = legacy_short_form(candidate) {
                legacy_candidates.push(short.to_string());
            }
        }
        let legacy_match = product::Column::Gtin.is_in(legacy_candidates);
        let condition = if product_ids.is_empty() {
            Condition::all().add(legacy_match)
        } else {
            Condition::any()
                .add(product::Column::Id.is_in(product_ids))
                .add(legacy_match)
        };
        Ok(product::Entity::find()
            .filter(condition)
            .order_by_asc(product::Column::Code)
            .all(&*self.db_pool)
            .await?)
    }

    /// Replaces one of the product's country lists.
    #[instrument(skip(self))]
    pub async fn set_countries(
        &self,
        product_id: Uuid,
        role: CountryRole,
        country_ids: Vec<Uuid>,
    ) -> Result<(), ServiceError> {
        self.get_product(product_id).await?;
        let txn = self.db_pool.begin().await?;
        product_country::Entity::delete_many()
            .filter(product_country::Column::ProductId.eq(product_id))
            .filter(product_country::Column::Role.eq(role))
            .exec(&txn)
            .await?;
        insert_countries(&txn, product_id, role, &country_ids).await?;
        txn.commit().await?;
        info!(product_id = %product_id, %role, count = country_ids.len(), "product countries set");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn countries(
        &self,
        product_id: Uuid,
        role: CountryRole,
    ) -> Result<Vec<country::Model>, ServiceError> {
        let ids: Vec<Uuid> = product_country::Entity::find()
            .filter(product_country::Column::ProductId.eq(product_id))
            .filter(product_country::Column::Role.eq(role))
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(|link| link.country_id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(country::Entity::find()
            .filter(country::Column::Id.is_in(ids))
            .order_by_asc(country::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    /// Full-text product search, best match first.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let search = self
            .search
            .as_ref()
            .ok_or_else(|| ServiceError::InvalidOperation("search is disabled".into()))?;
        let hits = search
            .search(query, limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
            .await
            .map_err(|e| ServiceError::Other(e.into()))?;
        debug!(hits = hits.len(), "search finished");
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = hits.iter().map(|hit| hit.id).collect();
        let mut by_id: HashMap<Uuid, product::Model> = product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        Ok(hits.iter().filter_map(|hit| by_id.remove(&hit.id)).collect())
    }

    /// Rebuilds the search index from the database. Returns the number of indexed products.
    #[instrument(skip(self))]
    pub async fn reindex_all(&self) -> Result<usize, ServiceError> {
        let Some(search) = &self.search else {
            return Ok(0);
        };
        search.clear().await.map_err(|e| ServiceError::Other(e.into()))?;

        let mut barcodes: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in product_gtin::Entity::find().all(&*self.db_pool).await? {
            barcodes.entry(row.product_id).or_default().push(row.gtin);
        }

        let products = product::Entity::find()
            .filter(product::Column::IsActive.eq(true))
            .all(&*self.db_pool)
            .await?;
        for product in &products {
            let mut gtins: Gtins = barcodes
                .remove(&product.id)
                .unwrap_or_default()
                .into_iter()
                .collect();
            gtins.extend(Gtins::from_legacy(product.gtin.as_deref()));
            search
                .index(product, &gtins)
                .await
                .map_err(|e| ServiceError::Other(e.into()))?;
        }
        info!(count = products.len(), "search index rebuilt");
        Ok(products.len())
    }
}
