use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    search::{InMemorySearchBackend, ProductSearchIndex},
    services::{
        catalog::CatalogService, categories::CategoryService, directory::DirectoryService,
        integrations::IntegrationService, marketplaces::MarketplaceService,
        orders::OrderService, reviews::ReviewService, staff::StaffService, stock::StockService,
        suppliers::SupplierService,
    },
};

/// Factory for creating service instances with shared dependencies
#[derive(Clone)]
pub struct ServiceFactory {
    db_pool: Arc<DbPool>,
    search: Option<ProductSearchIndex>,
}

impl ServiceFactory {
    pub fn new(db_pool: Arc<DbPool>, search: Option<ProductSearchIndex>) -> Self {
        Self { db_pool, search }
    }

    /// Uses the in-process search index when search is enabled in the configuration.
    pub fn from_config(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        let search = config
            .search_enabled
            .then(|| ProductSearchIndex::new(Arc::new(InMemorySearchBackend::new())));
        Self::new(db_pool, search)
    }

    pub fn directory_service(&self) -> DirectoryService {
        DirectoryService::new(self.db_pool.clone())
    }

    pub fn supplier_service(&self) -> SupplierService {
        SupplierService::new(self.db_pool.clone())
    }

    pub fn staff_service(&self) -> StaffService {
        StaffService::new(self.db_pool.clone())
    }

    pub fn integration_service(&self) -> IntegrationService {
        IntegrationService::new(self.db_pool.clone())
    }

    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(self.db_pool.clone(), self.search.clone())
    }

    pub fn category_service(&self) -> CategoryService {
        CategoryService::new(self.db_pool.clone())
    }

    pub fn marketplace_service(&self) -> MarketplaceService {
        MarketplaceService::new(self.db_pool.clone())
    }

    pub fn review_service(&self) -> ReviewService {
        ReviewService::new(self.db_pool.clone())
    }

    pub fn stock_service(&self) -> StockService {
        StockService::new(self.db_pool.clone())
    }

    pub fn order_service(&self) -> OrderService {
        OrderService::new(self.db_pool.clone())
    }

    /// Gets a reference to the database pool
    pub fn db_pool(&self) -> &Arc<DbPool> {
        &self.db_pool
    }
}

/// Service container holding all service instances
#[derive(Clone)]
pub struct ServiceContainer {
    pub directory: DirectoryService,
    pub suppliers: SupplierService,
    pub staff: StaffService,
    pub integrations: IntegrationService,
    pub catalog: CatalogService,
    pub categories: CategoryService,
    pub marketplaces: MarketplaceService,
    pub reviews: ReviewService,
    pub stock: StockService,
    pub orders: OrderService,
}

impl ServiceContainer {
    pub fn new(factory: &ServiceFactory) -> Self {
        Self {
            directory: factory.directory_service(),
            suppliers: factory.supplier_service(),
            staff: factory.staff_service(),
            integrations: factory.integration_service(),
            catalog: factory.catalog_service(),
            categories: factory.category_service(),
            marketplaces: factory.marketplace_service(),
            reviews: factory.review_service(),
            stock: factory.stock_service(),
            orders: factory.order_service(),
        }
    }
}
