#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use storefront_data::{
    db::{self, DbConfig, DbPool},
    domain::StockReportPolicy,
    entities::{contractor, country, currency, order, product, site, supplier},
    search::{InMemorySearchBackend, ProductSearchIndex},
    services::{
        catalog::NewProduct,
        directory::{ContractorRecord, NewCountry, NewCurrency, NewSite},
        orders::{NewOrder, NewOrderItem},
        suppliers::NewSupplier,
        ServiceContainer, ServiceFactory,
    },
    domain::OrderStatus,
};
use uuid::Uuid;

/// Services over a freshly migrated in-memory SQLite database.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: ServiceContainer,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Self::connect().await;
        db::run_migrations(&db).await.expect("apply migrations");
        Self::with_pool(db)
    }

    /// Unmigrated pool, for tests that drive migrations themselves.
    pub async fn connect() -> Arc<DbPool> {
        let pool = db::establish_connection_with_config(&DbConfig::in_memory())
            .await
            .expect("connect in-memory sqlite");
        Arc::new(pool)
    }

    pub fn with_pool(db: Arc<DbPool>) -> Self {
        let search = ProductSearchIndex::new(Arc::new(InMemorySearchBackend::new()));
        let factory = ServiceFactory::new(db.clone(), Some(search));
        Self {
            services: ServiceContainer::new(&factory),
            db,
        }
    }

    pub async fn seed_country(&self, name: &str) -> country::Model {
        self.services
            .directory
            .create_country(NewCountry {
                name: name.to_string(),
                iso_code: None,
            })
            .await
            .expect("seed country")
    }

    pub async fn seed_currency(&self, code: &str) -> currency::Model {
        self.services
            .directory
            .create_currency(NewCurrency {
                code: code.to_string(),
                name: code.to_string(),
            })
            .await
            .expect("seed currency")
    }

    pub async fn seed_site(&self) -> site::Model {
        self.services
            .directory
            .create_site(NewSite {
                domain: format!("{}.example.ru", Uuid::new_v4().simple()),
                name: "Магазин".to_string(),
            })
            .await
            .expect("seed site")
    }

    pub async fn seed_contractor(&self, code_1c: &str) -> contractor::Model {
        self.services
            .directory
            .create_contractor(ContractorRecord {
                code_1c: code_1c.to_string(),
                name: format!("ООО {}", code_1c),
                inn: None,
            })
            .await
            .expect("seed contractor")
    }

    pub async fn seed_supplier(&self, code: &str, policy: StockReportPolicy) -> supplier::Model {
        self.services
            .suppliers
            .create_supplier(NewSupplier {
                code: code.to_string(),
                name: format!("Поставщик {}", code),
                position: 0,
                show_in_order: true,
                marketplace_stock_policy: policy,
            })
            .await
            .expect("seed supplier")
    }

    pub async fn seed_product(&self, code: &str, name: &str, price: Decimal) -> product::Model {
        self.services
            .catalog
            .create_product(NewProduct {
                code: code.to_string(),
                name: name.to_string(),
                price,
                ..Default::default()
            })
            .await
            .expect("seed product")
    }

    pub async fn seed_order(&self, site_id: Uuid, product_id: Uuid) -> order::Model {
        self.services
            .orders
            .create_order(NewOrder {
                site_id,
                buyer_id: None,
                seller_id: None,
                shipment_warehouse_id: None,
                status: OrderStatus::New,
                comment: None,
                items: vec![NewOrderItem {
                    product_id,
                    quantity: 1,
                    price: None,
                    box_id: None,
                }],
            })
            .await
            .expect("seed order")
    }
}
