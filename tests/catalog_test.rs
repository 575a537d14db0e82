mod common;

use assert_matches::assert_matches;
use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use std::collections::HashSet;
use storefront_data::{
    domain::{
        marketplace::{OZON, WILDBERRIES, YANDEX_MARKET},
        Gtin, MarketplaceAvailability, MarketplaceExport, StockReportPolicy,
    },
    entities::product,
    errors::ServiceError,
    services::{
        catalog::{NewProduct, ProductUpdate},
        categories::NewCategory,
        reviews::NewReview,
    },
};
use uuid::Uuid;

fn category(name: &str, slug: &str, parent_id: Option<Uuid>) -> NewCategory {
    NewCategory {
        name: name.into(),
        slug: slug.into(),
        parent_id,
        position: 0,
        filters: None,
    }
}

#[tokio::test]
async fn product_keeps_several_barcodes() {
    let app = TestApp::new().await;
    let product = app
        .services
        .catalog
        .create_product(NewProduct {
            code: "BAG-1".into(),
            name: "Сумка кожаная".into(),
            price: dec!(1250),
            gtins: vec!["4600000000008".into(), "96385074".into()],
            ..Default::default()
        })
        .await
        .unwrap();

    let gtins = app.services.catalog.gtins(product.id).await.unwrap();
    assert_eq!(gtins.len(), 2);

    let gtins = app
        .services
        .catalog
        .add_gtin(product.id, Gtin::parse("4607001234562").unwrap())
        .await
        .unwrap();
    assert_eq!(gtins.len(), 3);

    // Adding a barcode twice is a no-op.
    let gtins = app
        .services
        .catalog
        .add_gtin(product.id, Gtin::parse("96385074").unwrap())
        .await
        .unwrap();
    assert_eq!(gtins.len(), 3);

    assert!(app.services.catalog.remove_gtin(product.id, "96385074").await.unwrap());
    assert!(!app.services.catalog.remove_gtin(product.id, "96385074").await.unwrap());

    let found = app.services.catalog.find_by_gtin("4607001234562").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, product.id);
}

#[tokio::test]
async fn invalid_barcode_rejects_the_product() {
    let app = TestApp::new().await;
    let err = app
        .services
        .catalog
        .create_product(NewProduct {
            code: "BAG-1".into(),
            name: "Сумка".into(),
            price: dec!(1250),
            gtins: vec!["4600000000009".into()],
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
    assert!(app.services.catalog.find_by_code("BAG-1").await.unwrap().is_none());
}

#[tokio::test]
async fn legacy_barcode_is_found_by_its_short_form() {
    let app = TestApp::new().await;
    let product = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;

    let gtins = app
        .services
        .catalog
        .add_legacy_gtin(product.id, "46000000008")
        .await
        .unwrap();
    assert!(gtins.contains("0046000000008"));

    let found = app.services.catalog.find_by_gtin("46000000008").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, "BAG-1");
}

#[tokio::test]
async fn value_written_to_legacy_column_stays_visible() {
    let app = TestApp::new().await;
    let product = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    let catalog = &app.services.catalog;

    // An import still filling the old single column.
    let mut active: product::ActiveModel = product.clone().into();
    active.gtin = Set(Some("46000000008".into()));
    active.update(&*app.db).await.unwrap();

    let gtins = catalog.gtins(product.id).await.unwrap();
    assert_eq!(gtins.iter().collect::<Vec<_>>(), vec!["0046000000008"]);
    for code in ["46000000008", "0046000000008"] {
        let found = catalog.find_by_gtin(code).await.unwrap();
        assert_eq!(found.len(), 1, "lookup by {}", code);
        assert_eq!(found[0].id, product.id);
    }

    catalog.reindex_all().await.unwrap();
    assert_eq!(catalog.search("46000000008", None).await.unwrap().len(), 1);

    // Editing the set takes the legacy value over, so removal sticks.
    assert!(catalog.remove_gtin(product.id, "0046000000008").await.unwrap());
    assert!(catalog.gtins(product.id).await.unwrap().is_empty());
    assert!(catalog.find_by_gtin("46000000008").await.unwrap().is_empty());
    assert_eq!(catalog.get_product(product.id).await.unwrap().gtin, None);
}

#[tokio::test]
async fn replacing_barcodes_clears_the_legacy_column() {
    let app = TestApp::new().await;
    let product = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    let mut active: product::ActiveModel = product.clone().into();
    active.gtin = Set(Some("арт-77".into()));
    active.update(&*app.db).await.unwrap();

    let gtins = app
        .services
        .catalog
        .set_gtins(product.id, vec!["96385074".into()])
        .await
        .unwrap();
    assert_eq!(gtins.iter().collect::<Vec<_>>(), vec!["96385074"]);
    assert_eq!(
        app.services
            .catalog
            .gtins(product.id)
            .await
            .unwrap()
            .iter()
            .collect::<Vec<_>>(),
        vec!["96385074"]
    );
}

#[tokio::test]
async fn search_finds_legacy_barcode_by_short_form() {
    let app = TestApp::new().await;
    let product = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    app.services
        .catalog
        .add_legacy_gtin(product.id, "46000000008")
        .await
        .unwrap();

    for query in ["46000000008", "0046000000008"] {
        let found = app.services.catalog.search(query, None).await.unwrap();
        assert_eq!(found.len(), 1, "search by {}", query);
        assert_eq!(found[0].id, product.id);
    }
}

#[tokio::test]
async fn repeated_category_ids_link_once() {
    let app = TestApp::new().await;
    let bags = app
        .services
        .categories
        .create_category(category("Сумки", "bags", None))
        .await
        .unwrap();
    let product = app
        .services
        .catalog
        .create_product(NewProduct {
            code: "BAG-1".into(),
            name: "Сумка".into(),
            price: dec!(1250),
            category_ids: vec![bags.id, bags.id],
            ..Default::default()
        })
        .await
        .unwrap();

    let products = app.services.categories.products_in(bags.id).await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, product.id);
}

#[tokio::test]
async fn replacing_barcodes_drops_the_old_set() {
    let app = TestApp::new().await;
    let product = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    app.services
        .catalog
        .set_gtins(product.id, vec!["4600000000008".into()])
        .await
        .unwrap();
    let gtins = app
        .services
        .catalog
        .set_gtins(product.id, vec!["96385074".into()])
        .await
        .unwrap();

    assert_eq!(gtins.iter().collect::<Vec<_>>(), vec!["96385074"]);
    assert!(app.services.catalog.find_by_gtin("4600000000008").await.unwrap().is_empty());
}

#[tokio::test]
async fn marketplace_exports_use_their_own_price() {
    let app = TestApp::new().await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    let belt = app.seed_product("BELT-1", "Ремень", dec!(400)).await;
    let hidden = app.seed_product("HAT-1", "Шляпа", dec!(800)).await;

    let marketplaces = &app.services.marketplaces;
    marketplaces
        .set_export(bag.id, OZON, MarketplaceExport::enabled_at(Some(dec!(1490))))
        .await
        .unwrap();
    marketplaces
        .set_export(belt.id, OZON, MarketplaceExport::enabled_at(None))
        .await
        .unwrap();
    marketplaces
        .set_export(hidden.id, OZON, MarketplaceExport::enabled_at(None))
        .await
        .unwrap();
    marketplaces
        .set_export(bag.id, WILDBERRIES, MarketplaceExport::default())
        .await
        .unwrap();
    app.services.catalog.set_active(hidden.id, false).await.unwrap();

    let exported = marketplaces.products_exported_to(OZON).await.unwrap();
    let prices: Vec<_> = exported
        .iter()
        .map(|e| (e.product.code.as_str(), e.price))
        .collect();
    assert_eq!(prices, vec![("BAG-1", dec!(1490)), ("BELT-1", dec!(400))]);

    assert!(marketplaces.products_exported_to(WILDBERRIES).await.unwrap().is_empty());

    let exports = marketplaces.exports(bag.id).await.unwrap();
    assert!(exports.is_enabled(OZON));
    assert!(!exports.is_enabled(WILDBERRIES));
    assert!(!exports.is_enabled(YANDEX_MARKET));
}

#[tokio::test]
async fn export_settings_are_replaced_not_duplicated() {
    let app = TestApp::new().await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    let marketplaces = &app.services.marketplaces;

    marketplaces
        .set_export(bag.id, OZON, MarketplaceExport::enabled_at(Some(dec!(1490))))
        .await
        .unwrap();
    marketplaces
        .set_export(bag.id, OZON, MarketplaceExport::enabled_at(None))
        .await
        .unwrap();

    let exports = marketplaces.exports(bag.id).await.unwrap();
    assert_eq!(exports.len(), 1);
    assert_eq!(exports.get(OZON).effective_price(bag.price), dec!(1250));
}

#[tokio::test]
async fn new_marketplace_is_a_row_not_a_schema_change() {
    let app = TestApp::new().await;
    let seeded = app.services.marketplaces.list_marketplaces(false).await.unwrap();
    assert_eq!(seeded.len(), 5);

    app.services
        .marketplaces
        .add_marketplace("kaspi", "Kaspi.kz")
        .await
        .unwrap();
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    app.services
        .marketplaces
        .set_export(bag.id, "kaspi", MarketplaceExport::enabled_at(None))
        .await
        .unwrap();
    assert_eq!(
        app.services
            .marketplaces
            .products_exported_to("kaspi")
            .await
            .unwrap()
            .len(),
        1
    );

    let err = app
        .services
        .marketplaces
        .set_export(bag.id, "no_such_market", MarketplaceExport::enabled_at(None))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidReference(_));

    let err = app
        .services
        .marketplaces
        .add_marketplace("Kaspi KZ", "Kaspi")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn stock_policy_drives_marketplace_availability() {
    let app = TestApp::new().await;
    let own = app.seed_supplier("OWN", StockReportPolicy::Availability).await;
    let partner = app.seed_supplier("PARTNER", StockReportPolicy::Backorder).await;
    let dropship = app.seed_supplier("DROP", StockReportPolicy::Ignore).await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;

    let stock = &app.services.stock;
    stock.set_quantity(bag.id, partner.id, 5).await.unwrap();
    stock.set_quantity(bag.id, dropship.id, 100).await.unwrap();
    assert_eq!(
        stock.marketplace_availability(bag.id).await.unwrap(),
        MarketplaceAvailability::Backorder
    );

    stock.set_quantity(bag.id, own.id, 3).await.unwrap();
    assert_eq!(
        stock.marketplace_availability(bag.id).await.unwrap(),
        MarketplaceAvailability::InStock(3)
    );
    assert_eq!(stock.total_quantity(bag.id).await.unwrap(), 108);

    app.services
        .suppliers
        .set_stock_policy(partner.id, StockReportPolicy::Availability)
        .await
        .unwrap();
    assert_eq!(
        stock.marketplace_availability(bag.id).await.unwrap(),
        MarketplaceAvailability::InStock(8)
    );
}

#[tokio::test]
async fn category_tree_navigation() {
    let app = TestApp::new().await;
    let categories = &app.services.categories;
    let bags = categories
        .create_category(category("Сумки", "bags", None))
        .await
        .unwrap();
    let leather = categories
        .create_category(category("Кожаные сумки", "leather-bags", Some(bags.id)))
        .await
        .unwrap();
    let clutches = categories
        .create_category(category("Клатчи", "clutches", Some(leather.id)))
        .await
        .unwrap();

    let path: Vec<_> = categories
        .ancestors(clutches.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.slug)
        .collect();
    assert_eq!(path, vec!["bags", "leather-bags", "clutches"]);

    let roots = categories.children(None).await.unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(categories.children(Some(bags.id)).await.unwrap().len(), 1);

    let err = categories.move_to(bags.id, Some(clutches.id)).await.unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));

    let moved = categories.move_to(clutches.id, Some(bags.id)).await.unwrap();
    assert_eq!(moved.parent_id, Some(bags.id));
    assert_eq!(categories.children(Some(bags.id)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_a_category_removes_subtree_but_keeps_products() {
    let app = TestApp::new().await;
    let categories = &app.services.categories;
    let bags = categories
        .create_category(category("Сумки", "bags", None))
        .await
        .unwrap();
    let leather = categories
        .create_category(category("Кожаные сумки", "leather-bags", Some(bags.id)))
        .await
        .unwrap();
    let product = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;

    categories.assign_product(leather.id, product.id).await.unwrap();
    categories.assign_product(leather.id, product.id).await.unwrap();
    assert_eq!(categories.products_in(leather.id).await.unwrap().len(), 1);

    categories.delete_category(bags.id).await.unwrap();

    assert_matches!(
        categories.get_category(leather.id).await,
        Err(ServiceError::NotFound(_))
    );
    assert!(app.services.catalog.get_product(product.id).await.is_ok());
}

#[tokio::test]
async fn category_slug_must_be_url_safe() {
    let app = TestApp::new().await;
    let err = app
        .services
        .categories
        .create_category(category("Сумки", "Сумки и рюкзаки", None))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn search_matches_russian_word_forms() {
    let app = TestApp::new().await;
    let bag = app
        .services
        .catalog
        .create_product(NewProduct {
            code: "BAG-1".into(),
            name: "Сумка кожаная".into(),
            price: dec!(1250),
            gtins: vec!["4600000000008".into()],
            ..Default::default()
        })
        .await
        .unwrap();
    let belt = app.seed_product("BELT-1", "Ремень кожаный", dec!(400)).await;
    app.seed_product("HAT-1", "Шляпа фетровая", dec!(800)).await;

    let found = app.services.catalog.search("сумки", None).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, bag.id);

    let ids: HashSet<_> = app
        .services
        .catalog
        .search("кожаные", None)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, HashSet::from([bag.id, belt.id]));

    let by_barcode = app.services.catalog.search("4600000000008", None).await.unwrap();
    assert_eq!(by_barcode.len(), 1);
}

#[tokio::test]
async fn search_follows_catalog_changes() {
    let app = TestApp::new().await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;

    app.services
        .catalog
        .update_product(
            bag.id,
            ProductUpdate {
                name: Some("Рюкзак городской".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(app.services.catalog.search("сумка", None).await.unwrap().is_empty());
    assert_eq!(app.services.catalog.search("рюкзаки", None).await.unwrap().len(), 1);

    app.services.catalog.set_active(bag.id, false).await.unwrap();
    assert!(app.services.catalog.search("рюкзак", None).await.unwrap().is_empty());

    app.services.catalog.set_active(bag.id, true).await.unwrap();
    assert_eq!(app.services.catalog.reindex_all().await.unwrap(), 1);
    assert_eq!(app.services.catalog.search("рюкзак", None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reviews_are_bounded_and_trimmed() {
    let app = TestApp::new().await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;

    let review = app
        .services
        .reviews
        .add_review(
            bag.id,
            NewReview {
                author: "Ольга".into(),
                rating: 5,
                advantage: Some("Вместительная".into()),
                disadvantage: Some("   ".into()),
                comment: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(review.disadvantage, None);

    let err = app
        .services
        .reviews
        .add_review(
            bag.id,
            NewReview {
                author: "Ольга".into(),
                rating: 6,
                advantage: None,
                disadvantage: None,
                comment: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    assert_eq!(app.services.reviews.reviews_for(bag.id).await.unwrap().len(), 1);

    // Reviews go away with their product.
    app.services.catalog.delete_product(bag.id).await.unwrap();
    assert!(app.services.reviews.reviews_for(bag.id).await.unwrap().is_empty());
}
