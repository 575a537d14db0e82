mod common;

use assert_matches::assert_matches;
use common::TestApp;
use rust_decimal_macros::dec;
use storefront_data::{
    domain::{CountryRole, StockReportPolicy},
    errors::ServiceError,
    services::{catalog::NewProduct, directory::NewCountry},
};
use uuid::Uuid;

#[tokio::test]
async fn referenced_country_cannot_be_deleted() {
    let app = TestApp::new().await;
    let russia = app.seed_country("Россия").await;
    let china = app.seed_country("Китай").await;

    let product = app
        .services
        .catalog
        .create_product(NewProduct {
            code: "BAG-1".into(),
            name: "Сумка кожаная".into(),
            price: dec!(1250),
            manufacture_countries: vec![china.id],
            development_countries: vec![russia.id],
            ..Default::default()
        })
        .await
        .unwrap();

    let err = app.services.directory.delete_country(china.id).await.unwrap_err();
    assert_matches!(err, ServiceError::Protected { entity: "country", id, .. } if id == china.id);

    let made_in = app
        .services
        .catalog
        .countries(product.id, CountryRole::Manufacture)
        .await
        .unwrap();
    assert_eq!(made_in.len(), 1);
    assert_eq!(made_in[0].name, "Китай");

    // Once the product no longer points at it the country can go.
    app.services
        .catalog
        .set_countries(product.id, CountryRole::Manufacture, vec![])
        .await
        .unwrap();
    app.services.directory.delete_country(china.id).await.unwrap();
}

#[tokio::test]
async fn deleting_a_product_drops_its_country_links_only() {
    let app = TestApp::new().await;
    let russia = app.seed_country("Россия").await;
    let product = app
        .services
        .catalog
        .create_product(NewProduct {
            code: "BAG-2".into(),
            name: "Рюкзак".into(),
            price: dec!(990),
            manufacture_countries: vec![russia.id],
            ..Default::default()
        })
        .await
        .unwrap();

    app.services.catalog.delete_product(product.id).await.unwrap();

    let countries = app.services.directory.list_countries().await.unwrap();
    assert_eq!(countries.len(), 1);
    app.services.directory.delete_country(russia.id).await.unwrap();
}

#[tokio::test]
async fn referenced_currency_cannot_be_deleted() {
    let app = TestApp::new().await;
    let usd = app.seed_currency("USD").await;
    app.services
        .catalog
        .create_product(NewProduct {
            code: "WATCH-1".into(),
            name: "Часы".into(),
            price: dec!(15000),
            foreign_price: Some(dec!(199.5)),
            currency_id: Some(usd.id),
            ..Default::default()
        })
        .await
        .unwrap();

    let err = app.services.directory.delete_currency(usd.id).await.unwrap_err();
    assert_matches!(err, ServiceError::Protected { entity: "currency", .. });
    assert!(app.services.directory.find_currency("USD").await.unwrap().is_some());
}

#[tokio::test]
async fn supplier_with_stock_cannot_be_deleted() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("MSK", StockReportPolicy::Availability).await;
    let product = app.seed_product("BAG-3", "Сумка", dec!(500)).await;
    app.services
        .stock
        .create_stock(product.id, supplier.id, 4)
        .await
        .unwrap();

    let err = app.services.suppliers.delete_supplier(supplier.id).await.unwrap_err();
    assert_matches!(err, ServiceError::Protected { entity: "supplier", .. });
    assert!(err.is_rejection());

    // Deleting the product takes its stock rows along, which frees the supplier.
    app.services.catalog.delete_product(product.id).await.unwrap();
    app.services.suppliers.delete_supplier(supplier.id).await.unwrap();
}

#[tokio::test]
async fn supplier_of_a_product_cannot_be_deleted() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("SPB", StockReportPolicy::Ignore).await;
    app.services
        .catalog
        .create_product(NewProduct {
            code: "BAG-4".into(),
            name: "Клатч".into(),
            price: dec!(700),
            supplier_id: Some(supplier.id),
            ..Default::default()
        })
        .await
        .unwrap();

    let err = app.services.suppliers.delete_supplier(supplier.id).await.unwrap_err();
    assert_matches!(err, ServiceError::Protected { .. });
}

#[tokio::test]
async fn second_stock_row_for_the_same_pair_conflicts() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("MSK", StockReportPolicy::Availability).await;
    let product = app.seed_product("BAG-5", "Сумка", dec!(500)).await;

    app.services
        .stock
        .create_stock(product.id, supplier.id, 1)
        .await
        .unwrap();
    let err = app
        .services
        .stock
        .create_stock(product.id, supplier.id, 2)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    // The upsert path updates the existing row instead.
    let row = app
        .services
        .stock
        .set_quantity(product.id, supplier.id, 9)
        .await
        .unwrap();
    assert_eq!(row.quantity, 9);
    assert_eq!(app.services.stock.total_quantity(product.id).await.unwrap(), 9);
}

#[tokio::test]
async fn stock_for_a_missing_product_is_an_invalid_reference() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("MSK", StockReportPolicy::Availability).await;

    let err = app
        .services
        .stock
        .create_stock(Uuid::new_v4(), supplier.id, 1)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidReference(_));
}

#[tokio::test]
async fn negative_stock_is_rejected() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("MSK", StockReportPolicy::Availability).await;
    let product = app.seed_product("BAG-6", "Сумка", dec!(500)).await;

    let err = app
        .services
        .stock
        .set_quantity(product.id, supplier.id, -1)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn natural_keys_are_unique() {
    let app = TestApp::new().await;
    app.seed_country("Россия").await;
    let err = app
        .services
        .directory
        .create_country(NewCountry {
            name: "Россия".into(),
            iso_code: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    app.seed_product("BAG-7", "Сумка", dec!(500)).await;
    let err = app
        .services
        .catalog
        .create_product(NewProduct {
            code: "BAG-7".into(),
            name: "Другая сумка".into(),
            price: dec!(600),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn contractor_upsert_keys_on_1c_code() {
    let app = TestApp::new().await;
    let first = app.seed_contractor("000123").await;

    let updated = app
        .services
        .directory
        .upsert_contractor(storefront_data::services::directory::ContractorRecord {
            code_1c: "000123".into(),
            name: "ООО Ромашка".into(),
            inn: Some("7701234567".into()),
        })
        .await
        .unwrap();

    assert_eq!(updated.id, first.id);
    assert_eq!(updated.name, "ООО Ромашка");
    assert_eq!(app.services.directory.list_contractors().await.unwrap().len(), 1);
}
