mod common;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use storefront_data::{
    domain::{OrderStatus, StockReportPolicy},
    errors::ServiceError,
    services::orders::{DeliveryInfo, NewOrder, NewOrderItem},
};
use uuid::Uuid;

fn order_for(site_id: Uuid, items: Vec<NewOrderItem>) -> NewOrder {
    NewOrder {
        site_id,
        buyer_id: None,
        seller_id: None,
        shipment_warehouse_id: None,
        status: OrderStatus::New,
        comment: None,
        items,
    }
}

#[tokio::test]
async fn order_items_default_to_the_catalog_price() {
    let app = TestApp::new().await;
    let site = app.seed_site().await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    let belt = app.seed_product("BELT-1", "Ремень", dec!(400)).await;

    let order = app
        .services
        .orders
        .create_order(order_for(
            site.id,
            vec![
                NewOrderItem {
                    product_id: bag.id,
                    quantity: 2,
                    price: None,
                    box_id: None,
                },
                NewOrderItem {
                    product_id: belt.id,
                    quantity: 1,
                    price: Some(dec!(99.5)),
                    box_id: None,
                },
            ],
        ))
        .await
        .unwrap();

    assert_eq!(order.status(), OrderStatus::New);
    assert_eq!(app.services.orders.items(order.id).await.unwrap().len(), 2);
    assert_eq!(
        app.services.orders.order_total(order.id).await.unwrap(),
        dec!(2599.5)
    );
}

#[tokio::test]
async fn failed_item_rolls_back_the_whole_order() {
    let app = TestApp::new().await;
    let site = app.seed_site().await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;

    let err = app
        .services
        .orders
        .create_order(order_for(
            site.id,
            vec![
                NewOrderItem {
                    product_id: bag.id,
                    quantity: 1,
                    price: None,
                    box_id: None,
                },
                NewOrderItem {
                    product_id: Uuid::new_v4(),
                    quantity: 1,
                    price: Some(dec!(10)),
                    box_id: None,
                },
            ],
        ))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidReference(_));

    let open = app
        .services
        .orders
        .list_by_statuses(&[OrderStatus::New])
        .await
        .unwrap();
    assert!(open.is_empty());
}

#[tokio::test]
async fn zero_quantity_item_is_rejected() {
    let app = TestApp::new().await;
    let site = app.seed_site().await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;

    let err = app
        .services
        .orders
        .create_order(order_for(
            site.id,
            vec![NewOrderItem {
                product_id: bag.id,
                quantity: 0,
                price: None,
                box_id: None,
            }],
        ))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn status_codes_persist_and_filter() {
    let app = TestApp::new().await;
    let site = app.seed_site().await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    let first = app.seed_order(site.id, bag.id).await;
    let second = app.seed_order(site.id, bag.id).await;

    let delivered = app
        .services
        .orders
        .set_status(first.id, OrderStatus::DeliveredToCarrier)
        .await
        .unwrap();
    assert_eq!(delivered.status, 1024);
    assert_eq!(delivered.status(), OrderStatus::DeliveredToCarrier);

    let new_orders = app
        .services
        .orders
        .list_by_statuses(&[OrderStatus::New, OrderStatus::Accepted])
        .await
        .unwrap();
    assert_eq!(new_orders.len(), 1);
    assert_eq!(new_orders[0].id, second.id);

    let err = app
        .services
        .orders
        .set_status(second.id, OrderStatus::Unknown(1 << 20))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn code_written_by_a_newer_schema_still_loads() {
    let app = TestApp::new().await;
    let site = app.seed_site().await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    let order = app.seed_order(site.id, bag.id).await;

    app.db
        .execute(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "UPDATE orders SET status = ? WHERE id = ?",
            [32768.into(), order.id.into()],
        ))
        .await
        .unwrap();

    let loaded = app.services.orders.get_order(order.id).await.unwrap();
    assert_eq!(loaded.status(), OrderStatus::Unknown(32768));
    assert_eq!(loaded.status().to_string(), "Неизвестный статус (32768)");

    // Moving it back to an assigned status is allowed.
    let fixed = app
        .services
        .orders
        .set_status(order.id, OrderStatus::Problem)
        .await
        .unwrap();
    assert_eq!(fixed.status, 4096);
}

#[tokio::test]
async fn deleting_a_contractor_clears_the_order_link() {
    let app = TestApp::new().await;
    let site = app.seed_site().await;
    let buyer = app.seed_contractor("000001").await;
    let seller = app.seed_contractor("000002").await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;

    let mut input = order_for(
        site.id,
        vec![NewOrderItem {
            product_id: bag.id,
            quantity: 1,
            price: None,
            box_id: None,
        }],
    );
    input.buyer_id = Some(buyer.id);
    input.seller_id = Some(seller.id);
    let order = app.services.orders.create_order(input).await.unwrap();

    app.services.directory.delete_contractor(buyer.id).await.unwrap();

    let reloaded = app.services.orders.get_order(order.id).await.unwrap();
    assert_eq!(reloaded.buyer_id, None);
    assert_eq!(reloaded.seller_id, Some(seller.id));
    assert_eq!(app.services.orders.items(order.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_a_site_removes_its_orders() {
    let app = TestApp::new().await;
    let site = app.seed_site().await;
    let other_site = app.seed_site().await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    let doomed = app.seed_order(site.id, bag.id).await;
    let kept = app.seed_order(other_site.id, bag.id).await;

    app.services.directory.delete_site(site.id).await.unwrap();

    let err = app.services.orders.get_order(doomed.id).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
    assert!(app.services.orders.items(doomed.id).await.unwrap().is_empty());
    assert!(app.services.orders.get_order(kept.id).await.is_ok());
}

#[tokio::test]
async fn ordered_product_cannot_be_deleted() {
    let app = TestApp::new().await;
    let site = app.seed_site().await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    let order = app.seed_order(site.id, bag.id).await;

    let err = app.services.catalog.delete_product(bag.id).await.unwrap_err();
    assert_matches!(err, ServiceError::Protected { entity: "product", .. });

    app.services.orders.delete_order(order.id).await.unwrap();
    app.services.catalog.delete_product(bag.id).await.unwrap();
}

#[tokio::test]
async fn boxes_protect_their_product_and_release_items() {
    let app = TestApp::new().await;
    let site = app.seed_site().await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    let packaging = app.seed_product("BOX-S", "Коробка малая", dec!(30)).await;
    let shipping_box = app
        .services
        .orders
        .create_box("Малая коробка", Some(packaging.id))
        .await
        .unwrap();

    let err = app
        .services
        .catalog
        .delete_product(packaging.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Protected { .. });

    let order = app.seed_order(site.id, bag.id).await;
    let item = app.services.orders.items(order.id).await.unwrap().remove(0);
    let packed = app
        .services
        .orders
        .assign_box(item.id, Some(shipping_box.id))
        .await
        .unwrap();
    assert_eq!(packed.box_id, Some(shipping_box.id));

    app.services.orders.delete_box(shipping_box.id).await.unwrap();

    let items = app.services.orders.items(order.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].box_id, None);
    app.services.catalog.delete_product(packaging.id).await.unwrap();
}

#[tokio::test]
async fn shipment_warehouse_protects_its_supplier() {
    let app = TestApp::new().await;
    let site = app.seed_site().await;
    let warehouse = app.seed_supplier("MSK", StockReportPolicy::Availability).await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    let order = app.seed_order(site.id, bag.id).await;

    app.services
        .orders
        .set_shipment_warehouse(order.id, Some(warehouse.id))
        .await
        .unwrap();
    let err = app
        .services
        .suppliers
        .delete_supplier(warehouse.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Protected { entity: "supplier", .. });

    let err = app
        .services
        .orders
        .set_shipment_warehouse(order.id, Some(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidReference(_));
}

#[tokio::test]
async fn delivery_dates_must_be_ordered() {
    let app = TestApp::new().await;
    let site = app.seed_site().await;
    let bag = app.seed_product("BAG-1", "Сумка", dec!(1250)).await;
    let order = app.seed_order(site.id, bag.id).await;

    let dispatch = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let handing = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();

    let err = app
        .services
        .orders
        .set_delivery(
            order.id,
            DeliveryInfo {
                dispatch_date: Some(handing),
                handing_date: Some(dispatch),
                delivery_order_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let updated = app
        .services
        .orders
        .set_delivery(
            order.id,
            DeliveryInfo {
                dispatch_date: Some(dispatch),
                handing_date: Some(handing),
                delivery_order_id: Some("CDEK-100500".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.dispatch_date, Some(dispatch));
    assert_eq!(updated.handing_date, Some(handing));
    assert_eq!(updated.delivery_order_id.as_deref(), Some("CDEK-100500"));
}
