use super::m20160301_000001_create_reference_tables::Suppliers;
use super::m20160301_000002_create_catalog_tables::Products;
use crate::domain::marketplace::{AVITO, OZON, SBERMEGAMARKET, WILDBERRIES, YANDEX_MARKET};
use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;

const SEEDED: [(&str, &str); 5] = [
    (YANDEX_MARKET, "Яндекс.Маркет"),
    (OZON, "Ozon"),
    (WILDBERRIES, "Wildberries"),
    (SBERMEGAMARKET, "СберМегаМаркет"),
    (AVITO, "Авито"),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Marketplaces::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Marketplaces::Code)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Marketplaces::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Marketplaces::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert();
        seed.into_table(Marketplaces::Table)
            .columns([Marketplaces::Code, Marketplaces::Name, Marketplaces::IsActive]);
        for (code, name) in SEEDED {
            seed.values_panic([
                SimpleExpr::from(code),
                SimpleExpr::from(name),
                SimpleExpr::from(true),
            ]);
        }
        let backend = manager.get_database_backend();
        manager.get_connection().execute(backend.build(&seed)).await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductMarketplaces::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProductMarketplaces::ProductId).uuid().not_null())
                    .col(
                        ColumnDef::new(ProductMarketplaces::MarketplaceCode)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductMarketplaces::Enabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProductMarketplaces::Price)
                            .decimal_len(16, 4)
                            .null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ProductMarketplaces::ProductId)
                            .col(ProductMarketplaces::MarketplaceCode),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_marketplaces_product_id")
                            .from(ProductMarketplaces::Table, ProductMarketplaces::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_marketplaces_marketplace_code")
                            .from(
                                ProductMarketplaces::Table,
                                ProductMarketplaces::MarketplaceCode,
                            )
                            .to(Marketplaces::Table, Marketplaces::Code)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Suppliers::Table)
                    .add_column(
                        ColumnDef::new(SupplierPolicy::MarketplaceStockPolicy)
                            .string_len(32)
                            .not_null()
                            .default("ignore"),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Suppliers::Table)
                    .drop_column(SupplierPolicy::MarketplaceStockPolicy)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(ProductMarketplaces::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Marketplaces::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Marketplaces {
    Table,
    Code,
    Name,
    IsActive,
}

#[derive(DeriveIden)]
enum ProductMarketplaces {
    Table,
    ProductId,
    MarketplaceCode,
    Enabled,
    Price,
}

#[derive(DeriveIden)]
enum SupplierPolicy {
    MarketplaceStockPolicy,
}
