use super::m20160301_000001_create_reference_tables::Suppliers;
use super::m20160301_000002_create_catalog_tables::Products;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stock::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Stock::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Stock::ProductId).uuid().not_null())
                    .col(ColumnDef::new(Stock::SupplierId).uuid().not_null())
                    .col(
                        ColumnDef::new(Stock::Quantity)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Stock::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_product_id")
                            .from(Stock::Table, Stock::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_supplier_id")
                            .from(Stock::Table, Stock::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_stock_product_supplier")
                    .table(Stock::Table)
                    .col(Stock::ProductId)
                    .col(Stock::SupplierId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Stock::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Stock {
    Table,
    Id,
    ProductId,
    SupplierId,
    Quantity,
    UpdatedAt,
}
