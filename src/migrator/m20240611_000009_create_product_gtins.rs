//! Moves barcodes into their own indexed table.
//!
//! Every non-blank value of the legacy `products.gtin` column is copied through
//! [`normalize_legacy`]. The legacy column itself is left untouched, so rolling this
//! revision back loses nothing.

use super::m20160301_000002_create_catalog_tables::Products;
use crate::domain::gtin::normalize_legacy;
use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;
use tracing::info;
use uuid::Uuid;

const BACKFILL_CHUNK: usize = 500;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductGtins::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProductGtins::ProductId).uuid().not_null())
                    .col(ColumnDef::new(ProductGtins::Gtin).string_len(64).not_null())
                    .primary_key(
                        Index::create()
                            .col(ProductGtins::ProductId)
                            .col(ProductGtins::Gtin),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_gtins_product_id")
                            .from(ProductGtins::Table, ProductGtins::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_gtins_gtin")
                    .table(ProductGtins::Table)
                    .col(ProductGtins::Gtin)
                    .to_owned(),
            )
            .await?;

        backfill(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductGtins::Table).to_owned())
            .await
    }
}

async fn backfill(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let db = manager.get_connection();
    let backend = manager.get_database_backend();

    let select = Query::select()
        .columns([Products::Id, Products::Gtin])
        .from(Products::Table)
        .and_where(Expr::col(Products::Gtin).is_not_null())
        .to_owned();
    let rows = db.query_all(backend.build(&select)).await?;

    let mut pairs = Vec::with_capacity(rows.len());
    for row in rows {
        let id: Uuid = row.try_get("", "id")?;
        let raw: String = row.try_get("", "gtin")?;
        if let Some(gtin) = normalize_legacy(&raw) {
            pairs.push((id, gtin));
        }
    }

    for chunk in pairs.chunks(BACKFILL_CHUNK) {
        let mut insert = Query::insert();
        insert
            .into_table(ProductGtins::Table)
            .columns([ProductGtins::ProductId, ProductGtins::Gtin])
            .on_conflict(
                OnConflict::columns([ProductGtins::ProductId, ProductGtins::Gtin])
                    .do_nothing()
                    .to_owned(),
            );
        for (id, gtin) in chunk {
            insert.values_panic([SimpleExpr::from(*id), SimpleExpr::from(gtin.clone())]);
        }
        let stmt: Statement = backend.build(&insert);
        db.execute(stmt).await?;
    }

    info!(count = pairs.len(), "backfilled product barcodes from legacy column");
    Ok(())
}

#[derive(DeriveIden)]
enum ProductGtins {
    Table,
    ProductId,
    Gtin,
}
