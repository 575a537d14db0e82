use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Couriers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Couriers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Couriers::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Couriers::Color)
                            .string_len(7)
                            .not_null()
                            .default("#FFFFFF"),
                    )
                    .col(
                        ColumnDef::new(Couriers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Managers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Managers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Managers::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Managers::Color)
                            .string_len(7)
                            .not_null()
                            .default("#FFFFFF"),
                    )
                    .col(
                        ColumnDef::new(Managers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Managers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Couriers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Couriers {
    Table,
    Id,
    Name,
    Color,
    IsActive,
}

#[derive(DeriveIden)]
enum Managers {
    Table,
    Id,
    Name,
    Color,
    IsActive,
}
