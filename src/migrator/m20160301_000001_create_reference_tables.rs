use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Countries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Countries::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Countries::Name)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Countries::IsoCode).string_len(2).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Currencies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Currencies::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Currencies::Code)
                            .string_len(3)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Currencies::Name).string_len(64).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sites::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sites::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Sites::Domain)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Sites::Name).string_len(255).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Contractors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Contractors::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Contractors::Code1c)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Contractors::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Contractors::Inn).string_len(12).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Suppliers::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Suppliers::Code)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Suppliers::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Suppliers::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Suppliers::ShowInOrder)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Suppliers::Table.into_iden(),
            Contractors::Table.into_iden(),
            Sites::Table.into_iden(),
            Currencies::Table.into_iden(),
            Countries::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Countries {
    Table,
    Id,
    Name,
    IsoCode,
}

#[derive(DeriveIden)]
pub enum Currencies {
    Table,
    Id,
    Code,
    Name,
}

#[derive(DeriveIden)]
pub enum Sites {
    Table,
    Id,
    Domain,
    Name,
}

#[derive(DeriveIden)]
pub enum Contractors {
    Table,
    Id,
    #[sea_orm(iden = "code_1c")]
    Code1c,
    Name,
    Inn,
}

#[derive(DeriveIden)]
pub enum Suppliers {
    Table,
    Id,
    Code,
    Name,
    Position,
    ShowInOrder,
}
