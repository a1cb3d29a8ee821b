use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Strategy {
    Table,
    Id,
    Title,
    Description,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Strategy::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Strategy::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Strategy::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Strategy::Description).text())
                    .col(
                        ColumnDef::new(Strategy::Status)
                            .string_len(32)
                            .not_null()
                            .default("CREATED"),
                    )
                    .col(
                        ColumnDef::new(Strategy::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Strategy::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Strategy::Table).to_owned())
            .await
    }
}
