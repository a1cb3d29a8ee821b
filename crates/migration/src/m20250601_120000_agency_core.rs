use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Opportunity {
    Table,
    Id,
    Title,
    ClientName,
    Email,
    Phone,
    AmountCents,
    Probability,
    Stage,
    ExpectedCloseDate,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Client {
    Table,
    Id,
    Name,
    Company,
    Email,
    Phone,
    Industry,
    ContactPerson,
    MonthlyValueCents,
    Status,
    StartDate,
    Notes,
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
                    .table(Opportunity::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Opportunity::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Opportunity::Title).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Opportunity::ClientName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Opportunity::Email).string_len(256))
                    .col(ColumnDef::new(Opportunity::Phone).string_len(64))
                    .col(ColumnDef::new(Opportunity::AmountCents).big_integer())
                    .col(ColumnDef::new(Opportunity::Probability).small_integer())
                    .col(
                        ColumnDef::new(Opportunity::Stage)
                            .string_len(32)
                            .not_null()
                            .default("PROSPECTING"),
                    )
                    .col(ColumnDef::new(Opportunity::ExpectedCloseDate).date())
                    .col(ColumnDef::new(Opportunity::Notes).text())
                    .col(
                        ColumnDef::new(Opportunity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Opportunity::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_opportunity_stage")
                    .table(Opportunity::Table)
                    .col(Opportunity::Stage)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_opportunity_expected_close")
                    .table(Opportunity::Table)
                    .col(Opportunity::ExpectedCloseDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Client::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Client::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Client::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Client::Company).string_len(256))
                    .col(ColumnDef::new(Client::Email).string_len(256))
                    .col(ColumnDef::new(Client::Phone).string_len(64))
                    .col(ColumnDef::new(Client::Industry).string_len(128))
                    .col(ColumnDef::new(Client::ContactPerson).string_len(256))
                    .col(ColumnDef::new(Client::MonthlyValueCents).big_integer())
                    .col(
                        ColumnDef::new(Client::Status)
                            .string_len(32)
                            .not_null()
                            .default("PROSPECT"),
                    )
                    .col(ColumnDef::new(Client::StartDate).date().not_null())
                    .col(ColumnDef::new(Client::Notes).text())
                    .col(
                        ColumnDef::new(Client::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Client::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_client_name")
                    .table(Client::Table)
                    .col(Client::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Client::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Opportunity::Table).to_owned())
            .await
    }
}
