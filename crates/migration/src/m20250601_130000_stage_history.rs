use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum OpportunityStageHistory {
    Table,
    Id,
    OpportunityId,
    FromStage,
    ToStage,
    Note,
    ChangedAt,
}

#[derive(DeriveIden)]
enum Opportunity {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OpportunityStageHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OpportunityStageHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OpportunityStageHistory::OpportunityId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OpportunityStageHistory::FromStage)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OpportunityStageHistory::ToStage)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(OpportunityStageHistory::Note).text())
                    .col(
                        ColumnDef::new(OpportunityStageHistory::ChangedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stage_history_opportunity")
                            .from(
                                OpportunityStageHistory::Table,
                                OpportunityStageHistory::OpportunityId,
                            )
                            .to(Opportunity::Table, Opportunity::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_stage_history_opportunity")
                    .table(OpportunityStageHistory::Table)
                    .col(OpportunityStageHistory::OpportunityId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(OpportunityStageHistory::Table)
                    .to_owned(),
            )
            .await
    }
}
