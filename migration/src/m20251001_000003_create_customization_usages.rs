use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum CustomizationUsages {
    Table,
    Id,
    Username,
    BusinessId,
    MessagesUsed,
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
                    .table(CustomizationUsages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomizationUsages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomizationUsages::Username)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomizationUsages::BusinessId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomizationUsages::MessagesUsed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CustomizationUsages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomizationUsages::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // upsert 依赖这个唯一索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_customization_usages_user_business")
                    .table(CustomizationUsages::Table)
                    .col(CustomizationUsages::Username)
                    .col(CustomizationUsages::BusinessId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(CustomizationUsages::Table)
                    .to_owned(),
            )
            .await
    }
}
