use sea_orm_migration::prelude::*;

use crate::m20251001_000001_create_users::Users;

#[derive(DeriveIden)]
enum Businesses {
    Table,
    Id,
    UserId,
    PlaceId,
    Name,
    Address,
    Phone,
    Website,
    Rating,
    TotalRatings,
    Types,
    BusinessStatus,
    Contacted,
    WebsiteGenerated,
    GeneratedWebsiteUrl,
    GeneratedWebsiteCode,
    LeadStatus,
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
                    .table(Businesses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Businesses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Businesses::UserId).integer().not_null())
                    .col(ColumnDef::new(Businesses::PlaceId).string_len(255).not_null())
                    .col(ColumnDef::new(Businesses::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Businesses::Address).string_len(500).null())
                    .col(ColumnDef::new(Businesses::Phone).string_len(50).null())
                    .col(ColumnDef::new(Businesses::Website).string_len(1000).null())
                    .col(ColumnDef::new(Businesses::Rating).double().null())
                    .col(ColumnDef::new(Businesses::TotalRatings).integer().null())
                    .col(ColumnDef::new(Businesses::Types).string_len(500).null())
                    .col(ColumnDef::new(Businesses::BusinessStatus).string_len(50).null())
                    .col(
                        ColumnDef::new(Businesses::Contacted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Businesses::WebsiteGenerated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Businesses::GeneratedWebsiteUrl)
                            .string_len(2000)
                            .null(),
                    )
                    .col(ColumnDef::new(Businesses::GeneratedWebsiteCode).text().null())
                    .col(
                        ColumnDef::new(Businesses::LeadStatus)
                            .string_len(20)
                            .not_null()
                            .default("new"),
                    )
                    .col(ColumnDef::new(Businesses::Notes).text().null())
                    .col(
                        ColumnDef::new(Businesses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Businesses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_businesses_user")
                            .from(Businesses::Table, Businesses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一个 place 可以被不同用户各自导入
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_businesses_user_place")
                    .table(Businesses::Table)
                    .col(Businesses::UserId)
                    .col(Businesses::PlaceId)
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
                    .table(Businesses::Table)
                    .to_owned(),
            )
            .await
    }
}
