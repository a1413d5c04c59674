use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum PasswordResets {
    Table,
    Id,
    Email,
    Code,
    CreatedAt,
    IsUsed,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PasswordResets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PasswordResets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PasswordResets::Email).string_len(254).not_null())
                    .col(ColumnDef::new(PasswordResets::Code).string_len(6).not_null())
                    .col(
                        ColumnDef::new(PasswordResets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PasswordResets::IsUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_password_resets_email_created")
                    .table(PasswordResets::Table)
                    .col(PasswordResets::Email)
                    .col(PasswordResets::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // At most one live (unused) reset code per email. Partial indexes are not
        // expressible through the index builder, both Postgres and SQLite accept this form.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_password_resets_live_email \
                 ON password_resets (email) WHERE is_used = false",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PasswordResets::Table).to_owned())
            .await?;
        Ok(())
    }
}
