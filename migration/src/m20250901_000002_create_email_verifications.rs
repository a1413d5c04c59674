use sea_orm_migration::prelude::*;

/// Pending registrations. One row per email; the staged payload is promoted
/// into `users` once the emailed code is confirmed.
#[derive(DeriveIden)]
enum EmailVerifications {
    Table,
    Id,
    Email,
    Code,
    CreatedAt,
    LastSentAt,
    IsVerified,
    FirstName,
    MiddleName,
    LastName,
    SecondLastName,
    PasswordHash,
    Phone,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailVerifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailVerifications::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EmailVerifications::Email)
                            .string_len(254)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EmailVerifications::Code).string_len(6).not_null())
                    .col(
                        ColumnDef::new(EmailVerifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmailVerifications::LastSentAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmailVerifications::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(EmailVerifications::FirstName)
                            .string_len(150)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmailVerifications::MiddleName)
                            .string_len(150)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(EmailVerifications::LastName)
                            .string_len(150)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmailVerifications::SecondLastName)
                            .string_len(150)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmailVerifications::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmailVerifications::Phone)
                            .string_len(50)
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        // upsert target for repeated send-code requests
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_email_verifications_email")
                    .table(EmailVerifications::Table)
                    .col(EmailVerifications::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailVerifications::Table).to_owned())
            .await?;
        Ok(())
    }
}
