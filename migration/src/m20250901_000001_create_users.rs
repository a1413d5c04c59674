use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Email,
    Username,
    PasswordHash,
    FirstName,
    MiddleName,
    LastName,
    SecondLastName,
    Role,
    Phone,
    Avatar,
    YapeQr,
    PlinQr,
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
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string_len(254).not_null())
                    .col(ColumnDef::new(Users::Username).string_len(150).not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Users::FirstName).string_len(150).not_null())
                    .col(
                        ColumnDef::new(Users::MiddleName)
                            .string_len(150)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Users::LastName).string_len(150).not_null())
                    .col(
                        ColumnDef::new(Users::SecondLastName)
                            .string_len(150)
                            .not_null()
                            .default(""),
                    )
                    // student | teacher
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(16)
                            .not_null()
                            .default("student"),
                    )
                    .col(
                        ColumnDef::new(Users::Phone)
                            .string_len(50)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Users::Avatar).string_len(500).null())
                    .col(ColumnDef::new(Users::YapeQr).string_len(500).null())
                    .col(ColumnDef::new(Users::PlinQr).string_len(500).null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
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
                    .name("uq_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_users_username")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // One account per person: the stored name tuple is unique.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_users_full_name")
                    .table(Users::Table)
                    .col(Users::FirstName)
                    .col(Users::MiddleName)
                    .col(Users::LastName)
                    .col(Users::SecondLastName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
