use sea_orm_migration::prelude::*;

use crate::m20250901_000001_create_users::Users;

#[derive(DeriveIden)]
pub enum Courses {
    Table,
    Id,
    Title,
    Description,
    Thumbnail,
    TeacherId,
    IsPaid,
    PriceCents,
    IsPublished,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Lessons {
    Table,
    Id,
    CourseId,
    Title,
    Description,
    Order,
    YoutubeVideoId,
    VideoDuration,
    PdfFiles,
    DocxFiles,
    XlsxFiles,
    PptxFiles,
    AudioFile,
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
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Courses::Description).text().not_null())
                    .col(ColumnDef::new(Courses::Thumbnail).string_len(500).null())
                    .col(ColumnDef::new(Courses::TeacherId).integer().not_null())
                    .col(
                        ColumnDef::new(Courses::IsPaid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Courses::PriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Courses::IsPublished)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Courses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_courses_teacher")
                            .from(Courses::Table, Courses::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Lessons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Lessons::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Lessons::CourseId).integer().not_null())
                    .col(ColumnDef::new(Lessons::Title).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Lessons::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Lessons::Order).integer().not_null().default(0))
                    .col(ColumnDef::new(Lessons::YoutubeVideoId).string_len(255).null())
                    .col(
                        ColumnDef::new(Lessons::VideoDuration)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    // JSON arrays of external document URLs
                    .col(ColumnDef::new(Lessons::PdfFiles).json().not_null())
                    .col(ColumnDef::new(Lessons::DocxFiles).json().not_null())
                    .col(ColumnDef::new(Lessons::XlsxFiles).json().not_null())
                    .col(ColumnDef::new(Lessons::PptxFiles).json().not_null())
                    .col(ColumnDef::new(Lessons::AudioFile).string_len(500).null())
                    .col(
                        ColumnDef::new(Lessons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Lessons::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lessons_course")
                            .from(Lessons::Table, Lessons::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lessons_course_order")
                    .table(Lessons::Table)
                    .col(Lessons::CourseId)
                    .col(Lessons::Order)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Lessons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        Ok(())
    }
}
