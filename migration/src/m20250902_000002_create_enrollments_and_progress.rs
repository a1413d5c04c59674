use sea_orm_migration::prelude::*;

use crate::m20250901_000001_create_users::Users;
use crate::m20250902_000001_create_courses_and_lessons::{Courses, Lessons};

#[derive(DeriveIden)]
pub enum Enrollments {
    Table,
    Id,
    StudentId,
    CourseId,
    IsApproved,
    EnrolledAt,
    ApprovedAt,
}

#[derive(DeriveIden)]
enum Progress {
    Table,
    Id,
    EnrollmentId,
    LessonId,
    WatchedDuration,
    IsCompleted,
    LastWatchedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Enrollments::StudentId).integer().not_null())
                    .col(ColumnDef::new(Enrollments::CourseId).integer().not_null())
                    .col(
                        ColumnDef::new(Enrollments::IsApproved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Enrollments::EnrolledAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Enrollments::ApprovedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_student")
                            .from(Enrollments::Table, Enrollments::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_course")
                            .from(Enrollments::Table, Enrollments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // one enrollment per (student, course)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_enrollments_student_course")
                    .table(Enrollments::Table)
                    .col(Enrollments::StudentId)
                    .col(Enrollments::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Progress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Progress::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Progress::EnrollmentId).integer().not_null())
                    .col(ColumnDef::new(Progress::LessonId).integer().not_null())
                    .col(
                        ColumnDef::new(Progress::WatchedDuration)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Progress::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Progress::LastWatchedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_progress_enrollment")
                            .from(Progress::Table, Progress::EnrollmentId)
                            .to(Enrollments::Table, Enrollments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_progress_lesson")
                            .from(Progress::Table, Progress::LessonId)
                            .to(Lessons::Table, Lessons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_progress_enrollment_lesson")
                    .table(Progress::Table)
                    .col(Progress::EnrollmentId)
                    .col(Progress::LessonId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Progress::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;
        Ok(())
    }
}
