use sea_orm_migration::prelude::*;

use crate::m20250901_000001_create_users::Users;
use crate::m20250902_000001_create_courses_and_lessons::Courses;

/// Manual payment evidence submitted for paid courses.
/// No uniqueness on (student, course): resubmission after rejection is allowed.
#[derive(DeriveIden)]
enum VoucherPayments {
    Table,
    Id,
    StudentId,
    CourseId,
    VoucherImage,
    Status,
    IsSeen,
    SubmittedAt,
    ReviewedAt,
    ReviewedBy,
    Notes,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VoucherPayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VoucherPayments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VoucherPayments::StudentId).integer().not_null())
                    .col(ColumnDef::new(VoucherPayments::CourseId).integer().not_null())
                    .col(
                        ColumnDef::new(VoucherPayments::VoucherImage)
                            .string_len(500)
                            .not_null(),
                    )
                    // pending | approved | rejected
                    .col(
                        ColumnDef::new(VoucherPayments::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(VoucherPayments::IsSeen)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(VoucherPayments::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VoucherPayments::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(VoucherPayments::ReviewedBy).integer().null())
                    .col(
                        ColumnDef::new(VoucherPayments::Notes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voucher_payments_student")
                            .from(VoucherPayments::Table, VoucherPayments::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voucher_payments_course")
                            .from(VoucherPayments::Table, VoucherPayments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voucher_payments_reviewer")
                            .from(VoucherPayments::Table, VoucherPayments::ReviewedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_voucher_payments_course_status")
                    .table(VoucherPayments::Table)
                    .col(VoucherPayments::CourseId)
                    .col(VoucherPayments::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VoucherPayments::Table).to_owned())
            .await?;
        Ok(())
    }
}
