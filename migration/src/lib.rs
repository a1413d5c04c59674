pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_users;
mod m20250901_000002_create_email_verifications;
mod m20250901_000003_create_password_resets;
mod m20250902_000001_create_courses_and_lessons;
mod m20250902_000002_create_enrollments_and_progress;
mod m20250903_000001_create_voucher_payments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_users::Migration),
            Box::new(m20250901_000002_create_email_verifications::Migration),
            Box::new(m20250901_000003_create_password_resets::Migration),
            Box::new(m20250902_000001_create_courses_and_lessons::Migration),
            Box::new(m20250902_000002_create_enrollments_and_progress::Migration),
            Box::new(m20250903_000001_create_voucher_payments::Migration),
        ]
    }
}
