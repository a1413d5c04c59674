pub mod courses;
pub mod email_verifications;
pub mod enrollments;
pub mod lessons;
pub mod password_resets;
pub mod progress;
pub mod users;
pub mod voucher_payments;

pub use courses as course_entity;
pub use email_verifications as email_verification_entity;
pub use enrollments as enrollment_entity;
pub use lessons as lesson_entity;
pub use password_resets as password_reset_entity;
pub use progress as progress_entity;
pub use users as user_entity;
pub use voucher_payments as voucher_payment_entity;

pub use lessons::DocumentUrls;
pub use users::UserRole;
pub use voucher_payments::VoucherStatus;
