pub mod auth;
pub mod course;
pub mod enrollment;
pub mod lesson;
pub mod progress;
pub mod upload;
pub mod user;
pub mod voucher;

pub use auth::auth_config;
pub use course::course_config;
pub use enrollment::enrollment_config;
pub use lesson::lesson_config;
pub use progress::progress_config;
pub use upload::upload_config;
pub use user::user_config;
pub use voucher::voucher_config;
