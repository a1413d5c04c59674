pub mod auth_service;
pub mod course_service;
pub mod enrollment_service;
pub mod lesson_service;
pub mod password_reset_service;
pub mod progress_service;
pub mod registration_service;
pub mod upload_service;
pub mod user_service;
pub mod voucher_service;

pub use auth_service::*;
pub use course_service::*;
pub use enrollment_service::*;
pub use lesson_service::*;
pub use password_reset_service::*;
pub use progress_service::*;
pub use registration_service::*;
pub use upload_service::*;
pub use user_service::*;
pub use voucher_service::*;
