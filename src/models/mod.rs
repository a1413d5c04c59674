pub mod auth;
pub mod common;
pub mod course;
pub mod enrollment;
pub mod lesson;
pub mod media;
pub mod pagination;
pub mod progress;
pub mod user;
pub mod voucher;

pub use auth::*;
pub use common::*;
pub use course::*;
pub use enrollment::*;
pub use lesson::*;
pub use media::*;
pub use pagination::*;
pub use progress::*;
pub use user::*;
pub use voucher::*;
