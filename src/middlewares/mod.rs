pub mod auth;
pub mod auth_user;
pub mod cors;

pub use auth::*;
pub use auth_user::*;
pub use cors::*;
