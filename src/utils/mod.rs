pub mod clock;
pub mod code_generator;
pub mod identity;
pub mod jwt;
pub mod password;

pub use clock::*;
pub use code_generator::{generate_fresh_code, generate_six_digit_code};
pub use identity::*;
pub use jwt::*;
pub use password::*;
