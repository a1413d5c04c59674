pub mod brevo;
pub mod cloudinary;
pub mod email;
pub mod media;

pub use brevo::*;
pub use cloudinary::*;
pub use email::*;
pub use media::*;
