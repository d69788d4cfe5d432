//! HTTP request handlers.

pub mod artworks;
pub mod files;
pub mod health;
pub mod users;

pub use artworks::*;
pub use files::*;
pub use health::*;
pub use users::*;
