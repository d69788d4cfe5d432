//! Repository traits for catalog operations.

pub mod artworks;
pub mod users;

pub use artworks::ArtworkRepo;
pub use users::UserRepo;
