//! Core domain types and shared logic for the gallery backend.
//!
//! This crate defines the data model used across all other crates:
//! - Content-based MIME classification
//! - Thumbnail derivation
//! - Storage tags attached to uploaded objects
//! - Catalog pagination, filters and edits
//! - User identity and profile updates

pub mod artwork;
pub mod config;
pub mod error;
pub mod mime;
pub mod page;
pub mod serde_ext;
pub mod tags;
pub mod thumbnail;
pub mod user;

pub use artwork::{ArtworkFilter, ArtworkUpdate};
pub use error::{Error, Result};
pub use mime::{FileType, SniffedMime};
pub use page::{PageInfo, PageRequest};
pub use tags::StorageTags;
pub use thumbnail::Thumbnailer;
pub use user::{Caller, ProfileUpdate};

/// Default maximum artwork size: 50 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
