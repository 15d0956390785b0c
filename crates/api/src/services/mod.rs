//! Business operations behind the HTTP routes.
//!
//! Each operation runs read -> (upload) -> write against the repositories and
//! image host it is handed; nothing here touches HTTP types.

pub mod media;
pub mod orders;
pub mod restaurants;
pub mod users;

pub use media::{CloudinaryClient, ImageFile, ImageUploader, MediaError};
