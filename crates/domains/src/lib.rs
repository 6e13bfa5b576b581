//! The central domain types and interface definitions for the movie catalog.

pub mod error;
pub mod models;
pub mod rating;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use rating::*;
pub use traits::*;
