//! Data models
//!
//! Shared between the client and the cloud mock, mirroring the hosted
//! tables. All IDs are store-assigned UUIDs.

pub mod principal;
pub mod serde_helpers;
pub mod zone;

// Re-exports
pub use principal::*;
pub use zone::*;
