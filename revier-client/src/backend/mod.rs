//! Backend implementations of the auth and store traits.

pub mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::MemoryBackend;
