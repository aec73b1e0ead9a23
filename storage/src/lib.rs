//! Key-value session storage.
//!
//! Hosts persist small pieces of session state — the auth token, the cached
//! profile, recent and saved searches — through the [`KvStore`] trait. The
//! rest of the codebase depends only on the trait; backends are an in-memory
//! map for tests and a JSON file for the console host.

pub mod error;
pub mod file;
pub mod kv;
pub mod memory;
pub mod session;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use kv::KvStore;
pub use memory::MemoryStore;
pub use session::SessionCache;
