//! In-memory storage backend.
//!
//! Keeps everything in process memory behind async locks. Used for tests
//! and local experiments; data is lost when the process exits.

mod repository;

pub use repository::InMemoryRepository;
