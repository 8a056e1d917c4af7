//! SQLite storage backend.
//!
//! Maps the repository traits onto a file-based (or in-memory) SQLite
//! database. Counter and prayed-over increments are expressed as
//! server-side `count = count + 1` updates so concurrent writers to the
//! same row serialize inside the engine instead of racing in the client.

mod conversions;
mod error;
mod repository;
mod schema;

pub use repository::SqliteRepository;
