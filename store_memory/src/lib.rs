//! In-memory backend implementing every votechain storage trait.
//!
//! Thread-safe for use with tokio's multi-threaded runtime. This is the
//! runnable mirror backend for development deployments and the default
//! backend in tests; a SQL backend would implement the same traits.

mod store;

pub use store::MemoryStore;
