//! Node wiring for the votechain vote subsystem.
//!
//! Assembles the storage backend, the ledger client, the submission
//! coordinator, and the RPC server into one runnable [`Node`], with TOML
//! configuration and structured logging.

pub mod config;
pub mod error;
pub mod logging;
pub mod node;
pub mod seed;

pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use node::Node;
