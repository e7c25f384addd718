//! HTTP API for the vote subsystem.
//!
//! Endpoints:
//! - Ballot submission and vote status
//! - Eligible elections per voter
//! - Live and final results
//! - Audit log queries and change notifications
//! - Prometheus metrics and health

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use error::RpcError;
pub use metrics::VoteMetrics;
pub use server::{router, RpcServer, RpcState};
