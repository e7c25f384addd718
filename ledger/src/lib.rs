//! Client boundary for the external append-only vote ledger.
//!
//! The ledger is the authoritative record of accepted votes; this crate
//! defines the narrow interface the rest of the system talks to it through
//! ([`LedgerClient`]), the failure taxonomy ([`LedgerError`]), an
//! in-process simulated ledger for development and tests ([`SimLedger`]),
//! and the retry discipline that keeps retries safe ([`RetryPolicy`]).

pub mod client;
pub mod error;
pub mod retry;
pub mod sim;

pub use client::{fallback_vote_hash, LedgerClient, LedgerReceipt, VoteData};
pub use error::LedgerError;
pub use retry::RetryPolicy;
pub use sim::{Fault, SimLedger};
