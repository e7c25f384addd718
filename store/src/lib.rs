//! Abstract storage traits for the votechain relational mirror.
//!
//! Every storage backend (in-memory, SQL, embedded KV) implements these
//! traits. The rest of the workspace depends only on the traits. The mirror
//! is the fast local copy of committed votes; the external ledger remains
//! the authoritative record and is reached through `votechain-ledger`.

pub mod audit;
pub mod candidate;
pub mod election;
pub mod error;
pub mod geography;
pub mod vote;
pub mod voter;

pub use audit::{AuditLogEntry, AuditStore, NewAuditEntry};
pub use candidate::{Candidate, CandidateStore, Party};
pub use election::{Election, ElectionStore, Position};
pub use error::StoreError;
pub use geography::{Constituency, District, GeographyStore, Province, Ward};
pub use vote::{VoteRecord, VoteStore};
pub use voter::{Voter, VoterStore};
