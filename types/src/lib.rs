//! Fundamental types for the votechain election subsystem.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: identifiers, the ledger transaction hash, timestamps, and the
//! election/audit state enums.

pub mod hash;
pub mod id;
pub mod state;
pub mod time;

pub use hash::TxHash;
pub use id::{
    CandidateId, ConstituencyCode, DistrictCode, ElectionId, PartyId, PositionId, ProvinceCode,
    VoterId, WardCode,
};
pub use state::{ActorType, AuditAction, AuditStatus, ElectionStatus, ElectionType};
pub use time::{Clock, ManualClock, SystemClock, Timestamp};
