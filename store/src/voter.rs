//! Voter storage trait and record.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use votechain_types::{VoterId, WardCode};

/// A registered voter.
///
/// Immutable after registration except the profile fields (names, email).
/// The ward assignment anchors the voter in the geography tree and drives
/// scoped-election eligibility.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub id: VoterId,
    pub first_name: String,
    pub last_name: String,
    /// National Registration Card number.
    pub nrc: String,
    /// Hash of the voter's login credential; issuance is external to this
    /// subsystem.
    pub credential_hash: String,
    pub ward: WardCode,
}

/// Trait for voter storage operations.
pub trait VoterStore {
    fn get_voter(&self, id: &VoterId) -> Result<Voter, StoreError>;
    fn put_voter(&self, voter: &Voter) -> Result<(), StoreError>;
    fn voter_exists(&self, id: &VoterId) -> Result<bool, StoreError>;
    /// Total registered voters; the denominator for turnout.
    fn voter_count(&self) -> Result<u64, StoreError>;
}
