//! Candidate and party storage traits and records.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use votechain_types::{CandidateId, PartyId, PositionId, WardCode};

/// A candidate standing for one position, anchored in one ward.
///
/// The ward anchoring is what scoped-election eligibility matches against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub first_name: String,
    pub last_name: String,
    pub position: PositionId,
    pub ward: WardCode,
    pub party: Option<PartyId>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A political party.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    pub acronym: String,
}

/// Trait for candidate and party storage operations.
pub trait CandidateStore {
    fn get_candidate(&self, id: CandidateId) -> Result<Candidate, StoreError>;
    fn put_candidate(&self, candidate: &Candidate) -> Result<(), StoreError>;
    /// Candidates standing for a position, in registration order.
    fn candidates_for_position(&self, position: PositionId) -> Result<Vec<Candidate>, StoreError>;

    fn get_party(&self, id: PartyId) -> Result<Party, StoreError>;
    fn put_party(&self, party: &Party) -> Result<(), StoreError>;
}
