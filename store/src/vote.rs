//! Vote mirror storage trait and record.
//!
//! A ballot covers one or more positions; the mirror holds one row per
//! (election, voter, position), and a voter may have rows for at most one
//! ballot per election. A row must never exist without a corresponding
//! successful ledger commit; the inverse (ledger commit without a row) is
//! the sole tolerated transient inconsistency and is repaired by
//! reconciliation.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use votechain_types::{CandidateId, ElectionId, PositionId, Timestamp, TxHash, VoterId};

/// A committed vote as mirrored in the relational store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub election: ElectionId,
    pub voter: VoterId,
    pub candidate: CandidateId,
    pub position: PositionId,
    /// Derived from the ledger transaction returned on commit.
    pub vote_hash: TxHash,
    pub cast_at: Timestamp,
}

/// Trait for vote mirror storage operations.
pub trait VoteStore {
    /// Insert a vote row. Fails with [`StoreError::DuplicateVote`] when a
    /// row for this (election, voter, position) already exists — this
    /// unique key is the serialization point for concurrent submissions
    /// and the insert must be atomic with respect to other inserts.
    fn insert_vote(&self, vote: &VoteRecord) -> Result<(), StoreError>;

    /// The voter's vote rows for an election (one per ballot position).
    fn votes_by_voter(
        &self,
        election: ElectionId,
        voter: &VoterId,
    ) -> Result<Vec<VoteRecord>, StoreError>;

    /// Whether any row exists for (election, voter) — the cheap local
    /// duplicate check. The ledger remains the authoritative answer.
    fn has_voted(&self, election: ElectionId, voter: &VoterId) -> Result<bool, StoreError> {
        Ok(!self.votes_by_voter(election, voter)?.is_empty())
    }

    /// All vote rows for an election, in insertion order.
    fn votes_for_election(&self, election: ElectionId) -> Result<Vec<VoteRecord>, StoreError>;

    /// Number of vote rows for an election.
    fn vote_count(&self, election: ElectionId) -> Result<u64, StoreError> {
        self.votes_for_election(election).map(|v| v.len() as u64)
    }
}
