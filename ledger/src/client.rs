//! The `LedgerClient` trait and its wire types.

use crate::LedgerError;
use blake2::{Blake2s256, Digest};
use serde::{Deserialize, Serialize};
use votechain_types::{CandidateId, ElectionId, PositionId, TxHash, VoterId, WardCode};

/// The payload submitted to the ledger for one vote entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteData {
    pub voter: VoterId,
    pub election: ElectionId,
    pub candidate: CandidateId,
    pub position: PositionId,
    pub ward: WardCode,
}

/// What the ledger hands back on a successful commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    /// Ledger-assigned vote identifier.
    pub vote_id: String,
    /// Hash of the committing transaction.
    pub tx_hash: TxHash,
}

/// Narrow interface to the external append-only ledger.
///
/// Implementations must be safe to share across tasks. The ledger — not
/// the relational mirror — is the authoritative answer to "has this voter
/// ever had a vote accepted".
pub trait LedgerClient: Send + Sync {
    /// Submit one ballot entry. On success the vote is irreversibly
    /// committed; a second submit for the same (voter, election, position)
    /// is rejected.
    fn submit_vote(
        &self,
        vote: &VoteData,
    ) -> impl std::future::Future<Output = Result<LedgerReceipt, LedgerError>> + Send;

    /// Authoritative check, independent of the relational mirror: whether
    /// any entry of the voter's ballot landed for this election.
    fn has_voter_voted(
        &self,
        voter: &VoterId,
        election: ElectionId,
    ) -> impl std::future::Future<Output = Result<bool, LedgerError>> + Send;

    /// Whether one specific ballot entry landed. Used to resolve ambiguous
    /// submit outcomes without conflating entries of the same ballot.
    fn has_vote_landed(
        &self,
        voter: &VoterId,
        election: ElectionId,
        position: PositionId,
    ) -> impl std::future::Future<Output = Result<bool, LedgerError>> + Send;

    /// Retrieve the receipt for a committed ballot entry, if the ledger
    /// indexes one. May be `None` even for a landed vote.
    fn find_receipt(
        &self,
        voter: &VoterId,
        election: ElectionId,
        position: PositionId,
    ) -> impl std::future::Future<Output = Result<Option<LedgerReceipt>, LedgerError>> + Send;
}

/// Deterministic fallback hash for a vote whose ledger receipt carried no
/// usable transaction hash. Derived purely from the vote payload so that
/// reconciliation replays produce the same value.
pub fn fallback_vote_hash(vote: &VoteData) -> TxHash {
    let mut hasher = Blake2s256::new();
    hasher.update(vote.voter.as_str().as_bytes());
    hasher.update(vote.election.as_u64().to_be_bytes());
    hasher.update(vote.candidate.as_u64().to_be_bytes());
    hasher.update(vote.position.as_u64().to_be_bytes());
    hasher.update(vote.ward.as_str().as_bytes());
    TxHash::new(hasher.finalize().into())
}
