//! Ballot types submitted by voters.

use serde::{Deserialize, Serialize};
use votechain_types::{CandidateId, ElectionId, PositionId, VoterId};

/// One choice on a ballot: a candidate for a position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotEntry {
    pub candidate: CandidateId,
    pub position: PositionId,
}

/// A voter's complete ballot for one election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: VoterId,
    pub election: ElectionId,
    pub entries: Vec<BallotEntry>,
}
