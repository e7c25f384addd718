//! In-process simulated ledger.
//!
//! Stands in for the real chain in development deployments and tests.
//! Behaves like the real thing at the interface: double votes are rejected,
//! receipts are retrievable, and faults can be injected per call to
//! exercise every failure mode of [`LedgerError`].

use crate::client::{LedgerClient, LedgerReceipt, VoteData};
use crate::LedgerError;
use blake2::{Blake2s256, Digest};
use rand::RngCore;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use votechain_types::{ElectionId, PositionId, TxHash, VoterId};

/// A fault to inject into the next `submit_vote` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// The ledger refuses the transaction.
    Reject,
    /// The ledger cannot be reached; nothing lands.
    Unreachable,
    /// The call times out and the transaction did not land.
    Timeout,
    /// The call times out but the transaction did land — the ambiguous
    /// case that forces the check-before-retry discipline.
    TimeoutAfterCommit,
}

#[derive(Default)]
struct SimState {
    /// Committed ballot entries keyed by (election, voter, position).
    votes: HashMap<(ElectionId, VoterId, PositionId), LedgerReceipt>,
    /// Faults consumed by subsequent submit calls, front first.
    faults: VecDeque<Fault>,
    sequence: u64,
}

/// The simulated ledger. Thread-safe; clone-free sharing via `Arc`.
pub struct SimLedger {
    state: Mutex<SimState>,
}

impl SimLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState::default()),
        }
    }

    /// Queue a fault for the next `submit_vote` call. Multiple queued
    /// faults are consumed in order.
    pub fn inject_fault(&self, fault: Fault) {
        self.state.lock().unwrap().faults.push_back(fault);
    }

    /// Number of committed votes across all elections.
    pub fn committed_count(&self) -> usize {
        self.state.lock().unwrap().votes.len()
    }

    fn commit(state: &mut SimState, vote: &VoteData) -> Result<LedgerReceipt, LedgerError> {
        let key = (vote.election, vote.voter.clone(), vote.position);
        if state.votes.contains_key(&key) {
            return Err(LedgerError::Rejected(format!(
                "voter {} already voted for position {} in election {}",
                vote.voter, vote.position, vote.election
            )));
        }
        state.sequence += 1;
        let mut nonce = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut nonce);
        let vote_id = format!("VOTE-{:06}-{}", state.sequence, hex::encode(nonce));

        let mut hasher = Blake2s256::new();
        hasher.update(vote_id.as_bytes());
        hasher.update(vote.voter.as_str().as_bytes());
        hasher.update(vote.election.as_u64().to_be_bytes());
        hasher.update(vote.candidate.as_u64().to_be_bytes());
        let tx_hash = TxHash::new(hasher.finalize().into());

        let receipt = LedgerReceipt { vote_id, tx_hash };
        state.votes.insert(key, receipt.clone());
        Ok(receipt)
    }
}

impl Default for SimLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerClient for SimLedger {
    async fn submit_vote(&self, vote: &VoteData) -> Result<LedgerReceipt, LedgerError> {
        let mut state = self.state.lock().unwrap();
        match state.faults.pop_front() {
            Some(Fault::Reject) => Err(LedgerError::Rejected("injected rejection".into())),
            Some(Fault::Unreachable) => {
                Err(LedgerError::Unreachable("injected outage".into()))
            }
            Some(Fault::Timeout) => Err(LedgerError::Timeout),
            Some(Fault::TimeoutAfterCommit) => {
                Self::commit(&mut state, vote)?;
                Err(LedgerError::Timeout)
            }
            None => Self::commit(&mut state, vote),
        }
    }

    async fn has_voter_voted(
        &self,
        voter: &VoterId,
        election: ElectionId,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .votes
            .keys()
            .any(|(e, v, _)| *e == election && v == voter))
    }

    async fn has_vote_landed(
        &self,
        voter: &VoterId,
        election: ElectionId,
        position: PositionId,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .votes
            .contains_key(&(election, voter.clone(), position)))
    }

    async fn find_receipt(
        &self,
        voter: &VoterId,
        election: ElectionId,
        position: PositionId,
    ) -> Result<Option<LedgerReceipt>, LedgerError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .votes
            .get(&(election, voter.clone(), position))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votechain_types::{CandidateId, PositionId, WardCode};

    fn vote(voter: &str, election: u64) -> VoteData {
        VoteData {
            voter: VoterId::new(voter),
            election: ElectionId::new(election),
            candidate: CandidateId::new(1),
            position: PositionId::new(1),
            ward: WardCode::new("W-01"),
        }
    }

    #[tokio::test]
    async fn double_vote_is_rejected() {
        let ledger = SimLedger::new();
        ledger.submit_vote(&vote("V-1", 1)).await.unwrap();
        let err = ledger.submit_vote(&vote("V-1", 1)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(_)));
        assert_eq!(ledger.committed_count(), 1);
    }

    #[tokio::test]
    async fn has_voted_reflects_commits() {
        let ledger = SimLedger::new();
        let voter = VoterId::new("V-1");
        assert!(!ledger
            .has_voter_voted(&voter, ElectionId::new(1))
            .await
            .unwrap());
        ledger.submit_vote(&vote("V-1", 1)).await.unwrap();
        assert!(ledger
            .has_voter_voted(&voter, ElectionId::new(1))
            .await
            .unwrap());
        // Different election: still unvoted.
        assert!(!ledger
            .has_voter_voted(&voter, ElectionId::new(2))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn timeout_after_commit_lands_the_vote() {
        let ledger = SimLedger::new();
        ledger.inject_fault(Fault::TimeoutAfterCommit);
        let err = ledger.submit_vote(&vote("V-1", 1)).await.unwrap_err();
        assert_eq!(err, LedgerError::Timeout);
        assert!(ledger
            .has_voter_voted(&VoterId::new("V-1"), ElectionId::new(1))
            .await
            .unwrap());
        assert!(ledger
            .find_receipt(&VoterId::new("V-1"), ElectionId::new(1), PositionId::new(1))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn plain_timeout_does_not_land() {
        let ledger = SimLedger::new();
        ledger.inject_fault(Fault::Timeout);
        ledger.submit_vote(&vote("V-1", 1)).await.unwrap_err();
        assert_eq!(ledger.committed_count(), 0);
    }
}
