//! Mirror repair from retained ledger receipts.
//!
//! A ledger commit without a mirror row is the one tolerated transient
//! inconsistency in the system. The submit path retains the receipt of
//! every such entry (in [`crate::SubmitError::Ledger`] and
//! [`crate::submit::SubmitOutcome::Partial`]); the reconciler replays the
//! missing rows from those receipts. Replays are idempotent: a row that
//! already exists counts as repaired, never as a conflict.

use crate::ballot::BallotEntry;
use crate::error::SubmitError;
use crate::submit::{CommittedEntry, UnmirroredEntry};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use votechain_audit::AuditRecorder;
use votechain_ledger::{LedgerClient, LedgerReceipt, RetryPolicy};
use votechain_store::audit::AuditStore;
use votechain_store::vote::{VoteRecord, VoteStore};
use votechain_store::StoreError;
use votechain_types::{AuditStatus, Clock, ElectionId, VoterId};

/// One mirror row owed to the store, with the ledger receipt backing it.
#[derive(Clone, Debug)]
pub struct RepairTask {
    pub voter: VoterId,
    pub election: ElectionId,
    pub entry: BallotEntry,
    pub receipt: LedgerReceipt,
}

impl RepairTask {
    /// Tasks for a submission that failed mid-ledger-phase, from the
    /// committed entries carried by [`SubmitError::Ledger`].
    pub fn from_committed(
        voter: &VoterId,
        election: ElectionId,
        committed: Vec<CommittedEntry>,
    ) -> Vec<Self> {
        committed
            .into_iter()
            .map(|c| Self {
                voter: voter.clone(),
                election,
                entry: c.entry,
                receipt: c.receipt,
            })
            .collect()
    }

    /// Tasks for a partial submission's failed mirror writes.
    pub fn from_unmirrored(
        voter: &VoterId,
        election: ElectionId,
        unmirrored: Vec<UnmirroredEntry>,
    ) -> Vec<Self> {
        unmirrored
            .into_iter()
            .map(|u| Self {
                voter: voter.clone(),
                election,
                entry: u.entry,
                receipt: u.receipt,
            })
            .collect()
    }
}

/// What a repair pass accomplished.
#[derive(Debug, Default)]
pub struct RepairSummary {
    /// Rows written by this pass.
    pub repaired: u64,
    /// Rows that already existed (an earlier replay or a concurrent
    /// submission got there first).
    pub already_present: u64,
    /// Tasks that still failed; carry them into the next pass.
    pub failed: Vec<(RepairTask, StoreError)>,
}

impl RepairSummary {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Shared queue of repair tasks awaiting the next reconciliation pass.
///
/// The submit path pushes tasks as failures happen; a background pass
/// drains the queue and hands the tasks to [`Reconciler::repair`],
/// re-queueing whatever still fails.
#[derive(Default)]
pub struct RepairQueue {
    tasks: std::sync::Mutex<Vec<RepairTask>>,
}

impl RepairQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_all(&self, tasks: Vec<RepairTask>) {
        if tasks.is_empty() {
            return;
        }
        self.tasks.lock().unwrap().extend(tasks);
    }

    /// Take every queued task, leaving the queue empty.
    pub fn drain(&self) -> Vec<RepairTask> {
        std::mem::take(&mut *self.tasks.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Replays mirror rows from ledger receipts and audits each repair.
pub struct Reconciler<S> {
    store: Arc<S>,
    recorder: AuditRecorder<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Reconciler<S>
where
    S: VoteStore + AuditStore,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        let recorder = AuditRecorder::new(Arc::clone(&store), Arc::clone(&clock));
        Self {
            store,
            recorder,
            clock,
        }
    }

    /// Run one repair pass over the given tasks.
    pub fn repair(&self, tasks: Vec<RepairTask>) -> RepairSummary {
        let mut summary = RepairSummary::default();
        for task in tasks {
            let record = VoteRecord {
                election: task.election,
                voter: task.voter.clone(),
                candidate: task.entry.candidate,
                position: task.entry.position,
                vote_hash: task.receipt.tx_hash,
                cast_at: self.clock.now(),
            };
            match self.store.insert_vote(&record) {
                Ok(()) => {
                    info!(voter = %task.voter, election = %task.election,
                          position = %task.entry.position, "mirror row repaired");
                    self.recorder.record_best_effort(self.recorder.vote_entry(
                        &task.voter,
                        task.election,
                        Some(task.receipt.tx_hash),
                        AuditStatus::Success,
                        None,
                    ));
                    summary.repaired += 1;
                }
                Err(StoreError::DuplicateVote { .. }) => {
                    summary.already_present += 1;
                }
                Err(err) => {
                    warn!(voter = %task.voter, election = %task.election,
                          position = %task.entry.position, "mirror repair failed: {err}");
                    summary.failed.push((task, err));
                }
            }
        }
        summary
    }

    /// Voters (of the given candidates) whose ballot the ledger holds but
    /// the mirror does not — the rows a repair pass owes. Detection only;
    /// repair needs the retained receipts.
    pub async fn missing_in_mirror<L: LedgerClient>(
        &self,
        ledger: &L,
        policy: &RetryPolicy,
        election: ElectionId,
        voters: &[VoterId],
    ) -> Result<Vec<VoterId>, SubmitError> {
        let mut missing = Vec::new();
        let mut seen = HashSet::new();
        for voter in voters {
            if !seen.insert(voter.clone()) {
                continue;
            }
            let on_ledger = policy
                .has_voted(ledger, voter, election)
                .await
                .map_err(|source| SubmitError::Ledger {
                    source,
                    committed: Vec::new(),
                })?;
            if on_ledger && !self.store.has_voted(election, voter)? {
                missing.push(voter.clone());
            }
        }
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votechain_store_memory::MemoryStore;
    use votechain_types::{CandidateId, ManualClock, PositionId, TxHash};

    fn task(voter: &str, position: u64) -> RepairTask {
        RepairTask {
            voter: VoterId::new(voter),
            election: ElectionId::new(1),
            entry: BallotEntry {
                candidate: CandidateId::new(7),
                position: PositionId::new(position),
            },
            receipt: LedgerReceipt {
                vote_id: format!("VOTE-{voter}-{position}"),
                tx_hash: TxHash::new([position as u8; 32]),
            },
        }
    }

    fn reconciler(store: &Arc<MemoryStore>) -> Reconciler<MemoryStore> {
        Reconciler::new(Arc::clone(store), Arc::new(ManualClock::new(500)))
    }

    #[test]
    fn repair_writes_missing_rows_and_audits() {
        let store = Arc::new(MemoryStore::new());
        let rec = reconciler(&store);

        let summary = rec.repair(vec![task("V-1", 1), task("V-1", 2)]);
        assert_eq!(summary.repaired, 2);
        assert_eq!(summary.already_present, 0);
        assert!(summary.is_clean());
        assert_eq!(store.vote_count(ElectionId::new(1)).unwrap(), 2);
        assert_eq!(store.entry_count().unwrap(), 2);
    }

    #[test]
    fn repair_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let rec = reconciler(&store);

        rec.repair(vec![task("V-1", 1)]);
        let summary = rec.repair(vec![task("V-1", 1)]);
        assert_eq!(summary.repaired, 0);
        assert_eq!(summary.already_present, 1);
        assert_eq!(store.vote_count(ElectionId::new(1)).unwrap(), 1);
    }

    #[test]
    fn queue_drain_empties_it() {
        let queue = RepairQueue::new();
        assert!(queue.is_empty());
        queue.push_all(vec![task("V-1", 1), task("V-2", 1)]);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain().len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn failed_tasks_are_retained_for_the_next_pass() {
        let store = Arc::new(MemoryStore::new());
        let rec = reconciler(&store);

        store.fail_next_vote_inserts(1);
        let summary = rec.repair(vec![task("V-1", 1), task("V-2", 1)]);
        assert_eq!(summary.repaired, 1);
        assert_eq!(summary.failed.len(), 1);

        let retry: Vec<RepairTask> = summary.failed.into_iter().map(|(t, _)| t).collect();
        let second = rec.repair(retry);
        assert_eq!(second.repaired, 1);
        assert!(second.is_clean());
        assert_eq!(store.vote_count(ElectionId::new(1)).unwrap(), 2);
    }
}
