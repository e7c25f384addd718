//! The five-step submission pipeline.

use crate::ballot::{Ballot, BallotEntry};
use crate::error::SubmitError;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use votechain_audit::AuditRecorder;
use votechain_eligibility::{is_eligible, resolve_chain, roster_for, VoterChain};
use votechain_ledger::{LedgerClient, LedgerError, LedgerReceipt, RetryPolicy, VoteData};
use votechain_store::audit::AuditStore;
use votechain_store::candidate::CandidateStore;
use votechain_store::election::ElectionStore;
use votechain_store::geography::GeographyStore;
use votechain_store::vote::{VoteRecord, VoteStore};
use votechain_store::voter::VoterStore;
use votechain_store::StoreError;
use votechain_types::{AuditStatus, Clock, ElectionId, Timestamp, VoterId};

/// Everything the coordinator needs from the relational mirror.
pub trait CoordinatorStore:
    VoterStore
    + GeographyStore
    + ElectionStore
    + CandidateStore
    + VoteStore
    + AuditStore
    + Send
    + Sync
{
}

impl<T> CoordinatorStore for T where
    T: VoterStore
        + GeographyStore
        + ElectionStore
        + CandidateStore
        + VoteStore
        + AuditStore
        + Send
        + Sync
{
}

/// A ballot entry that reached the ledger, with its receipt.
#[derive(Clone, Debug)]
pub struct CommittedEntry {
    pub entry: BallotEntry,
    pub receipt: LedgerReceipt,
}

/// A committed entry whose mirror write failed. The receipt is retained so
/// [`crate::Reconciler`] can replay the row later.
#[derive(Debug)]
pub struct UnmirroredEntry {
    pub entry: BallotEntry,
    pub receipt: LedgerReceipt,
    pub error: StoreError,
}

/// The result of a submission whose ledger phase fully succeeded.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Every entry is on the ledger and in the mirror.
    Complete { records: Vec<VoteRecord> },
    /// Every entry is on the ledger, but some mirror rows are missing.
    /// The vote counts; the mirror owes rows that reconciliation will
    /// replay from the retained receipts.
    Partial {
        mirrored: Vec<VoteRecord>,
        unmirrored: Vec<UnmirroredEntry>,
    },
}

impl SubmitOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, SubmitOutcome::Complete { .. })
    }

    /// The mirror rows written by this submission.
    pub fn records(&self) -> &[VoteRecord] {
        match self {
            SubmitOutcome::Complete { records } => records,
            SubmitOutcome::Partial { mirrored, .. } => mirrored,
        }
    }
}

/// Drives ballots through validation, duplicate checking, the ledger
/// commit, the mirror write, and the audit trail.
///
/// The ordering is deliberate: the ledger commit happens before the mirror
/// write because the commit is irreversible while the mirror write is a
/// repeatable projection. The mirror therefore never holds a row the
/// ledger does not back.
pub struct Coordinator<S, L> {
    store: Arc<S>,
    ledger: Arc<L>,
    recorder: AuditRecorder<S>,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl<S, L> Coordinator<S, L>
where
    S: CoordinatorStore,
    L: LedgerClient,
{
    pub fn new(store: Arc<S>, ledger: Arc<L>, policy: RetryPolicy, clock: Arc<dyn Clock>) -> Self {
        let recorder = AuditRecorder::new(Arc::clone(&store), Arc::clone(&clock));
        Self {
            store,
            ledger,
            recorder,
            policy,
            clock,
        }
    }

    /// Submit one ballot.
    ///
    /// On `Ok`, every entry is committed to the ledger; inspect the
    /// [`SubmitOutcome`] for mirror completeness. On
    /// [`SubmitError::Ledger`], zero mirror rows were written and any
    /// entries that reached the ledger before the failure travel inside
    /// the error for reconciliation.
    pub async fn submit(&self, ballot: &Ballot) -> Result<SubmitOutcome, SubmitError> {
        let now = self.clock.now();
        // Rejected ballots leave an audit trail too; a validation failure
        // that vanishes from the log is invisible to operators.
        let chain = match self.validate(ballot, now) {
            Ok(chain) => chain,
            Err(err) => {
                self.audit_rejection(ballot, &err.to_string());
                return Err(err);
            }
        };

        // Cheap local duplicate check. The ledger enforces the same rule
        // authoritatively during the commit phase.
        if self.store.has_voted(ballot.election, &ballot.voter)? {
            self.audit_rejection(ballot, "vote already recorded for this election");
            return Err(SubmitError::AlreadyVoted);
        }

        let committed = self.commit_to_ledger(ballot, &chain).await?;
        Ok(self.mirror_and_audit(ballot, committed, now))
    }

    /// Whether the mirror holds a ballot for (election, voter). Cheap, but
    /// only as current as the last successful mirror write.
    pub fn has_voted(&self, election: ElectionId, voter: &VoterId) -> Result<bool, SubmitError> {
        Ok(self.store.has_voted(election, voter)?)
    }

    /// The authoritative answer, straight from the ledger.
    pub async fn has_voted_authoritative(
        &self,
        election: ElectionId,
        voter: &VoterId,
    ) -> Result<bool, SubmitError> {
        self.policy
            .has_voted(self.ledger.as_ref(), voter, election)
            .await
            .map_err(|source| SubmitError::Ledger {
                source,
                committed: Vec::new(),
            })
    }

    fn validate(&self, ballot: &Ballot, now: Timestamp) -> Result<VoterChain, SubmitError> {
        if ballot.entries.is_empty() {
            return Err(SubmitError::Validation("ballot has no entries".into()));
        }
        let mut seen = HashSet::new();
        for entry in &ballot.entries {
            if !seen.insert(entry.position) {
                return Err(SubmitError::Validation(format!(
                    "ballot names position {} more than once",
                    entry.position
                )));
            }
        }

        let chain = resolve_chain(self.store.as_ref(), &ballot.voter).map_err(map_lookup)?;
        let election = self.store.get_election(ballot.election).map_err(map_lookup)?;
        if !election.is_open_at(now) {
            return Err(SubmitError::Validation(format!(
                "election {} is not open for voting",
                election.id
            )));
        }

        let roster = roster_for(self.store.as_ref(), &election)?;
        if !is_eligible(&roster, &chain) {
            return Err(SubmitError::Validation(format!(
                "voter {} is not eligible for election {}",
                ballot.voter, election.id
            )));
        }

        for entry in &ballot.entries {
            let slate = roster
                .positions
                .iter()
                .find(|s| s.position.id == entry.position)
                .ok_or_else(|| {
                    SubmitError::Validation(format!(
                        "position {} is not contested in election {}",
                        entry.position, election.id
                    ))
                })?;
            if !slate
                .candidates
                .iter()
                .any(|rc| rc.candidate.id == entry.candidate)
            {
                return Err(SubmitError::Validation(format!(
                    "candidate {} is not on the slate for position {}",
                    entry.candidate, entry.position
                )));
            }
        }

        Ok(chain)
    }

    /// Commit every entry to the ledger, in ballot order. Any failure
    /// aborts the remaining entries; already-committed receipts travel in
    /// the returned error.
    async fn commit_to_ledger(
        &self,
        ballot: &Ballot,
        chain: &VoterChain,
    ) -> Result<Vec<CommittedEntry>, SubmitError> {
        let mut committed = Vec::with_capacity(ballot.entries.len());
        for entry in &ballot.entries {
            let data = VoteData {
                voter: ballot.voter.clone(),
                election: ballot.election,
                candidate: entry.candidate,
                position: entry.position,
                ward: chain.ward.code.clone(),
            };
            match self
                .policy
                .submit_with_retry(self.ledger.as_ref(), &data)
                .await
            {
                Ok(receipt) => committed.push(CommittedEntry {
                    entry: entry.clone(),
                    receipt,
                }),
                Err(source) => {
                    // A rejection before anything committed means the ledger
                    // already holds this voter's ballot (a race the mirror
                    // check missed).
                    if committed.is_empty() && matches!(source, LedgerError::Rejected(_)) {
                        if let Ok(true) = self
                            .policy
                            .has_voted(self.ledger.as_ref(), &ballot.voter, ballot.election)
                            .await
                        {
                            self.audit_rejection(ballot, "ledger already holds this ballot");
                            return Err(SubmitError::AlreadyVoted);
                        }
                    }
                    warn!(voter = %ballot.voter, election = %ballot.election,
                          committed = committed.len(), "ledger phase failed: {source}");
                    self.audit_ledger_failure(ballot, &committed, &source);
                    return Err(SubmitError::Ledger { source, committed });
                }
            }
        }
        Ok(committed)
    }

    /// Write one mirror row per committed entry and audit each entry.
    /// Mirror failures never undo the ledger commit; failed rows are
    /// reported for reconciliation instead.
    fn mirror_and_audit(
        &self,
        ballot: &Ballot,
        committed: Vec<CommittedEntry>,
        now: Timestamp,
    ) -> SubmitOutcome {
        let mut mirrored = Vec::new();
        let mut unmirrored = Vec::new();

        for c in committed {
            let record = VoteRecord {
                election: ballot.election,
                voter: ballot.voter.clone(),
                candidate: c.entry.candidate,
                position: c.entry.position,
                vote_hash: c.receipt.tx_hash,
                cast_at: now,
            };
            match self.store.insert_vote(&record) {
                // A duplicate row means a reconciliation replay beat us to
                // it; the projection already holds this entry.
                Ok(()) | Err(StoreError::DuplicateVote { .. }) => {
                    self.recorder.record_best_effort(self.recorder.vote_entry(
                        &ballot.voter,
                        ballot.election,
                        Some(c.receipt.tx_hash),
                        AuditStatus::Success,
                        None,
                    ));
                    mirrored.push(record);
                }
                Err(error) => {
                    warn!(voter = %ballot.voter, election = %ballot.election,
                          position = %c.entry.position, "mirror write failed: {error}");
                    self.recorder.record_best_effort(self.recorder.vote_entry(
                        &ballot.voter,
                        ballot.election,
                        Some(c.receipt.tx_hash),
                        AuditStatus::Pending,
                        Some(format!("mirror write pending repair: {error}")),
                    ));
                    unmirrored.push(UnmirroredEntry {
                        entry: c.entry,
                        receipt: c.receipt,
                        error,
                    });
                }
            }
        }

        if unmirrored.is_empty() {
            info!(voter = %ballot.voter, election = %ballot.election,
                  entries = mirrored.len(), "ballot submitted");
            SubmitOutcome::Complete { records: mirrored }
        } else {
            warn!(voter = %ballot.voter, election = %ballot.election,
                  mirrored = mirrored.len(), unmirrored = unmirrored.len(),
                  "ballot committed with mirror rows pending repair");
            SubmitOutcome::Partial {
                mirrored,
                unmirrored,
            }
        }
    }

    fn audit_rejection(&self, ballot: &Ballot, reason: &str) {
        self.recorder.record_best_effort(self.recorder.vote_entry(
            &ballot.voter,
            ballot.election,
            None,
            AuditStatus::Failed,
            Some(reason.into()),
        ));
    }

    fn audit_ledger_failure(&self, ballot: &Ballot, committed: &[CommittedEntry], err: &LedgerError) {
        // Entries that landed are pending their mirror rows; the rest of
        // the ballot failed outright.
        for c in committed {
            self.recorder.record_best_effort(self.recorder.vote_entry(
                &ballot.voter,
                ballot.election,
                Some(c.receipt.tx_hash),
                AuditStatus::Pending,
                Some("ledger phase aborted after this entry committed".into()),
            ));
        }
        let failed = ballot.entries.len() - committed.len();
        for _ in 0..failed {
            self.recorder.record_best_effort(self.recorder.vote_entry(
                &ballot.voter,
                ballot.election,
                None,
                AuditStatus::Failed,
                Some(err.to_string()),
            ));
        }
    }
}

fn map_lookup(err: StoreError) -> SubmitError {
    match err {
        StoreError::NotFound(what) => SubmitError::NotFound(what),
        other => SubmitError::Store(other),
    }
}
