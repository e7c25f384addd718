//! Submission error taxonomy.

use crate::submit::CommittedEntry;
use thiserror::Error;
use votechain_ledger::LedgerError;
use votechain_store::StoreError;

/// Why a ballot submission was rejected.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Caller-fixable; no side effects occurred.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The voter or election does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A vote for this (voter, election) is already recorded. Idempotent
    /// no-op from the caller's perspective.
    #[error("voter has already voted in this election")]
    AlreadyVoted,

    /// A ledger submit failed and the batch was aborted with zero mirror
    /// rows written. Entries that reached the ledger before the failure
    /// travel with the error so reconciliation can replay their mirror
    /// writes — they are never abandoned.
    #[error("ledger failure: {source}")]
    Ledger {
        source: LedgerError,
        committed: Vec<CommittedEntry>,
    },

    /// The store failed outside the mirror-write step.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}
