use thiserror::Error;

/// Failure modes of the ledger boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger evaluated the transaction and refused it (e.g. the voter
    /// already has a vote recorded on-chain). Terminal: never retried.
    #[error("rejected by ledger: {0}")]
    Rejected(String),

    /// The ledger could not be reached. The transaction definitively did
    /// not land; safe to retry.
    #[error("ledger unreachable: {0}")]
    Unreachable(String),

    /// The call timed out with the outcome unknown. The transaction may or
    /// may not have landed; callers must resolve the ambiguity through
    /// `has_voter_voted` before retrying.
    #[error("ledger call timed out")]
    Timeout,
}

impl LedgerError {
    /// Whether a retry may be attempted at all. Retrying after a timeout
    /// additionally requires an authoritative `has_voter_voted` check first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Timeout)
    }
}
