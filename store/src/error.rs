use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// A vote row already exists for this (election, voter) pair.
    ///
    /// Distinct from [`StoreError::Duplicate`] because the unique constraint
    /// on votes is the serialization point for concurrent submissions and
    /// callers must treat it as "already voted", not as a backend fault.
    #[error("vote already recorded for voter {voter} in election {election}")]
    DuplicateVote { voter: String, election: String },

    #[error("foreign key violation: {0}")]
    ForeignKey(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
