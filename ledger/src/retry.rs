//! Retry discipline for ledger submissions.
//!
//! The rules here are load-bearing for exactly-once semantics:
//!
//! - `Rejected` is terminal and never retried.
//! - `Unreachable` definitively did not land; retry up to the limit.
//! - `Timeout` is ambiguous; before any retry the policy asks the ledger
//!   `has_voter_voted`. If the vote landed, the original receipt (or a
//!   deterministic fallback) is returned instead of submitting again.

use crate::client::{fallback_vote_hash, LedgerClient, LedgerReceipt, VoteData};
use crate::LedgerError;
use std::time::Duration;
use tracing::{debug, warn};

/// Timeout and retry configuration for ledger calls.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Per-call timeout applied to every ledger operation.
    pub call_timeout: Duration,
    /// Maximum number of re-submissions after retryable failures.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            max_retries: 2,
        }
    }
}

impl RetryPolicy {
    pub fn new(call_timeout: Duration, max_retries: u32) -> Self {
        Self {
            call_timeout,
            max_retries,
        }
    }

    /// Submit one vote, retrying only when it is provably safe to do so.
    pub async fn submit_with_retry<L: LedgerClient>(
        &self,
        ledger: &L,
        vote: &VoteData,
    ) -> Result<LedgerReceipt, LedgerError> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let outcome = self.call(ledger.submit_vote(vote)).await;
            let err = match outcome {
                Ok(receipt) => return Ok(receipt),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            // Ambiguity resolution: a timed-out submit may have landed.
            // Never submit again until the ledger says this exact entry
            // did not.
            if self.resolve_landed(ledger, vote).await? {
                debug!(voter = %vote.voter, election = %vote.election,
                       "submit resolved as committed after {err}");
                return self.receipt_or_fallback(ledger, vote).await;
            }

            if attempts > self.max_retries {
                warn!(voter = %vote.voter, election = %vote.election,
                      attempts, "ledger submit exhausted retries");
                return Err(err);
            }
            debug!(voter = %vote.voter, election = %vote.election,
                   attempts, "retrying ledger submit after {err}");
        }
    }

    /// Authoritative has-voted check with the policy timeout applied.
    pub async fn has_voted<L: LedgerClient>(
        &self,
        ledger: &L,
        voter: &votechain_types::VoterId,
        election: votechain_types::ElectionId,
    ) -> Result<bool, LedgerError> {
        self.call(ledger.has_voter_voted(voter, election)).await
    }

    async fn resolve_landed<L: LedgerClient>(
        &self,
        ledger: &L,
        vote: &VoteData,
    ) -> Result<bool, LedgerError> {
        self.call(ledger.has_vote_landed(&vote.voter, vote.election, vote.position))
            .await
    }

    async fn receipt_or_fallback<L: LedgerClient>(
        &self,
        ledger: &L,
        vote: &VoteData,
    ) -> Result<LedgerReceipt, LedgerError> {
        let found = self
            .call(ledger.find_receipt(&vote.voter, vote.election, vote.position))
            .await?;
        Ok(found.unwrap_or_else(|| LedgerReceipt {
            vote_id: format!("VOTE-{}-{}", vote.election, vote.voter),
            tx_hash: fallback_vote_hash(vote),
        }))
    }

    async fn call<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, LedgerError>>,
    ) -> Result<T, LedgerError> {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(LedgerError::Timeout),
        }
    }
}
