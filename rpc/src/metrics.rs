//! Prometheus metrics for the vote subsystem.
//!
//! [`VoteMetrics`] owns a dedicated [`Registry`] that the `/metrics`
//! endpoint encodes into the Prometheus text exposition format. It lives
//! next to the handlers because the RPC surface is the only entry point
//! for submissions.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Histogram, HistogramOpts, IntCounter, IntGauge, Opts,
    Registry,
};

/// Central collection of vote subsystem Prometheus metrics.
pub struct VoteMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Total ballots received for submission.
    pub ballots_received: IntCounter,
    /// Total ballot entries committed to the ledger.
    pub votes_committed: IntCounter,
    /// Total ballots rejected before the ledger phase (validation,
    /// duplicates, unknown voters).
    pub ballots_rejected: IntCounter,
    /// Total ledger-phase failures that aborted a ballot.
    pub ledger_failures: IntCounter,
    /// Total mirror rows replayed by reconciliation.
    pub mirror_repairs: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Current number of elections accepting votes.
    pub active_elections: IntGauge,
    /// Current number of repair tasks waiting for the next pass.
    pub pending_repairs: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// End-to-end ballot submission time, in milliseconds.
    pub submit_time_ms: Histogram,
}

impl VoteMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let ballots_received = register_int_counter_with_registry!(
            Opts::new("votechain_ballots_received_total", "Total ballots received"),
            registry
        )
        .expect("failed to register ballots_received counter");

        let votes_committed = register_int_counter_with_registry!(
            Opts::new(
                "votechain_votes_committed_total",
                "Total ballot entries committed to the ledger"
            ),
            registry
        )
        .expect("failed to register votes_committed counter");

        let ballots_rejected = register_int_counter_with_registry!(
            Opts::new(
                "votechain_ballots_rejected_total",
                "Total ballots rejected before the ledger phase"
            ),
            registry
        )
        .expect("failed to register ballots_rejected counter");

        let ledger_failures = register_int_counter_with_registry!(
            Opts::new(
                "votechain_ledger_failures_total",
                "Total ledger-phase failures that aborted a ballot"
            ),
            registry
        )
        .expect("failed to register ledger_failures counter");

        let mirror_repairs = register_int_counter_with_registry!(
            Opts::new(
                "votechain_mirror_repairs_total",
                "Total mirror rows replayed by reconciliation"
            ),
            registry
        )
        .expect("failed to register mirror_repairs counter");

        let active_elections = register_int_gauge_with_registry!(
            Opts::new(
                "votechain_active_elections",
                "Current number of elections accepting votes"
            ),
            registry
        )
        .expect("failed to register active_elections gauge");

        let pending_repairs = register_int_gauge_with_registry!(
            Opts::new(
                "votechain_pending_repairs",
                "Current number of queued repair tasks"
            ),
            registry
        )
        .expect("failed to register pending_repairs gauge");

        // Exponential buckets covering 1 ms → ~16 s.
        let submit_time_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "votechain_submit_time_ms",
                "Ballot submission time in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(1.0, 2.0, 15).unwrap()),
            registry
        )
        .expect("failed to register submit_time_ms histogram");

        Self {
            registry,
            ballots_received,
            votes_committed,
            ballots_rejected,
            ledger_failures,
            mirror_repairs,
            active_elections,
            pending_repairs,
            submit_time_ms,
        }
    }
}

impl Default for VoteMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_increment() {
        let metrics = VoteMetrics::new();
        assert_eq!(metrics.ballots_received.get(), 0);
        metrics.ballots_received.inc();
        metrics.votes_committed.inc_by(3);
        assert_eq!(metrics.ballots_received.get(), 1);
        assert_eq!(metrics.votes_committed.get(), 3);
    }

    #[test]
    fn registry_gathers_every_metric_family() {
        let metrics = VoteMetrics::new();
        metrics.ballots_received.inc();
        let families = metrics.registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "votechain_ballots_received_total"));
        assert!(families
            .iter()
            .any(|f| f.get_name() == "votechain_submit_time_ms"));
    }
}
