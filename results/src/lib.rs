//! Result aggregation over the relational vote mirror.
//!
//! Tallies are computed exclusively from mirror rows — never by querying
//! the ledger, which offers no efficient aggregate reads. During an
//! in-flight mirror write the counts are eventually consistent; live
//! results are explicitly a moving picture.

pub mod tally;

pub use tally::{
    final_results, live_results, tally_election, CandidateTally, ElectionResult, OverallStats,
    PositionResult, ResultsReport,
};
