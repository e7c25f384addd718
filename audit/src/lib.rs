//! Append-only audit log and change notification feed.
//!
//! Every state-changing operation in the system produces exactly one audit
//! entry before returning success to its caller; the recorder here is the
//! single cross-cutting point through which those entries are written, so
//! audit coverage is structural rather than per-call-site. The read side
//! is a set of pure projections over the log: filtered pages, the change
//! notification feed, and grouped statistics. None of them mutate the log.

pub mod feed;
pub mod query;
pub mod recorder;

pub use feed::{
    change_statistics, changes_by_actor, changes_by_table, critical_changes, recent_changes,
    ChangeNotification, ChangeStatistics,
};
pub use query::{query, statistics, AuditFilter, AuditStats, GroupCount, Page, PageRequest};
pub use recorder::{diff_values, AuditRecorder};
