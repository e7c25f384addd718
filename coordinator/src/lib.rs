//! Vote submission coordination.
//!
//! The coordinator drives a ballot through five steps — validate, check
//! duplicate, commit to ledger, write the relational mirror, audit — and
//! owns the failure semantics between the two stores: the ledger commit is
//! the irreversible step, the mirror write is a repeatable projection that
//! [`Reconciler`] can replay from ledger receipts.

pub mod ballot;
pub mod error;
pub mod reconcile;
pub mod submit;

pub use ballot::{Ballot, BallotEntry};
pub use error::SubmitError;
pub use reconcile::{Reconciler, RepairQueue, RepairSummary, RepairTask};
pub use submit::{CommittedEntry, Coordinator, CoordinatorStore, SubmitOutcome, UnmirroredEntry};
