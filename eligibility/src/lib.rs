//! Geographic hierarchy resolution and election eligibility.
//!
//! Resolves a voter to their full ancestor chain (ward → constituency →
//! district → province) and decides which elections the voter may see and
//! vote in. The eligibility predicate itself is pure: it runs over
//! already-loaded data and performs no storage or network calls.

pub mod resolver;

pub use resolver::{
    eligible_elections, is_eligible, resolve_chain, roster_for, ElectionRoster, PositionSlate,
    RosterCandidate, VoterChain,
};
