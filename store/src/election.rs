//! Election and position storage traits and records.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use votechain_types::{ElectionId, ElectionStatus, ElectionType, PositionId, Timestamp};

/// An election with its voting window and ordered position links.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    pub id: ElectionId,
    pub title: String,
    pub description: String,
    pub status: ElectionStatus,
    pub election_type: ElectionType,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub year: u16,
    /// Positions contested in this election, in ballot order.
    pub positions: Vec<PositionId>,
}

impl Election {
    /// Whether the election is accepting ballots at `now`: status Active and
    /// `now` inside the inclusive `[start_date, end_date]` window.
    pub fn is_open_at(&self, now: Timestamp) -> bool {
        self.status.accepts_votes() && now.is_within(self.start_date, self.end_date)
    }
}

/// An elected position (President, Mayor, Councillor, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub name: String,
}

/// Trait for election and position storage operations.
pub trait ElectionStore {
    fn get_election(&self, id: ElectionId) -> Result<Election, StoreError>;
    fn put_election(&self, election: &Election) -> Result<(), StoreError>;
    fn election_exists(&self, id: ElectionId) -> Result<bool, StoreError>;
    /// All elections with the given status, newest start date first.
    fn elections_by_status(&self, status: ElectionStatus) -> Result<Vec<Election>, StoreError>;

    fn get_position(&self, id: PositionId) -> Result<Position, StoreError>;
    fn put_position(&self, position: &Position) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn election(status: ElectionStatus, start: u64, end: u64) -> Election {
        Election {
            id: ElectionId::new(1),
            title: "General Election".into(),
            description: String::new(),
            status,
            election_type: ElectionType::General,
            start_date: Timestamp::new(start),
            end_date: Timestamp::new(end),
            year: 2026,
            positions: vec![],
        }
    }

    #[test]
    fn open_only_inside_window() {
        let e = election(ElectionStatus::Active, 100, 200);
        assert!(!e.is_open_at(Timestamp::new(99)));
        assert!(e.is_open_at(Timestamp::new(100)));
        assert!(e.is_open_at(Timestamp::new(200)));
        assert!(!e.is_open_at(Timestamp::new(201)));
    }

    #[test]
    fn draft_and_completed_never_open() {
        assert!(!election(ElectionStatus::Draft, 100, 200).is_open_at(Timestamp::new(150)));
        assert!(!election(ElectionStatus::Completed, 100, 200).is_open_at(Timestamp::new(150)));
    }
}
