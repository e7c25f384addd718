//! State enums for elections and audit entries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an election.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    /// Being configured; not visible to voters.
    Draft,
    /// Open for voting (subject to the start/end window).
    Active,
    /// Closed; final results may be declared.
    Completed,
}

impl ElectionStatus {
    /// Whether ballots may be accepted in this state.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for ElectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

/// Eligibility rule of an election.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionType {
    /// Open to every registered voter.
    General,
    /// Restricted to voters sharing a constituency with at least one candidate.
    Scoped,
}

/// Kind of state-changing operation recorded in the audit log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Login,
    Logout,
    VoteSubmit,
    /// A transaction submitted to the external ledger.
    LedgerTx,
}

impl AuditAction {
    /// Actions surfaced by the change-notification feed.
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Create | Self::Update | Self::Delete | Self::VoteSubmit
        )
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::VoteSubmit => "VOTE_SUBMIT",
            Self::LedgerTx => "LEDGER_TX",
        };
        write!(f, "{s}")
    }
}

/// Who performed an audited operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    Management,
    Voter,
    System,
}

/// Final status of an audited operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Success,
    Failed,
    Pending,
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Management => "management",
            Self::Voter => "voter",
            Self::System => "system",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Pending => "pending",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_elections_accept_votes() {
        assert!(!ElectionStatus::Draft.accepts_votes());
        assert!(ElectionStatus::Active.accepts_votes());
        assert!(!ElectionStatus::Completed.accepts_votes());
    }

    #[test]
    fn change_feed_actions() {
        assert!(AuditAction::Create.is_change());
        assert!(AuditAction::VoteSubmit.is_change());
        assert!(!AuditAction::Login.is_change());
        assert!(!AuditAction::LedgerTx.is_change());
    }

    #[test]
    fn audit_action_serializes_screaming_snake() {
        let json = serde_json::to_string(&AuditAction::VoteSubmit).unwrap();
        assert_eq!(json, "\"VOTE_SUBMIT\"");
    }
}
