//! Audit log storage trait and records.
//!
//! The audit log is append-only: entries are never updated or deleted, and
//! the trait deliberately offers no mutation beyond `append`.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use votechain_types::{ActorType, AuditAction, AuditStatus, Timestamp, TxHash};

/// An immutable audit record, as persisted.
///
/// `id` is the store-assigned monotonically increasing sequence number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: u64,
    pub action: AuditAction,
    pub table_name: String,
    pub record_id: String,
    pub actor_id: String,
    pub actor_type: ActorType,
    /// Snapshot of the record before the operation, if applicable.
    pub before_value: Option<serde_json::Value>,
    /// Snapshot of the record after the operation, if applicable.
    pub after_value: Option<serde_json::Value>,
    /// Per-field `{from, to}` map computed from the snapshots.
    pub diff: Option<serde_json::Value>,
    pub ledger_tx_hash: Option<TxHash>,
    pub status: AuditStatus,
    pub error_message: Option<String>,
    pub timestamp: Timestamp,
}

/// An audit record as submitted for appending; the store assigns `id`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub table_name: String,
    pub record_id: String,
    pub actor_id: String,
    pub actor_type: ActorType,
    pub before_value: Option<serde_json::Value>,
    pub after_value: Option<serde_json::Value>,
    pub diff: Option<serde_json::Value>,
    pub ledger_tx_hash: Option<TxHash>,
    pub status: AuditStatus,
    pub error_message: Option<String>,
    pub timestamp: Timestamp,
}

/// Trait for append-only audit log storage.
pub trait AuditStore {
    /// Append an entry, returning it with its assigned sequence id.
    fn append(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, StoreError>;

    /// All entries, oldest first. Read-side projections filter and page on
    /// top of this; backends with real indices may override the filtered
    /// queries in `votechain-audit` instead.
    fn iter_entries(&self) -> Result<Vec<AuditLogEntry>, StoreError>;

    fn entry_count(&self) -> Result<u64, StoreError> {
        self.iter_entries().map(|v| v.len() as u64)
    }
}
