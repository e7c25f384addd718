//! The audit recorder — the single write path into the log.

use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::warn;
use votechain_store::audit::{AuditLogEntry, AuditStore, NewAuditEntry};
use votechain_store::StoreError;
use votechain_types::{ActorType, AuditAction, AuditStatus, Clock, ElectionId, TxHash, VoterId};

/// Writes audit entries, stamping them with the shared clock.
///
/// Mutating operations call [`AuditRecorder::record`] and propagate its
/// error; operations whose primary outcome must not be masked by an audit
/// failure (vote submission) use [`AuditRecorder::record_best_effort`].
pub struct AuditRecorder<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: AuditStore> AuditRecorder<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Append one entry. The entry's timestamp is assigned here.
    pub fn record(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, StoreError> {
        self.store.append(entry)
    }

    /// Append one entry, logging instead of propagating on failure.
    ///
    /// Used where the primary operation already completed (e.g. the ledger
    /// commit) and an audit-store hiccup must not turn success into error.
    pub fn record_best_effort(&self, entry: NewAuditEntry) {
        if let Err(e) = self.store.append(entry) {
            warn!("audit append failed (entry dropped from log): {e}");
        }
    }

    /// A CREATE entry for a freshly inserted record.
    pub fn create_entry(
        &self,
        table_name: &str,
        record_id: &str,
        actor_id: &str,
        actor_type: ActorType,
        after: Value,
    ) -> NewAuditEntry {
        NewAuditEntry {
            action: AuditAction::Create,
            table_name: table_name.into(),
            record_id: record_id.into(),
            actor_id: actor_id.into(),
            actor_type,
            before_value: None,
            after_value: Some(after),
            diff: None,
            ledger_tx_hash: None,
            status: AuditStatus::Success,
            error_message: None,
            timestamp: self.clock.now(),
        }
    }

    /// An UPDATE entry; the per-field diff is computed here.
    pub fn update_entry(
        &self,
        table_name: &str,
        record_id: &str,
        actor_id: &str,
        actor_type: ActorType,
        before: Value,
        after: Value,
    ) -> NewAuditEntry {
        let diff = diff_values(&before, &after);
        NewAuditEntry {
            action: AuditAction::Update,
            table_name: table_name.into(),
            record_id: record_id.into(),
            actor_id: actor_id.into(),
            actor_type,
            before_value: Some(before),
            after_value: Some(after),
            diff,
            ledger_tx_hash: None,
            status: AuditStatus::Success,
            error_message: None,
            timestamp: self.clock.now(),
        }
    }

    /// A DELETE entry preserving the removed record.
    pub fn delete_entry(
        &self,
        table_name: &str,
        record_id: &str,
        actor_id: &str,
        actor_type: ActorType,
        before: Value,
    ) -> NewAuditEntry {
        NewAuditEntry {
            action: AuditAction::Delete,
            table_name: table_name.into(),
            record_id: record_id.into(),
            actor_id: actor_id.into(),
            actor_type,
            before_value: Some(before),
            after_value: None,
            diff: None,
            ledger_tx_hash: None,
            status: AuditStatus::Success,
            error_message: None,
            timestamp: self.clock.now(),
        }
    }

    /// A VOTE_SUBMIT entry. One is written per ballot entry, success or
    /// failure, carrying the ledger transaction hash when one exists.
    pub fn vote_entry(
        &self,
        voter: &VoterId,
        election: ElectionId,
        ledger_tx_hash: Option<TxHash>,
        status: AuditStatus,
        error_message: Option<String>,
    ) -> NewAuditEntry {
        NewAuditEntry {
            action: AuditAction::VoteSubmit,
            table_name: "votes".into(),
            record_id: format!("{voter}-{election}"),
            actor_id: voter.to_string(),
            actor_type: ActorType::Voter,
            before_value: None,
            after_value: None,
            diff: None,
            ledger_tx_hash,
            status,
            error_message,
            timestamp: self.clock.now(),
        }
    }
}

/// Per-field `{from, to}` map of the keys that changed between two object
/// snapshots. `None` when nothing changed or either side is not an object.
pub fn diff_values(before: &Value, after: &Value) -> Option<Value> {
    let (before_map, after_map) = match (before.as_object(), after.as_object()) {
        (Some(b), Some(a)) => (b, a),
        _ => return None,
    };

    let mut changes = Map::new();
    let keys: std::collections::BTreeSet<&String> =
        before_map.keys().chain(after_map.keys()).collect();
    for key in keys {
        let old = before_map.get(key).unwrap_or(&Value::Null);
        let new = after_map.get(key).unwrap_or(&Value::Null);
        if old != new {
            changes.insert(key.clone(), json!({ "from": old, "to": new }));
        }
    }

    if changes.is_empty() {
        None
    } else {
        Some(Value::Object(changes))
    }
}
