//! The change notification feed — read-side projections over the audit
//! log consumed by dashboards.

use serde::Serialize;
use votechain_store::audit::{AuditLogEntry, AuditStore};
use votechain_store::StoreError;
use votechain_types::{AuditAction, AuditStatus, Timestamp};

/// A change entry as surfaced to dashboards, with a generated message.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeNotification {
    pub id: u64,
    pub action: AuditAction,
    pub table_name: String,
    pub record_id: String,
    pub actor_id: String,
    pub timestamp: Timestamp,
    pub diff: Option<serde_json::Value>,
    pub message: String,
}

impl ChangeNotification {
    fn from_entry(entry: AuditLogEntry) -> Self {
        let message = describe(&entry);
        Self {
            id: entry.id,
            action: entry.action,
            table_name: entry.table_name,
            record_id: entry.record_id,
            actor_id: entry.actor_id,
            timestamp: entry.timestamp,
            diff: entry.diff,
            message,
        }
    }
}

/// Human-readable one-liner for a change entry.
fn describe(entry: &AuditLogEntry) -> String {
    let actor = &entry.actor_id;
    let table = &entry.table_name;
    let record = &entry.record_id;
    match entry.action {
        AuditAction::Create => format!("{actor} created a new {table} record ({record})"),
        AuditAction::Update => {
            let fields = entry
                .diff
                .as_ref()
                .and_then(|d| d.as_object())
                .map(|m| m.len())
                .unwrap_or(0);
            format!("{actor} updated {table} record ({record}) - {fields} field(s) changed")
        }
        AuditAction::Delete => format!("{actor} deleted {table} record ({record})"),
        AuditAction::VoteSubmit => format!("{actor} submitted a vote ({record})"),
        AuditAction::LedgerTx => {
            format!("{actor} performed a ledger transaction for {table} ({record})")
        }
        other => format!("{actor} performed {other} on {table} ({record})"),
    }
}

/// Whether an entry belongs in the critical feed: deletions, failed
/// operations, and vote submissions are all high-impact.
fn is_critical(entry: &AuditLogEntry) -> bool {
    entry.action == AuditAction::Delete
        || entry.action == AuditAction::VoteSubmit
        || entry.status == AuditStatus::Failed
}

fn collect<S, F>(store: &S, keep: F, limit: Option<usize>) -> Result<Vec<ChangeNotification>, StoreError>
where
    S: AuditStore,
    F: Fn(&AuditLogEntry) -> bool,
{
    let mut entries: Vec<AuditLogEntry> = store
        .iter_entries()?
        .into_iter()
        .filter(|e| keep(e))
        .collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    Ok(entries.into_iter().map(ChangeNotification::from_entry).collect())
}

/// Change-feed entries newer than `now - minutes`, newest first, at most
/// `limit` rows. Only change actions (create/update/delete/vote) appear.
pub fn recent_changes<S: AuditStore>(
    store: &S,
    now: Timestamp,
    minutes: u64,
    limit: usize,
) -> Result<Vec<ChangeNotification>, StoreError> {
    let since = now.minus_minutes(minutes);
    collect(
        store,
        |e| e.action.is_change() && e.timestamp >= since,
        Some(limit),
    )
}

/// All of one actor's entries within the last `hours`, newest first.
pub fn changes_by_actor<S: AuditStore>(
    store: &S,
    now: Timestamp,
    actor_id: &str,
    hours: u64,
) -> Result<Vec<ChangeNotification>, StoreError> {
    let since = now.minus_hours(hours);
    collect(
        store,
        |e| e.actor_id == actor_id && e.timestamp >= since,
        None,
    )
}

/// All entries touching one table within the last `hours`, newest first.
pub fn changes_by_table<S: AuditStore>(
    store: &S,
    now: Timestamp,
    table_name: &str,
    hours: u64,
) -> Result<Vec<ChangeNotification>, StoreError> {
    let since = now.minus_hours(hours);
    collect(
        store,
        |e| e.table_name == table_name && e.timestamp >= since,
        None,
    )
}

/// High-impact entries within the last `hours`, newest first.
pub fn critical_changes<S: AuditStore>(
    store: &S,
    now: Timestamp,
    hours: u64,
) -> Result<Vec<ChangeNotification>, StoreError> {
    let since = now.minus_hours(hours);
    collect(store, |e| is_critical(e) && e.timestamp >= since, None)
}

/// Summary counts over the change feed for the last `hours`.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeStatistics {
    pub total_changes: u64,
    pub by_action: Vec<(String, u64)>,
    pub by_actor: Vec<(String, u64)>,
    pub by_table: Vec<(String, u64)>,
    pub critical: u64,
    pub window_hours: u64,
}

pub fn change_statistics<S: AuditStore>(
    store: &S,
    now: Timestamp,
    hours: u64,
) -> Result<ChangeStatistics, StoreError> {
    use std::collections::BTreeMap;
    let since = now.minus_hours(hours);

    let mut total = 0u64;
    let mut by_action: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_actor: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_table: BTreeMap<String, u64> = BTreeMap::new();
    let mut critical = 0u64;

    for entry in store.iter_entries()? {
        if entry.timestamp < since {
            continue;
        }
        if is_critical(&entry) {
            critical += 1;
        }
        if !entry.action.is_change() {
            continue;
        }
        total += 1;
        *by_action.entry(entry.action.to_string()).or_default() += 1;
        *by_actor.entry(entry.actor_id.clone()).or_default() += 1;
        *by_table.entry(entry.table_name.clone()).or_default() += 1;
    }

    Ok(ChangeStatistics {
        total_changes: total,
        by_action: by_action.into_iter().collect(),
        by_actor: by_actor.into_iter().collect(),
        by_table: by_table.into_iter().collect(),
        critical,
        window_hours: hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use votechain_store::audit::NewAuditEntry;
    use votechain_store_memory::MemoryStore;
    use votechain_types::ActorType;

    fn append(
        store: &MemoryStore,
        action: AuditAction,
        table: &str,
        actor: &str,
        status: AuditStatus,
        ts: u64,
    ) {
        store
            .append(NewAuditEntry {
                action,
                table_name: table.into(),
                record_id: "r".into(),
                actor_id: actor.into(),
                actor_type: ActorType::System,
                before_value: None,
                after_value: None,
                diff: None,
                ledger_tx_hash: None,
                status,
                error_message: None,
                timestamp: Timestamp::new(ts),
            })
            .unwrap();
    }

    #[test]
    fn recent_changes_respect_window_and_action_set() {
        let store = MemoryStore::new();
        let now = Timestamp::new(10_000);
        append(&store, AuditAction::Create, "wards", "a", AuditStatus::Success, 9_950);
        append(&store, AuditAction::Login, "auth", "a", AuditStatus::Success, 9_960);
        append(&store, AuditAction::Delete, "wards", "a", AuditStatus::Success, 5_000);

        let changes = recent_changes(&store, now, 60, 50).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, AuditAction::Create);
    }

    #[test]
    fn critical_includes_deletes_failures_and_votes() {
        let store = MemoryStore::new();
        let now = Timestamp::new(10_000);
        append(&store, AuditAction::Delete, "wards", "a", AuditStatus::Success, 9_000);
        append(&store, AuditAction::Update, "wards", "a", AuditStatus::Failed, 9_100);
        append(&store, AuditAction::VoteSubmit, "votes", "v", AuditStatus::Success, 9_200);
        append(&store, AuditAction::Update, "wards", "a", AuditStatus::Success, 9_300);

        let critical = critical_changes(&store, now, 24).unwrap();
        assert_eq!(critical.len(), 3);
        // Newest first.
        assert_eq!(critical[0].action, AuditAction::VoteSubmit);
    }

    #[test]
    fn messages_are_human_readable() {
        let store = MemoryStore::new();
        append(&store, AuditAction::Create, "candidates", "admin", AuditStatus::Success, 100);
        let changes = recent_changes(&store, Timestamp::new(100), 60, 10).unwrap();
        assert_eq!(
            changes[0].message,
            "admin created a new candidates record (r)"
        );
    }

    #[test]
    fn statistics_count_changes_and_critical() {
        let store = MemoryStore::new();
        let now = Timestamp::new(10_000);
        append(&store, AuditAction::Create, "wards", "a", AuditStatus::Success, 9_000);
        append(&store, AuditAction::Delete, "wards", "b", AuditStatus::Success, 9_100);
        append(&store, AuditAction::Login, "auth", "a", AuditStatus::Failed, 9_200);

        let stats = change_statistics(&store, now, 24).unwrap();
        // Login is not a change action but its failure is critical.
        assert_eq!(stats.total_changes, 2);
        assert_eq!(stats.critical, 2);
        assert_eq!(stats.by_actor.len(), 2);
    }
}
