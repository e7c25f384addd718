//! Filtered, paginated reads over the audit log, plus grouped statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use votechain_store::audit::{AuditLogEntry, AuditStore};
use votechain_store::StoreError;
use votechain_types::{ActorType, AuditAction, AuditStatus, Timestamp};

/// Maximum page size, enforced server-side regardless of what the client asks for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default page size when the client does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Pagination parameters for list queries.
///
/// `page` below 1 normalises to 1; `limit` clamps to `[1, MAX_PAGE_SIZE]`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageRequest {
    pub fn effective_page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: None,
            limit: None,
        }
    }
}

/// One page of results plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

/// Filter over audit log entries. All fields conjunctive; `None` matches all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditFilter {
    pub action: Option<AuditAction>,
    pub table_name: Option<String>,
    pub actor_id: Option<String>,
    pub actor_type: Option<ActorType>,
    pub status: Option<AuditStatus>,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl AuditFilter {
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        if let Some(ref table) = self.table_name {
            if &entry.table_name != table {
                return false;
            }
        }
        if let Some(ref actor) = self.actor_id {
            if &entry.actor_id != actor {
                return false;
            }
        }
        if let Some(actor_type) = self.actor_type {
            if entry.actor_type != actor_type {
                return false;
            }
        }
        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }
        if let Some(start) = self.start {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if entry.timestamp > end {
                return false;
            }
        }
        true
    }
}

/// Query the log: filter, sort newest first, page.
pub fn query<S: AuditStore>(
    store: &S,
    filter: &AuditFilter,
    page: PageRequest,
) -> Result<Page<AuditLogEntry>, StoreError> {
    let mut matching: Vec<AuditLogEntry> = store
        .iter_entries()?
        .into_iter()
        .filter(|e| filter.matches(e))
        .collect();
    matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

    let total = matching.len() as u64;
    let limit = page.effective_limit();
    let page_no = page.effective_page();
    let total_pages = total.div_ceil(limit as u64).max(1);

    let skip = ((page_no as u64 - 1) * limit as u64) as usize;
    let items = matching
        .into_iter()
        .skip(skip)
        .take(limit as usize)
        .collect();

    Ok(Page {
        items,
        page: page_no,
        limit,
        total,
        total_pages,
    })
}

/// A grouped count in a statistics response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: u64,
}

/// Grouped counts over the log for a time window.
#[derive(Debug, Clone, Serialize)]
pub struct AuditStats {
    pub total: u64,
    pub by_action: Vec<GroupCount>,
    pub by_table: Vec<GroupCount>,
    pub by_status: Vec<GroupCount>,
}

/// Compute grouped statistics over entries within `[start, end]` (either
/// bound optional). Pure read-side projection.
pub fn statistics<S: AuditStore>(
    store: &S,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
) -> Result<AuditStats, StoreError> {
    let window = AuditFilter {
        start,
        end,
        ..Default::default()
    };
    let mut total = 0u64;
    let mut by_action: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_table: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_status: BTreeMap<String, u64> = BTreeMap::new();

    for entry in store.iter_entries()? {
        if !window.matches(&entry) {
            continue;
        }
        total += 1;
        *by_action.entry(entry.action.to_string()).or_default() += 1;
        *by_table.entry(entry.table_name.clone()).or_default() += 1;
        *by_status.entry(entry.status.to_string()).or_default() += 1;
    }

    let collect = |map: BTreeMap<String, u64>| {
        map.into_iter()
            .map(|(key, count)| GroupCount { key, count })
            .collect()
    };

    Ok(AuditStats {
        total,
        by_action: collect(by_action),
        by_table: collect(by_table),
        by_status: collect(by_status),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use votechain_store::audit::NewAuditEntry;
    use votechain_store_memory::MemoryStore;

    fn entry(action: AuditAction, table: &str, status: AuditStatus, ts: u64) -> NewAuditEntry {
        NewAuditEntry {
            action,
            table_name: table.into(),
            record_id: "r".into(),
            actor_id: "a".into(),
            actor_type: ActorType::System,
            before_value: None,
            after_value: None,
            diff: None,
            ledger_tx_hash: None,
            status,
            error_message: None,
            timestamp: Timestamp::new(ts),
        }
    }

    fn seeded() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for i in 0..150 {
            store
                .append(entry(
                    AuditAction::Create,
                    "elections",
                    AuditStatus::Success,
                    1_000 + i,
                ))
                .unwrap();
        }
        store
            .append(entry(
                AuditAction::VoteSubmit,
                "votes",
                AuditStatus::Failed,
                2_000,
            ))
            .unwrap();
        store
    }

    #[test]
    fn limit_is_clamped_to_max() {
        let store = seeded();
        let page = query(
            store.as_ref(),
            &AuditFilter::default(),
            PageRequest {
                page: Some(1),
                limit: Some(500),
            },
        )
        .unwrap();
        assert_eq!(page.limit, MAX_PAGE_SIZE);
        assert_eq!(page.items.len(), MAX_PAGE_SIZE as usize);
        assert_eq!(page.total, 151);
    }

    #[test]
    fn page_zero_normalises_to_one() {
        let store = seeded();
        let first = query(
            store.as_ref(),
            &AuditFilter::default(),
            PageRequest {
                page: Some(0),
                limit: Some(10),
            },
        )
        .unwrap();
        assert_eq!(first.page, 1);
        // Newest first: the failed vote entry at t=2000 leads.
        assert_eq!(first.items[0].action, AuditAction::VoteSubmit);
    }

    #[test]
    fn filters_compose_conjunctively() {
        let store = seeded();
        let filter = AuditFilter {
            table_name: Some("votes".into()),
            status: Some(AuditStatus::Failed),
            ..Default::default()
        };
        let page = query(store.as_ref(), &filter, PageRequest::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].table_name, "votes");
    }

    #[test]
    fn time_window_filters_entries() {
        let store = seeded();
        let filter = AuditFilter {
            start: Some(Timestamp::new(1_100)),
            end: Some(Timestamp::new(1_149)),
            ..Default::default()
        };
        let page = query(store.as_ref(), &filter, PageRequest::default()).unwrap();
        assert_eq!(page.total, 50);
    }

    #[test]
    fn statistics_group_counts() {
        let store = seeded();
        let stats = statistics(store.as_ref(), None, None).unwrap();
        assert_eq!(stats.total, 151);
        assert!(stats
            .by_action
            .contains(&GroupCount { key: "CREATE".into(), count: 150 }));
        assert!(stats
            .by_status
            .contains(&GroupCount { key: "failed".into(), count: 1 }));
        assert!(stats
            .by_table
            .contains(&GroupCount { key: "votes".into(), count: 1 }));
    }
}
