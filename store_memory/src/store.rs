//! The in-memory store — one `Mutex`-guarded map per logical table.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use votechain_store::audit::{AuditLogEntry, AuditStore, NewAuditEntry};
use votechain_store::candidate::{Candidate, CandidateStore, Party};
use votechain_store::election::{Election, ElectionStore, Position};
use votechain_store::geography::{Constituency, District, GeographyStore, Province, Ward};
use votechain_store::vote::{VoteRecord, VoteStore};
use votechain_store::voter::{Voter, VoterStore};
use votechain_store::StoreError;
use votechain_types::{
    CandidateId, ConstituencyCode, DistrictCode, ElectionId, ElectionStatus, PartyId, PositionId,
    ProvinceCode, VoterId, WardCode,
};

/// An in-memory implementation of every storage trait.
pub struct MemoryStore {
    voters: Mutex<HashMap<VoterId, Voter>>,
    wards: Mutex<HashMap<WardCode, Ward>>,
    constituencies: Mutex<HashMap<ConstituencyCode, Constituency>>,
    districts: Mutex<HashMap<DistrictCode, District>>,
    provinces: Mutex<HashMap<ProvinceCode, Province>>,
    elections: Mutex<HashMap<ElectionId, Election>>,
    positions: Mutex<HashMap<PositionId, Position>>,
    candidates: Mutex<Vec<Candidate>>,
    parties: Mutex<HashMap<PartyId, Party>>,
    /// Rows in insertion order plus the unique-key index. Both live behind
    /// one mutex so insert-if-absent is atomic.
    votes: Mutex<VoteTable>,
    audit: Mutex<AuditTable>,
}

#[derive(Default)]
struct VoteTable {
    rows: Vec<VoteRecord>,
    keys: HashSet<(ElectionId, VoterId, PositionId)>,
    /// Inserts to fail with a backend error before touching the table.
    fail_next: u32,
}

#[derive(Default)]
struct AuditTable {
    rows: Vec<AuditLogEntry>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            voters: Mutex::new(HashMap::new()),
            wards: Mutex::new(HashMap::new()),
            constituencies: Mutex::new(HashMap::new()),
            districts: Mutex::new(HashMap::new()),
            provinces: Mutex::new(HashMap::new()),
            elections: Mutex::new(HashMap::new()),
            positions: Mutex::new(HashMap::new()),
            candidates: Mutex::new(Vec::new()),
            parties: Mutex::new(HashMap::new()),
            votes: Mutex::new(VoteTable::default()),
            audit: Mutex::new(AuditTable {
                rows: Vec::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Make the next `n` vote inserts fail with a backend error, to
    /// exercise mirror-write failure handling in tests.
    pub fn fail_next_vote_inserts(&self, n: u32) {
        self.votes.lock().unwrap().fail_next = n;
    }
}

impl VoterStore for MemoryStore {
    fn get_voter(&self, id: &VoterId) -> Result<Voter, StoreError> {
        self.voters
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("voter {id}")))
    }

    fn put_voter(&self, voter: &Voter) -> Result<(), StoreError> {
        self.voters
            .lock()
            .unwrap()
            .insert(voter.id.clone(), voter.clone());
        Ok(())
    }

    fn voter_exists(&self, id: &VoterId) -> Result<bool, StoreError> {
        Ok(self.voters.lock().unwrap().contains_key(id))
    }

    fn voter_count(&self) -> Result<u64, StoreError> {
        Ok(self.voters.lock().unwrap().len() as u64)
    }
}

impl GeographyStore for MemoryStore {
    fn get_ward(&self, code: &WardCode) -> Result<Ward, StoreError> {
        self.wards
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("ward {code}")))
    }

    fn get_constituency(&self, code: &ConstituencyCode) -> Result<Constituency, StoreError> {
        self.constituencies
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("constituency {code}")))
    }

    fn get_district(&self, code: &DistrictCode) -> Result<District, StoreError> {
        self.districts
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("district {code}")))
    }

    fn get_province(&self, code: &ProvinceCode) -> Result<Province, StoreError> {
        self.provinces
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("province {code}")))
    }

    fn put_ward(&self, ward: &Ward) -> Result<(), StoreError> {
        self.wards
            .lock()
            .unwrap()
            .insert(ward.code.clone(), ward.clone());
        Ok(())
    }

    fn put_constituency(&self, constituency: &Constituency) -> Result<(), StoreError> {
        self.constituencies
            .lock()
            .unwrap()
            .insert(constituency.code.clone(), constituency.clone());
        Ok(())
    }

    fn put_district(&self, district: &District) -> Result<(), StoreError> {
        self.districts
            .lock()
            .unwrap()
            .insert(district.code.clone(), district.clone());
        Ok(())
    }

    fn put_province(&self, province: &Province) -> Result<(), StoreError> {
        self.provinces
            .lock()
            .unwrap()
            .insert(province.code.clone(), province.clone());
        Ok(())
    }
}

impl ElectionStore for MemoryStore {
    fn get_election(&self, id: ElectionId) -> Result<Election, StoreError> {
        self.elections
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("election {id}")))
    }

    fn put_election(&self, election: &Election) -> Result<(), StoreError> {
        self.elections
            .lock()
            .unwrap()
            .insert(election.id, election.clone());
        Ok(())
    }

    fn election_exists(&self, id: ElectionId) -> Result<bool, StoreError> {
        Ok(self.elections.lock().unwrap().contains_key(&id))
    }

    fn elections_by_status(&self, status: ElectionStatus) -> Result<Vec<Election>, StoreError> {
        let mut out: Vec<Election> = self
            .elections
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.status == status)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(out)
    }

    fn get_position(&self, id: PositionId) -> Result<Position, StoreError> {
        self.positions
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("position {id}")))
    }

    fn put_position(&self, position: &Position) -> Result<(), StoreError> {
        self.positions
            .lock()
            .unwrap()
            .insert(position.id, position.clone());
        Ok(())
    }
}

impl CandidateStore for MemoryStore {
    fn get_candidate(&self, id: CandidateId) -> Result<Candidate, StoreError> {
        self.candidates
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("candidate {id}")))
    }

    fn put_candidate(&self, candidate: &Candidate) -> Result<(), StoreError> {
        let mut candidates = self.candidates.lock().unwrap();
        match candidates.iter_mut().find(|c| c.id == candidate.id) {
            Some(existing) => *existing = candidate.clone(),
            None => candidates.push(candidate.clone()),
        }
        Ok(())
    }

    fn candidates_for_position(&self, position: PositionId) -> Result<Vec<Candidate>, StoreError> {
        Ok(self
            .candidates
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.position == position)
            .cloned()
            .collect())
    }

    fn get_party(&self, id: PartyId) -> Result<Party, StoreError> {
        self.parties
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("party {id}")))
    }

    fn put_party(&self, party: &Party) -> Result<(), StoreError> {
        self.parties
            .lock()
            .unwrap()
            .insert(party.id, party.clone());
        Ok(())
    }
}

impl VoteStore for MemoryStore {
    fn insert_vote(&self, vote: &VoteRecord) -> Result<(), StoreError> {
        let mut table = self.votes.lock().unwrap();
        if table.fail_next > 0 {
            table.fail_next -= 1;
            return Err(StoreError::Backend("injected vote insert failure".into()));
        }
        let key = (vote.election, vote.voter.clone(), vote.position);
        if !table.keys.insert(key) {
            return Err(StoreError::DuplicateVote {
                voter: vote.voter.to_string(),
                election: vote.election.to_string(),
            });
        }
        table.rows.push(vote.clone());
        Ok(())
    }

    fn votes_by_voter(
        &self,
        election: ElectionId,
        voter: &VoterId,
    ) -> Result<Vec<VoteRecord>, StoreError> {
        Ok(self
            .votes
            .lock()
            .unwrap()
            .rows
            .iter()
            .filter(|v| v.election == election && &v.voter == voter)
            .cloned()
            .collect())
    }

    fn votes_for_election(&self, election: ElectionId) -> Result<Vec<VoteRecord>, StoreError> {
        Ok(self
            .votes
            .lock()
            .unwrap()
            .rows
            .iter()
            .filter(|v| v.election == election)
            .cloned()
            .collect())
    }
}

impl AuditStore for MemoryStore {
    fn append(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, StoreError> {
        let mut table = self.audit.lock().unwrap();
        let stored = AuditLogEntry {
            id: table.next_id,
            action: entry.action,
            table_name: entry.table_name,
            record_id: entry.record_id,
            actor_id: entry.actor_id,
            actor_type: entry.actor_type,
            before_value: entry.before_value,
            after_value: entry.after_value,
            diff: entry.diff,
            ledger_tx_hash: entry.ledger_tx_hash,
            status: entry.status,
            error_message: entry.error_message,
            timestamp: entry.timestamp,
        };
        table.next_id += 1;
        table.rows.push(stored.clone());
        Ok(stored)
    }

    fn iter_entries(&self) -> Result<Vec<AuditLogEntry>, StoreError> {
        Ok(self.audit.lock().unwrap().rows.clone())
    }

    fn entry_count(&self) -> Result<u64, StoreError> {
        Ok(self.audit.lock().unwrap().rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votechain_types::{AuditAction, AuditStatus, ActorType, Timestamp, TxHash};

    fn vote(election: u64, voter: &str, position: u64) -> VoteRecord {
        VoteRecord {
            election: ElectionId::new(election),
            voter: VoterId::new(voter),
            candidate: CandidateId::new(1),
            position: PositionId::new(position),
            vote_hash: TxHash::new([7; 32]),
            cast_at: Timestamp::new(1000),
        }
    }

    #[test]
    fn duplicate_vote_insert_is_rejected() {
        let store = MemoryStore::new();
        store.insert_vote(&vote(1, "V-1", 10)).unwrap();
        let err = store.insert_vote(&vote(1, "V-1", 10)).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateVote { .. }));
        assert_eq!(store.vote_count(ElectionId::new(1)).unwrap(), 1);
    }

    #[test]
    fn same_voter_different_position_is_allowed() {
        let store = MemoryStore::new();
        store.insert_vote(&vote(1, "V-1", 10)).unwrap();
        store.insert_vote(&vote(1, "V-1", 11)).unwrap();
        assert!(store.has_voted(ElectionId::new(1), &VoterId::new("V-1")).unwrap());
        assert_eq!(store.vote_count(ElectionId::new(1)).unwrap(), 2);
    }

    #[test]
    fn votes_keep_insertion_order() {
        let store = MemoryStore::new();
        store.insert_vote(&vote(1, "V-1", 10)).unwrap();
        store.insert_vote(&vote(1, "V-2", 10)).unwrap();
        store.insert_vote(&vote(1, "V-3", 10)).unwrap();
        let rows = store.votes_for_election(ElectionId::new(1)).unwrap();
        let voters: Vec<_> = rows.iter().map(|v| v.voter.to_string()).collect();
        assert_eq!(voters, ["V-1", "V-2", "V-3"]);
    }

    #[test]
    fn concurrent_inserts_allow_exactly_one_winner() {
        use std::sync::Arc;
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.insert_vote(&vote(1, "V-1", 10)).is_ok())
            })
            .collect();
        let wins: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(wins, 1);
        assert_eq!(store.vote_count(ElectionId::new(1)).unwrap(), 1);
    }

    #[test]
    fn audit_ids_are_sequential() {
        let store = MemoryStore::new();
        let entry = NewAuditEntry {
            action: AuditAction::Create,
            table_name: "elections".into(),
            record_id: "1".into(),
            actor_id: "admin".into(),
            actor_type: ActorType::Management,
            before_value: None,
            after_value: None,
            diff: None,
            ledger_tx_hash: None,
            status: AuditStatus::Success,
            error_message: None,
            timestamp: Timestamp::new(1),
        };
        let a = store.append(entry.clone()).unwrap();
        let b = store.append(entry).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.entry_count().unwrap(), 2);
    }
}
