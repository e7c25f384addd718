//! End-to-end submission tests over the in-memory mirror and the
//! simulated ledger.

use std::sync::Arc;
use std::time::Duration;
use votechain_coordinator::{
    Ballot, BallotEntry, Coordinator, Reconciler, RepairTask, SubmitError, SubmitOutcome,
};
use votechain_ledger::{Fault, LedgerClient, LedgerError, RetryPolicy, SimLedger, VoteData};
use votechain_store::candidate::Candidate;
use votechain_store::election::{Election, Position};
use votechain_store::geography::{Constituency, District, Province, Ward};
use votechain_store::voter::Voter;
use votechain_store::{AuditStore, CandidateStore, ElectionStore, GeographyStore, VoteStore, VoterStore};
use votechain_store_memory::MemoryStore;
use votechain_types::{
    AuditAction, AuditStatus, CandidateId, Clock, ConstituencyCode, DistrictCode, ElectionId,
    ElectionStatus, ElectionType, ManualClock, PositionId, ProvinceCode, Timestamp, VoterId,
    WardCode,
};

const ELECTION: ElectionId = ElectionId::new(1);
const MAYOR: PositionId = PositionId::new(1);
const COUNCILLOR: PositionId = PositionId::new(2);

fn seed(store: &MemoryStore) {
    store
        .put_province(&Province {
            code: ProvinceCode::new("P-1"),
            name: "Central".into(),
        })
        .unwrap();
    store
        .put_district(&District {
            code: DistrictCode::new("D-1"),
            name: "Kabwe".into(),
            province: ProvinceCode::new("P-1"),
        })
        .unwrap();
    store
        .put_constituency(&Constituency {
            code: ConstituencyCode::new("C-1"),
            name: "Bwacha".into(),
            district: DistrictCode::new("D-1"),
        })
        .unwrap();
    store
        .put_ward(&Ward {
            code: WardCode::new("W-1"),
            name: "Ward One".into(),
            constituency: ConstituencyCode::new("C-1"),
        })
        .unwrap();

    for id in ["V-1", "V-2"] {
        store
            .put_voter(&Voter {
                id: VoterId::new(id),
                first_name: "Test".into(),
                last_name: "Voter".into(),
                nrc: "123456/78/9".into(),
                credential_hash: "hash".into(),
                ward: WardCode::new("W-1"),
            })
            .unwrap();
    }

    store
        .put_position(&Position {
            id: MAYOR,
            name: "Mayor".into(),
        })
        .unwrap();
    store
        .put_position(&Position {
            id: COUNCILLOR,
            name: "Councillor".into(),
        })
        .unwrap();
    for (id, position) in [(10, MAYOR), (11, MAYOR), (20, COUNCILLOR)] {
        store
            .put_candidate(&Candidate {
                id: CandidateId::new(id),
                first_name: "Candidate".into(),
                last_name: format!("{id}"),
                position,
                ward: WardCode::new("W-1"),
                party: None,
            })
            .unwrap();
    }
    store
        .put_election(&Election {
            id: ELECTION,
            title: "2026 General Election".into(),
            description: String::new(),
            status: ElectionStatus::Active,
            election_type: ElectionType::General,
            start_date: Timestamp::new(0),
            end_date: Timestamp::new(1_000_000),
            year: 2026,
            positions: vec![MAYOR, COUNCILLOR],
        })
        .unwrap();
}

struct Fixture {
    store: Arc<MemoryStore>,
    ledger: Arc<SimLedger>,
    coordinator: Coordinator<MemoryStore, SimLedger>,
    clock: Arc<ManualClock>,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    seed(&store);
    let ledger = Arc::new(SimLedger::new());
    let clock = Arc::new(ManualClock::new(1_000));
    let coordinator = Coordinator::new(
        Arc::clone(&store),
        Arc::clone(&ledger),
        RetryPolicy::new(Duration::from_secs(5), 2),
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    Fixture {
        store,
        ledger,
        coordinator,
        clock,
    }
}

fn ballot(voter: &str, entries: &[(u64, PositionId)]) -> Ballot {
    Ballot {
        voter: VoterId::new(voter),
        election: ELECTION,
        entries: entries
            .iter()
            .map(|&(candidate, position)| BallotEntry {
                candidate: CandidateId::new(candidate),
                position,
            })
            .collect(),
    }
}

fn vote_audit_statuses(store: &MemoryStore) -> Vec<AuditStatus> {
    store
        .iter_entries()
        .unwrap()
        .into_iter()
        .filter(|e| e.action == AuditAction::VoteSubmit)
        .map(|e| e.status)
        .collect()
}

#[tokio::test]
async fn complete_ballot_lands_on_ledger_and_mirror() {
    let fx = fixture();
    let outcome = fx
        .coordinator
        .submit(&ballot("V-1", &[(10, MAYOR), (20, COUNCILLOR)]))
        .await
        .unwrap();

    assert!(outcome.is_complete());
    assert_eq!(outcome.records().len(), 2);
    assert_eq!(fx.ledger.committed_count(), 2);

    let rows = fx.store.votes_by_voter(ELECTION, &VoterId::new("V-1")).unwrap();
    assert_eq!(rows.len(), 2);
    // Every mirror row carries the hash of its ledger transaction.
    for row in &rows {
        assert!(!row.vote_hash.is_zero());
        assert_eq!(row.cast_at, fx.clock.now());
    }

    // One audit entry per ballot entry, all successful.
    assert_eq!(
        vote_audit_statuses(&fx.store),
        vec![AuditStatus::Success, AuditStatus::Success]
    );
}

#[tokio::test]
async fn unknown_voter_is_not_found() {
    let fx = fixture();
    let err = fx
        .coordinator
        .submit(&ballot("V-missing", &[(10, MAYOR)]))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::NotFound(_)));
    assert_eq!(fx.ledger.committed_count(), 0);
}

#[tokio::test]
async fn unknown_election_is_not_found() {
    let fx = fixture();
    let mut b = ballot("V-1", &[(10, MAYOR)]);
    b.election = ElectionId::new(99);
    let err = fx.coordinator.submit(&b).await.unwrap_err();
    assert!(matches!(err, SubmitError::NotFound(_)));
}

#[tokio::test]
async fn closed_election_rejects_ballots() {
    let fx = fixture();
    // Advance past the voting window.
    fx.clock.set(2_000_000);
    let err = fx
        .coordinator
        .submit(&ballot("V-1", &[(10, MAYOR)]))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::Validation(_)));
    assert_eq!(fx.ledger.committed_count(), 0);
}

#[tokio::test]
async fn rejected_ballots_leave_an_audit_trail() {
    let fx = fixture();
    fx.clock.set(2_000_000);
    fx.coordinator
        .submit(&ballot("V-1", &[(10, MAYOR)]))
        .await
        .unwrap_err();
    // Validation rejections are part of the operational trail: one failed
    // vote-submit entry per rejected ballot.
    assert_eq!(vote_audit_statuses(&fx.store), vec![AuditStatus::Failed]);

    // Lookup failures are audited the same way.
    fx.coordinator
        .submit(&ballot("V-missing", &[(10, MAYOR)]))
        .await
        .unwrap_err();
    assert_eq!(
        vote_audit_statuses(&fx.store),
        vec![AuditStatus::Failed, AuditStatus::Failed]
    );
}

#[tokio::test]
async fn empty_ballot_is_invalid() {
    let fx = fixture();
    let err = fx.coordinator.submit(&ballot("V-1", &[])).await.unwrap_err();
    assert!(matches!(err, SubmitError::Validation(_)));
}

#[tokio::test]
async fn candidate_must_be_on_the_position_slate() {
    let fx = fixture();
    // Candidate 20 stands for councillor, not mayor.
    let err = fx
        .coordinator
        .submit(&ballot("V-1", &[(20, MAYOR)]))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::Validation(_)));
}

#[tokio::test]
async fn duplicate_position_within_ballot_is_invalid() {
    let fx = fixture();
    let err = fx
        .coordinator
        .submit(&ballot("V-1", &[(10, MAYOR), (11, MAYOR)]))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::Validation(_)));
}

#[tokio::test]
async fn second_ballot_is_rejected_as_duplicate() {
    let fx = fixture();
    fx.coordinator
        .submit(&ballot("V-1", &[(10, MAYOR)]))
        .await
        .unwrap();
    let err = fx
        .coordinator
        .submit(&ballot("V-1", &[(11, MAYOR)]))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::AlreadyVoted));

    // The mirror still holds exactly the first ballot, and the rejection
    // was audited as a failure.
    assert_eq!(fx.store.votes_by_voter(ELECTION, &VoterId::new("V-1")).unwrap().len(), 1);
    assert_eq!(
        vote_audit_statuses(&fx.store),
        vec![AuditStatus::Success, AuditStatus::Failed]
    );
}

#[tokio::test]
async fn ledger_vote_missed_by_the_mirror_still_counts_as_duplicate() {
    let fx = fixture();
    // A vote that reached the ledger but never the mirror (e.g. a crash
    // before the mirror write).
    fx.ledger
        .submit_vote(&VoteData {
            voter: VoterId::new("V-1"),
            election: ELECTION,
            candidate: CandidateId::new(10),
            position: MAYOR,
            ward: WardCode::new("W-1"),
        })
        .await
        .unwrap();
    assert!(!fx.coordinator.has_voted(ELECTION, &VoterId::new("V-1")).unwrap());
    assert!(fx
        .coordinator
        .has_voted_authoritative(ELECTION, &VoterId::new("V-1"))
        .await
        .unwrap());

    let err = fx
        .coordinator
        .submit(&ballot("V-1", &[(10, MAYOR)]))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::AlreadyVoted));
    assert_eq!(fx.ledger.committed_count(), 1);
}

#[tokio::test]
async fn ledger_failure_mid_batch_writes_no_mirror_rows() {
    let fx = fixture();
    // First entry lands (despite the ambiguous timeout); second is
    // rejected outright.
    fx.ledger.inject_fault(Fault::TimeoutAfterCommit);
    fx.ledger.inject_fault(Fault::Reject);

    let err = fx
        .coordinator
        .submit(&ballot("V-1", &[(10, MAYOR), (20, COUNCILLOR)]))
        .await
        .unwrap_err();

    let committed = match err {
        SubmitError::Ledger { source, committed } => {
            assert!(matches!(source, LedgerError::Rejected(_)));
            committed
        }
        other => panic!("expected ledger error, got {other:?}"),
    };

    // The committed entry travels with the error; the mirror got nothing.
    assert_eq!(committed.len(), 1);
    assert_eq!(committed[0].entry.position, MAYOR);
    assert_eq!(fx.ledger.committed_count(), 1);
    assert!(fx.store.votes_by_voter(ELECTION, &VoterId::new("V-1")).unwrap().is_empty());

    // Reconciliation replays the committed entry into the mirror.
    let reconciler = Reconciler::new(
        Arc::clone(&fx.store),
        Arc::clone(&fx.clock) as Arc<dyn Clock>,
    );
    let tasks = RepairTask::from_committed(&VoterId::new("V-1"), ELECTION, committed);
    let summary = reconciler.repair(tasks);
    assert_eq!(summary.repaired, 1);
    assert_eq!(fx.store.votes_by_voter(ELECTION, &VoterId::new("V-1")).unwrap().len(), 1);
}

#[tokio::test]
async fn mirror_failure_yields_partial_outcome_and_repairs() {
    let fx = fixture();
    fx.store.fail_next_vote_inserts(1);

    let outcome = fx
        .coordinator
        .submit(&ballot("V-1", &[(10, MAYOR), (20, COUNCILLOR)]))
        .await
        .unwrap();

    let (mirrored, unmirrored) = match outcome {
        SubmitOutcome::Partial {
            mirrored,
            unmirrored,
        } => (mirrored, unmirrored),
        other => panic!("expected partial outcome, got {other:?}"),
    };
    assert_eq!(mirrored.len(), 1);
    assert_eq!(unmirrored.len(), 1);
    // The vote itself fully counts: both entries are on the ledger.
    assert_eq!(fx.ledger.committed_count(), 2);
    assert_eq!(
        vote_audit_statuses(&fx.store),
        vec![AuditStatus::Pending, AuditStatus::Success]
    );

    let reconciler = Reconciler::new(
        Arc::clone(&fx.store),
        Arc::clone(&fx.clock) as Arc<dyn Clock>,
    );
    let tasks = RepairTask::from_unmirrored(&VoterId::new("V-1"), ELECTION, unmirrored);
    let summary = reconciler.repair(tasks);
    assert_eq!(summary.repaired, 1);
    assert!(summary.is_clean());
    assert_eq!(fx.store.votes_by_voter(ELECTION, &VoterId::new("V-1")).unwrap().len(), 2);
}

#[tokio::test]
async fn detection_finds_ledger_votes_missing_from_the_mirror() {
    let fx = fixture();
    fx.ledger
        .submit_vote(&VoteData {
            voter: VoterId::new("V-1"),
            election: ELECTION,
            candidate: CandidateId::new(10),
            position: MAYOR,
            ward: WardCode::new("W-1"),
        })
        .await
        .unwrap();
    fx.coordinator
        .submit(&ballot("V-2", &[(10, MAYOR)]))
        .await
        .unwrap();

    let reconciler = Reconciler::new(
        Arc::clone(&fx.store),
        Arc::clone(&fx.clock) as Arc<dyn Clock>,
    );
    let voters = [VoterId::new("V-1"), VoterId::new("V-2")];
    let missing = reconciler
        .missing_in_mirror(
            fx.ledger.as_ref(),
            &RetryPolicy::new(Duration::from_secs(5), 2),
            ELECTION,
            &voters,
        )
        .await
        .unwrap();
    assert_eq!(missing, vec![VoterId::new("V-1")]);
}

#[tokio::test]
async fn transient_ledger_outage_is_retried_transparently() {
    let fx = fixture();
    fx.ledger.inject_fault(Fault::Unreachable);

    let outcome = fx
        .coordinator
        .submit(&ballot("V-1", &[(10, MAYOR)]))
        .await
        .unwrap();
    assert!(outcome.is_complete());
    assert_eq!(fx.ledger.committed_count(), 1);
}
