//! Demo data for development deployments.
//!
//! Seeds a small geography tree, a handful of voters, and one active
//! general election so a freshly started dev node accepts ballots
//! immediately.

use votechain_store::candidate::{Candidate, CandidateStore, Party};
use votechain_store::election::{Election, ElectionStore, Position};
use votechain_store::geography::{Constituency, District, GeographyStore, Province, Ward};
use votechain_store::voter::{Voter, VoterStore};
use votechain_store::StoreError;
use votechain_types::{
    CandidateId, ConstituencyCode, DistrictCode, ElectionId, ElectionStatus, ElectionType,
    PartyId, PositionId, ProvinceCode, Timestamp, VoterId, WardCode,
};

/// One day's worth of seconds; the demo election stays open this long.
const DAY_SECS: u64 = 86_400;

pub fn seed_demo_data<S>(store: &S, now: Timestamp) -> Result<(), StoreError>
where
    S: GeographyStore + VoterStore + ElectionStore + CandidateStore,
{
    store.put_province(&Province {
        code: ProvinceCode::new("LSK"),
        name: "Lusaka".into(),
    })?;
    store.put_district(&District {
        code: DistrictCode::new("LSK-01"),
        name: "Lusaka District".into(),
        province: ProvinceCode::new("LSK"),
    })?;
    for (cons, cons_name, ward, ward_name) in [
        ("KBW", "Kabwata", "KBW-W1", "Kabwata Ward 1"),
        ("MND", "Mandevu", "MND-W1", "Mandevu Ward 1"),
    ] {
        store.put_constituency(&Constituency {
            code: ConstituencyCode::new(cons),
            name: cons_name.into(),
            district: DistrictCode::new("LSK-01"),
        })?;
        store.put_ward(&Ward {
            code: WardCode::new(ward),
            name: ward_name.into(),
            constituency: ConstituencyCode::new(cons),
        })?;
    }

    for (id, first, last, nrc, ward) in [
        ("ZM-1001", "Chanda", "Mulenga", "190001/10/1", "KBW-W1"),
        ("ZM-1002", "Bwalya", "Phiri", "190002/10/1", "KBW-W1"),
        ("ZM-1003", "Mutale", "Banda", "190003/10/1", "MND-W1"),
        ("ZM-1004", "Natasha", "Zulu", "190004/10/1", "MND-W1"),
    ] {
        store.put_voter(&Voter {
            id: VoterId::new(id),
            first_name: first.into(),
            last_name: last.into(),
            nrc: nrc.into(),
            credential_hash: "demo".into(),
            ward: WardCode::new(ward),
        })?;
    }

    store.put_party(&Party {
        id: PartyId::new(1),
        name: "Unity Party".into(),
        acronym: "UP".into(),
    })?;
    store.put_party(&Party {
        id: PartyId::new(2),
        name: "Progressive Alliance".into(),
        acronym: "PA".into(),
    })?;

    store.put_position(&Position {
        id: PositionId::new(1),
        name: "President".into(),
    })?;
    store.put_position(&Position {
        id: PositionId::new(2),
        name: "Mayor".into(),
    })?;
    for (id, first, last, position, ward, party) in [
        (1, "Joseph", "Mwale", 1, "KBW-W1", Some(1)),
        (2, "Grace", "Tembo", 1, "MND-W1", Some(2)),
        (3, "Peter", "Sakala", 2, "KBW-W1", None),
        (4, "Ruth", "Daka", 2, "MND-W1", Some(1)),
    ] {
        store.put_candidate(&Candidate {
            id: CandidateId::new(id),
            first_name: first.into(),
            last_name: last.into(),
            position: PositionId::new(position),
            ward: WardCode::new(ward),
            party: party.map(PartyId::new),
        })?;
    }

    store.put_election(&Election {
        id: ElectionId::new(1),
        title: "Demo General Election".into(),
        description: "Seeded development election".into(),
        status: ElectionStatus::Active,
        election_type: ElectionType::General,
        start_date: now,
        end_date: Timestamp::new(now.as_secs() + DAY_SECS),
        year: 2026,
        positions: vec![PositionId::new(1), PositionId::new(2)],
    })?;

    Ok(())
}
