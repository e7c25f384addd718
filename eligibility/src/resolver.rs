//! Voter chain resolution and the eligibility predicate.

use serde::{Deserialize, Serialize};
use tracing::debug;
use votechain_store::candidate::CandidateStore;
use votechain_store::election::{Election, ElectionStore, Position};
use votechain_store::geography::{Constituency, District, GeographyStore, Province, Ward};
use votechain_store::voter::{Voter, VoterStore};
use votechain_store::{Candidate, StoreError};
use votechain_types::{ConstituencyCode, ElectionStatus, ElectionType, VoterId};

/// A voter with their full resolved ancestor chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoterChain {
    pub voter: Voter,
    pub ward: Ward,
    pub constituency: Constituency,
    pub district: District,
    pub province: Province,
}

/// An election with its positions and each position's candidate slate,
/// candidates annotated with their resolved constituency.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElectionRoster {
    pub election: Election,
    pub positions: Vec<PositionSlate>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PositionSlate {
    pub position: Position,
    pub candidates: Vec<RosterCandidate>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RosterCandidate {
    pub candidate: Candidate,
    pub constituency: ConstituencyCode,
}

/// Resolve a voter's full geographic chain.
///
/// Fails with [`StoreError::NotFound`] naming the broken link if the voter
/// or any ancestor is missing — an orphan ward is a data fault, not a
/// normal outcome.
pub fn resolve_chain<S>(store: &S, voter_id: &VoterId) -> Result<VoterChain, StoreError>
where
    S: VoterStore + GeographyStore,
{
    let voter = store.get_voter(voter_id)?;
    let ward = store.get_ward(&voter.ward)?;
    let constituency = store.get_constituency(&ward.constituency)?;
    let district = store.get_district(&constituency.district)?;
    let province = store.get_province(&district.province)?;
    Ok(VoterChain {
        voter,
        ward,
        constituency,
        district,
        province,
    })
}

/// Pure eligibility predicate over already-loaded data.
///
/// General elections are visible to every voter. Scoped elections are
/// visible iff at least one candidate across all of the election's
/// positions sits in the voter's constituency.
pub fn is_eligible(roster: &ElectionRoster, chain: &VoterChain) -> bool {
    match roster.election.election_type {
        ElectionType::General => true,
        ElectionType::Scoped => roster
            .positions
            .iter()
            .flat_map(|slate| slate.candidates.iter())
            .any(|rc| rc.constituency == chain.constituency.code),
    }
}

/// Load the roster (positions, candidates, constituencies) for one election.
pub fn roster_for<S>(store: &S, election: &Election) -> Result<ElectionRoster, StoreError>
where
    S: ElectionStore + CandidateStore + GeographyStore,
{
    let mut positions = Vec::with_capacity(election.positions.len());
    for &position_id in &election.positions {
        let position = store.get_position(position_id)?;
        let mut candidates = Vec::new();
        for candidate in store.candidates_for_position(position_id)? {
            let ward = store.get_ward(&candidate.ward)?;
            candidates.push(RosterCandidate {
                candidate,
                constituency: ward.constituency,
            });
        }
        positions.push(PositionSlate {
            position,
            candidates,
        });
    }
    Ok(ElectionRoster {
        election: election.clone(),
        positions,
    })
}

/// All active elections the voter is eligible for, with their rosters.
pub fn eligible_elections<S>(
    store: &S,
    voter_id: &VoterId,
) -> Result<Vec<ElectionRoster>, StoreError>
where
    S: VoterStore + GeographyStore + ElectionStore + CandidateStore,
{
    let chain = resolve_chain(store, voter_id)?;
    let mut eligible = Vec::new();
    for election in store.elections_by_status(ElectionStatus::Active)? {
        let roster = roster_for(store, &election)?;
        if is_eligible(&roster, &chain) {
            eligible.push(roster);
        } else {
            debug!(voter = %voter_id, election = %election.id,
                   "scoped election filtered out: no candidate in voter constituency");
        }
    }
    Ok(eligible)
}
