//! Tally computation: per-position counts, percentages, winners, turnout.

use serde::Serialize;
use votechain_eligibility::{roster_for, ElectionRoster};
use votechain_store::candidate::CandidateStore;
use votechain_store::election::ElectionStore;
use votechain_store::geography::GeographyStore;
use votechain_store::vote::VoteStore;
use votechain_store::voter::VoterStore;
use votechain_store::StoreError;
use votechain_types::{CandidateId, ElectionId, ElectionStatus, PositionId, Timestamp};

/// One candidate's standing within a position.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateTally {
    pub candidate: CandidateId,
    pub name: String,
    pub party: Option<String>,
    pub votes: u64,
    /// Share of all votes cast in the election, rounded to whole percent.
    /// 0 when no votes have been cast.
    pub percentage: u32,
}

/// Standings for one position, candidates sorted by descending vote count.
///
/// Ties keep first-seen (registration) order — no secondary sort key is
/// applied, so equal counts rank in input order. Flag to stakeholders
/// before relying on tie order in a declared result.
#[derive(Clone, Debug, Serialize)]
pub struct PositionResult {
    pub position: PositionId,
    pub position_name: String,
    pub candidates: Vec<CandidateTally>,
    /// First candidate after sorting; populated only for final results.
    pub winner: Option<CandidateTally>,
}

/// Full standings for one election.
#[derive(Clone, Debug, Serialize)]
pub struct ElectionResult {
    pub election: ElectionId,
    pub title: String,
    pub status: ElectionStatus,
    pub total_votes: u64,
    pub total_voters: u64,
    /// round(total_votes / total_voters × 100); 0 with no registered voters.
    pub turnout: u32,
    pub positions: Vec<PositionResult>,
}

/// Aggregate figures across all elections in a report.
#[derive(Clone, Debug, Serialize)]
pub struct OverallStats {
    pub total_voters: u64,
    pub total_votes_cast: u64,
    pub election_count: usize,
    pub overall_turnout: u32,
}

/// A live or final results report.
#[derive(Clone, Debug, Serialize)]
pub struct ResultsReport {
    pub overall: OverallStats,
    pub elections: Vec<ElectionResult>,
    pub generated_at: Timestamp,
}

fn percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u32
    }
}

/// Tally one election from its mirror rows.
///
/// `declare_winner` controls whether each position's leader is surfaced as
/// the winner (final results) or left undeclared (live results).
pub fn tally_election<S>(
    store: &S,
    roster: &ElectionRoster,
    declare_winner: bool,
) -> Result<ElectionResult, StoreError>
where
    S: VoteStore + VoterStore + CandidateStore,
{
    let votes = store.votes_for_election(roster.election.id)?;
    let total_votes = votes.len() as u64;
    let total_voters = store.voter_count()?;

    let mut positions = Vec::with_capacity(roster.positions.len());
    for slate in &roster.positions {
        let mut tallies: Vec<CandidateTally> = Vec::with_capacity(slate.candidates.len());
        for rc in &slate.candidates {
            let candidate = &rc.candidate;
            let count = votes
                .iter()
                .filter(|v| v.position == slate.position.id && v.candidate == candidate.id)
                .count() as u64;
            let party = match candidate.party {
                Some(id) => Some(store.get_party(id)?.name),
                None => None,
            };
            tallies.push(CandidateTally {
                candidate: candidate.id,
                name: candidate.full_name(),
                party,
                votes: count,
                percentage: percent(count, total_votes),
            });
        }

        // Stable sort: equal counts keep registration order.
        tallies.sort_by(|a, b| b.votes.cmp(&a.votes));

        let winner = if declare_winner {
            tallies.first().cloned()
        } else {
            None
        };
        positions.push(PositionResult {
            position: slate.position.id,
            position_name: slate.position.name.clone(),
            candidates: tallies,
            winner,
        });
    }

    Ok(ElectionResult {
        election: roster.election.id,
        title: roster.election.title.clone(),
        status: roster.election.status,
        total_votes,
        total_voters,
        turnout: percent(total_votes, total_voters),
        positions,
    })
}

fn report<S>(
    store: &S,
    status: ElectionStatus,
    declare_winner: bool,
    now: Timestamp,
) -> Result<ResultsReport, StoreError>
where
    S: VoteStore + VoterStore + CandidateStore + ElectionStore + GeographyStore,
{
    let mut elections = Vec::new();
    for election in store.elections_by_status(status)? {
        let roster = roster_for(store, &election)?;
        elections.push(tally_election(store, &roster, declare_winner)?);
    }

    let total_voters = store.voter_count()?;
    let total_votes_cast: u64 = elections.iter().map(|e| e.total_votes).sum();
    Ok(ResultsReport {
        overall: OverallStats {
            total_voters,
            total_votes_cast,
            election_count: elections.len(),
            overall_turnout: percent(total_votes_cast, total_voters),
        },
        elections,
        generated_at: now,
    })
}

/// Standings for every Active election; no winners declared.
pub fn live_results<S>(store: &S, now: Timestamp) -> Result<ResultsReport, StoreError>
where
    S: VoteStore + VoterStore + CandidateStore + ElectionStore + GeographyStore,
{
    report(store, ElectionStatus::Active, false, now)
}

/// Standings for every Completed election, winners declared.
pub fn final_results<S>(store: &S, now: Timestamp) -> Result<ResultsReport, StoreError>
where
    S: VoteStore + VoterStore + CandidateStore + ElectionStore + GeographyStore,
{
    report(store, ElectionStatus::Completed, true, now)
}
