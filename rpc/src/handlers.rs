//! RPC request handlers and their wire types.

use crate::error::RpcError;
use crate::server::RpcState;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use votechain_audit::{
    change_statistics, changes_by_actor, changes_by_table, critical_changes, query,
    recent_changes, statistics, AuditFilter, PageRequest,
};
use votechain_coordinator::{
    Ballot, BallotEntry, CoordinatorStore, RepairTask, SubmitError, SubmitOutcome,
};
use votechain_eligibility::eligible_elections;
use votechain_ledger::LedgerClient;
use votechain_results::{final_results, live_results};
use votechain_types::{
    ActorType, AuditAction, AuditStatus, CandidateId, ElectionId, PositionId, Timestamp, VoterId,
};

// ── Vote submission ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitVoteRequest {
    pub voter_id: String,
    pub election_id: u64,
    pub entries: Vec<BallotEntryDto>,
}

#[derive(Clone, Deserialize)]
pub struct BallotEntryDto {
    pub candidate_id: u64,
    pub position_id: u64,
}

#[derive(Serialize)]
pub struct SubmitVoteResponse {
    /// `"complete"`, or `"partial"` when mirror rows are pending repair.
    pub status: String,
    pub voter_id: String,
    pub election_id: u64,
    pub votes: Vec<VoteReceiptDto>,
    /// Entries committed to the ledger whose mirror row is queued for
    /// repair. Empty on a complete submission.
    pub pending: Vec<VoteReceiptDto>,
}

#[derive(Serialize)]
pub struct VoteReceiptDto {
    pub position_id: u64,
    pub candidate_id: u64,
    pub tx_hash: String,
}

pub async fn submit_vote<S, L>(
    State(state): State<Arc<RpcState<S, L>>>,
    Json(req): Json<SubmitVoteRequest>,
) -> Result<Json<SubmitVoteResponse>, RpcError>
where
    S: CoordinatorStore + 'static,
    L: LedgerClient + 'static,
{
    state.metrics.ballots_received.inc();
    let ballot = Ballot {
        voter: VoterId::new(&*req.voter_id),
        election: ElectionId::new(req.election_id),
        entries: req
            .entries
            .iter()
            .map(|e| BallotEntry {
                candidate: CandidateId::new(e.candidate_id),
                position: PositionId::new(e.position_id),
            })
            .collect(),
    };

    let started = Instant::now();
    let result = state.coordinator.submit(&ballot).await;
    state
        .metrics
        .submit_time_ms
        .observe(started.elapsed().as_secs_f64() * 1000.0);

    match result {
        Ok(outcome) => {
            let (status, votes, pending) = match outcome {
                SubmitOutcome::Complete { records } => {
                    state.metrics.votes_committed.inc_by(records.len() as u64);
                    let votes = records
                        .iter()
                        .map(|r| VoteReceiptDto {
                            position_id: r.position.as_u64(),
                            candidate_id: r.candidate.as_u64(),
                            tx_hash: r.vote_hash.to_string(),
                        })
                        .collect();
                    ("complete", votes, Vec::new())
                }
                SubmitOutcome::Partial {
                    mirrored,
                    unmirrored,
                } => {
                    state
                        .metrics
                        .votes_committed
                        .inc_by((mirrored.len() + unmirrored.len()) as u64);
                    let votes = mirrored
                        .iter()
                        .map(|r| VoteReceiptDto {
                            position_id: r.position.as_u64(),
                            candidate_id: r.candidate.as_u64(),
                            tx_hash: r.vote_hash.to_string(),
                        })
                        .collect();
                    let pending: Vec<VoteReceiptDto> = unmirrored
                        .iter()
                        .map(|u| VoteReceiptDto {
                            position_id: u.entry.position.as_u64(),
                            candidate_id: u.entry.candidate.as_u64(),
                            tx_hash: u.receipt.tx_hash.to_string(),
                        })
                        .collect();
                    state.repairs.push_all(RepairTask::from_unmirrored(
                        &ballot.voter,
                        ballot.election,
                        unmirrored,
                    ));
                    state
                        .metrics
                        .pending_repairs
                        .set(state.repairs.len() as i64);
                    ("partial", votes, pending)
                }
            };
            Ok(Json(SubmitVoteResponse {
                status: status.into(),
                voter_id: req.voter_id,
                election_id: req.election_id,
                votes,
                pending,
            }))
        }
        Err(SubmitError::Ledger { source, committed }) => {
            state.metrics.ledger_failures.inc();
            // Entries that landed before the failure are owed mirror rows.
            state.repairs.push_all(RepairTask::from_committed(
                &ballot.voter,
                ballot.election,
                committed,
            ));
            state
                .metrics
                .pending_repairs
                .set(state.repairs.len() as i64);
            Err(RpcError::Ledger(source.to_string()))
        }
        Err(err) => {
            state.metrics.ballots_rejected.inc();
            Err(err.into())
        }
    }
}

// ── Vote status ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VoteStatusParams {
    pub voter_id: String,
    pub election_id: u64,
    /// When true, ask the ledger instead of the mirror.
    #[serde(default)]
    pub authoritative: bool,
}

#[derive(Serialize)]
pub struct VoteStatusResponse {
    pub has_voted: bool,
    pub source: &'static str,
}

pub async fn vote_status<S, L>(
    State(state): State<Arc<RpcState<S, L>>>,
    Query(params): Query<VoteStatusParams>,
) -> Result<Json<VoteStatusResponse>, RpcError>
where
    S: CoordinatorStore + 'static,
    L: LedgerClient + 'static,
{
    let voter = VoterId::new(&*params.voter_id);
    let election = ElectionId::new(params.election_id);
    let (has_voted, source) = if params.authoritative {
        (
            state
                .coordinator
                .has_voted_authoritative(election, &voter)
                .await?,
            "ledger",
        )
    } else {
        (state.coordinator.has_voted(election, &voter)?, "mirror")
    };
    Ok(Json(VoteStatusResponse { has_voted, source }))
}

// ── Eligible elections ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct EligibleParams {
    pub voter_id: String,
}

#[derive(Serialize)]
pub struct EligibleElectionDto {
    pub election_id: u64,
    pub title: String,
    pub description: String,
    pub election_type: votechain_types::ElectionType,
    pub status: votechain_types::ElectionStatus,
    pub start_date: u64,
    pub end_date: u64,
    pub year: u16,
    pub positions: Vec<PositionDto>,
}

#[derive(Serialize)]
pub struct PositionDto {
    pub position_id: u64,
    pub name: String,
    pub candidates: Vec<CandidateDto>,
}

#[derive(Serialize)]
pub struct CandidateDto {
    pub candidate_id: u64,
    pub name: String,
    pub party_id: Option<u64>,
    pub ward: String,
    pub constituency: String,
}

pub async fn eligible<S, L>(
    State(state): State<Arc<RpcState<S, L>>>,
    Query(params): Query<EligibleParams>,
) -> Result<Json<Vec<EligibleElectionDto>>, RpcError>
where
    S: CoordinatorStore + 'static,
    L: LedgerClient + 'static,
{
    let rosters = eligible_elections(state.store.as_ref(), &VoterId::new(&*params.voter_id))?;
    let elections = rosters
        .into_iter()
        .map(|roster| EligibleElectionDto {
            election_id: roster.election.id.as_u64(),
            title: roster.election.title,
            description: roster.election.description,
            election_type: roster.election.election_type,
            status: roster.election.status,
            start_date: roster.election.start_date.as_secs(),
            end_date: roster.election.end_date.as_secs(),
            year: roster.election.year,
            positions: roster
                .positions
                .into_iter()
                .map(|slate| PositionDto {
                    position_id: slate.position.id.as_u64(),
                    name: slate.position.name,
                    candidates: slate
                        .candidates
                        .into_iter()
                        .map(|rc| CandidateDto {
                            candidate_id: rc.candidate.id.as_u64(),
                            name: rc.candidate.full_name(),
                            party_id: rc.candidate.party.map(|p| p.as_u64()),
                            ward: rc.candidate.ward.to_string(),
                            constituency: rc.constituency.to_string(),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();
    Ok(Json(elections))
}

// ── Results ──────────────────────────────────────────────────────────────

pub async fn live<S, L>(State(state): State<Arc<RpcState<S, L>>>) -> Result<Response, RpcError>
where
    S: CoordinatorStore + 'static,
    L: LedgerClient + 'static,
{
    let report = live_results(state.store.as_ref(), state.clock.now())?;
    Ok(Json(report).into_response())
}

pub async fn finals<S, L>(State(state): State<Arc<RpcState<S, L>>>) -> Result<Response, RpcError>
where
    S: CoordinatorStore + 'static,
    L: LedgerClient + 'static,
{
    let report = final_results(state.store.as_ref(), state.clock.now())?;
    Ok(Json(report).into_response())
}

// ── Audit log ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AuditLogParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub action: Option<AuditAction>,
    pub table_name: Option<String>,
    pub actor_id: Option<String>,
    pub actor_type: Option<ActorType>,
    pub status: Option<AuditStatus>,
    /// Inclusive window start, Unix seconds.
    pub start: Option<u64>,
    /// Inclusive window end, Unix seconds.
    pub end: Option<u64>,
    /// When true, return grouped statistics instead of a page of entries.
    #[serde(default)]
    pub stats: bool,
}

pub async fn audit_logs<S, L>(
    State(state): State<Arc<RpcState<S, L>>>,
    Query(params): Query<AuditLogParams>,
) -> Result<Response, RpcError>
where
    S: CoordinatorStore + 'static,
    L: LedgerClient + 'static,
{
    let start = params.start.map(Timestamp::new);
    let end = params.end.map(Timestamp::new);

    if params.stats {
        let stats = statistics(state.store.as_ref(), start, end)?;
        return Ok(Json(stats).into_response());
    }

    let filter = AuditFilter {
        action: params.action,
        table_name: params.table_name,
        actor_id: params.actor_id,
        actor_type: params.actor_type,
        status: params.status,
        start,
        end,
    };
    let page = query(
        state.store.as_ref(),
        &filter,
        PageRequest {
            page: params.page,
            limit: params.limit,
        },
    )?;
    Ok(Json(page).into_response())
}

// ── Change notifications ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangeFeedParams {
    /// `recent` (default), `user`, `table`, `critical`, or `stats`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub minutes: Option<u64>,
    pub hours: Option<u64>,
    pub actor_id: Option<String>,
    pub table_name: Option<String>,
    pub limit: Option<usize>,
}

const DEFAULT_FEED_MINUTES: u64 = 60;
const DEFAULT_FEED_HOURS: u64 = 24;
const DEFAULT_FEED_LIMIT: usize = 50;

pub async fn change_notifications<S, L>(
    State(state): State<Arc<RpcState<S, L>>>,
    Query(params): Query<ChangeFeedParams>,
) -> Result<Response, RpcError>
where
    S: CoordinatorStore + 'static,
    L: LedgerClient + 'static,
{
    let store = state.store.as_ref();
    let now = state.clock.now();
    let hours = params.hours.unwrap_or(DEFAULT_FEED_HOURS);

    match params.kind.as_deref().unwrap_or("recent") {
        "recent" => {
            let changes = recent_changes(
                store,
                now,
                params.minutes.unwrap_or(DEFAULT_FEED_MINUTES),
                params.limit.unwrap_or(DEFAULT_FEED_LIMIT),
            )?;
            Ok(Json(changes).into_response())
        }
        "user" => {
            let actor = params
                .actor_id
                .ok_or_else(|| RpcError::InvalidRequest("actor_id is required".into()))?;
            Ok(Json(changes_by_actor(store, now, &actor, hours)?).into_response())
        }
        "table" => {
            let table = params
                .table_name
                .ok_or_else(|| RpcError::InvalidRequest("table_name is required".into()))?;
            Ok(Json(changes_by_table(store, now, &table, hours)?).into_response())
        }
        "critical" => Ok(Json(critical_changes(store, now, hours)?).into_response()),
        "stats" => Ok(Json(change_statistics(store, now, hours)?).into_response()),
        other => Err(RpcError::InvalidRequest(format!(
            "unknown feed type: {other}"
        ))),
    }
}

// ── Operational endpoints ────────────────────────────────────────────────

pub async fn metrics<S, L>(State(state): State<Arc<RpcState<S, L>>>) -> Result<Response, RpcError>
where
    S: CoordinatorStore + 'static,
    L: LedgerClient + 'static,
{
    let encoder = prometheus::TextEncoder::new();
    let body = encoder
        .encode_to_string(&state.metrics.registry.gather())
        .map_err(|e| RpcError::Server(e.to_string()))?;
    Ok(body.into_response())
}

pub async fn health() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}
