//! Axum-based RPC server.

use crate::error::RpcError;
use crate::handlers;
use crate::metrics::VoteMetrics;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use votechain_coordinator::{Coordinator, CoordinatorStore, RepairQueue};
use votechain_ledger::LedgerClient;
use votechain_types::Clock;

/// Shared state handed to every handler.
pub struct RpcState<S, L> {
    pub store: Arc<S>,
    pub coordinator: Coordinator<S, L>,
    pub repairs: Arc<RepairQueue>,
    pub metrics: Arc<VoteMetrics>,
    pub clock: Arc<dyn Clock>,
}

/// Build the full API router over the given state.
pub fn router<S, L>(state: Arc<RpcState<S, L>>) -> Router
where
    S: CoordinatorStore + 'static,
    L: LedgerClient + 'static,
{
    Router::new()
        .route("/api/vote", post(handlers::submit_vote::<S, L>))
        .route("/api/vote/status", get(handlers::vote_status::<S, L>))
        .route("/api/elections/eligible", get(handlers::eligible::<S, L>))
        .route("/api/results/live", get(handlers::live::<S, L>))
        .route("/api/results/final", get(handlers::finals::<S, L>))
        .route("/api/audit-logs", get(handlers::audit_logs::<S, L>))
        .route(
            "/api/change-notifications",
            get(handlers::change_notifications::<S, L>),
        )
        .route("/metrics", get(handlers::metrics::<S, L>))
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the API to an address and serves it.
pub struct RpcServer {
    pub addr: SocketAddr,
}

impl RpcServer {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Serve until the shutdown future resolves.
    pub async fn serve(
        &self,
        router: Router,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), RpcError> {
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {}: {e}", self.addr)))?;
        info!("RPC listening on {}", self.addr);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
