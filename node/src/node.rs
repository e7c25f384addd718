//! The main node struct — wires storage, ledger, coordinator, and RPC
//! together.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use votechain_coordinator::{Coordinator, Reconciler, RepairQueue};
use votechain_ledger::{RetryPolicy, SimLedger};
use votechain_rpc::{router, RpcServer, RpcState, VoteMetrics};
use votechain_store::election::ElectionStore;
use votechain_store_memory::MemoryStore;
use votechain_types::{Clock, ElectionStatus, SystemClock};

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::seed::seed_demo_data;

/// A running votechain node.
///
/// Owns the in-memory mirror, the (simulated) ledger client, and the
/// shared RPC state; `run` serves the API and drives the background
/// repair loop until shutdown.
pub struct Node {
    pub config: NodeConfig,
    store: Arc<MemoryStore>,
    clock: Arc<dyn Clock>,
    state: Arc<RpcState<MemoryStore, SimLedger>>,
}

impl Node {
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        let store = Arc::new(MemoryStore::new());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        if config.seed_demo_data {
            seed_demo_data(store.as_ref(), clock.now())?;
            info!("seeded demo data (development mode)");
        }

        let ledger = Arc::new(SimLedger::new());
        let policy = RetryPolicy::new(
            Duration::from_secs(config.ledger_timeout_secs),
            config.ledger_max_retries,
        );
        let coordinator = Coordinator::new(
            Arc::clone(&store),
            Arc::clone(&ledger),
            policy,
            Arc::clone(&clock),
        );

        let state = Arc::new(RpcState {
            store: Arc::clone(&store),
            coordinator,
            repairs: Arc::new(RepairQueue::new()),
            metrics: Arc::new(VoteMetrics::new()),
            clock: Arc::clone(&clock),
        });

        Ok(Self {
            config,
            store,
            clock,
            state,
        })
    }

    /// Serve the RPC API until the shutdown future resolves. The repair
    /// loop runs alongside and is stopped when serving ends.
    pub async fn run(
        &self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), NodeError> {
        let addr: SocketAddr = format!("{}:{}", self.config.listen_addr, self.config.rpc_port)
            .parse()
            .map_err(|_| {
                NodeError::ListenAddr(format!(
                    "{}:{}",
                    self.config.listen_addr, self.config.rpc_port
                ))
            })?;

        let repair_loop = self.spawn_repair_loop();
        let result = RpcServer::new(addr)
            .serve(router(Arc::clone(&self.state)), shutdown)
            .await;
        repair_loop.abort();
        result.map_err(NodeError::from)
    }

    /// Periodically drain the pending-repair queue, replay the mirror
    /// rows, and refresh the gauges. Tasks that fail again go back on the
    /// queue for the next tick.
    fn spawn_repair_loop(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let store = Arc::clone(&self.store);
        let reconciler = Reconciler::new(Arc::clone(&self.store), Arc::clone(&self.clock));
        let period = Duration::from_secs(self.config.repair_interval_secs.max(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;

                let tasks = state.repairs.drain();
                if !tasks.is_empty() {
                    debug!(tasks = tasks.len(), "running mirror repair pass");
                    let summary = reconciler.repair(tasks);
                    state.metrics.mirror_repairs.inc_by(summary.repaired);
                    if !summary.failed.is_empty() {
                        state
                            .repairs
                            .push_all(summary.failed.into_iter().map(|(t, _)| t).collect());
                    }
                }
                state.metrics.pending_repairs.set(state.repairs.len() as i64);

                if let Ok(active) = store.elections_by_status(ElectionStatus::Active) {
                    state.metrics.active_elections.set(active.len() as i64);
                }
            }
        })
    }
}
