use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("store error: {0}")]
    Store(#[from] votechain_store::StoreError),

    #[error("RPC server error: {0}")]
    Rpc(#[from] votechain_rpc::RpcError),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid listen address: {0}")]
    ListenAddr(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
