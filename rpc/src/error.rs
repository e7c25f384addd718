//! RPC error types and their HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use votechain_coordinator::SubmitError;
use votechain_store::StoreError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("voter has already voted in this election")]
    AlreadyVoted,

    #[error("ledger error: {0}")]
    Ledger(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::NotFound(_) => StatusCode::NOT_FOUND,
            RpcError::AlreadyVoted => StatusCode::CONFLICT,
            RpcError::Ledger(_) | RpcError::Store(_) | RpcError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for RpcError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => RpcError::NotFound(what),
            other => RpcError::Store(other.to_string()),
        }
    }
}

/// Note: [`SubmitError::Ledger`] drops the committed receipts here; the
/// submit handler queues them for repair before converting.
impl From<SubmitError> for RpcError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Validation(msg) => RpcError::InvalidRequest(msg),
            SubmitError::NotFound(what) => RpcError::NotFound(what),
            SubmitError::AlreadyVoted => RpcError::AlreadyVoted,
            SubmitError::Ledger { source, .. } => RpcError::Ledger(source.to_string()),
            SubmitError::Store(e) => e.into(),
        }
    }
}
