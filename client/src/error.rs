use specter_storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("not authenticated")]
    Unauthorized,

    #[error("invalid response from backend: {0}")]
    InvalidResponse(String),

    #[error("session store error: {0}")]
    Store(#[from] StoreError),
}
