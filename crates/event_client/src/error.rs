use shared::error::RemoteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid event store url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("event store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("event {id} not found")]
    NotFound { id: String },
    #[error("event store returned {status}: {source}")]
    Remote {
        status: u16,
        #[source]
        source: RemoteError,
    },
    #[error("event store returned {status}")]
    Status { status: u16 },
    #[error("event store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
