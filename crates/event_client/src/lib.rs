use async_trait::async_trait;
use shared::protocol::{ReadRequest, ReadResponse, SearchRequest, SearchResponse};

pub mod error;
mod http;
#[cfg(any(test, feature = "test-support"))]
mod memory;

pub use error::StoreError;
pub use http::HttpEventStore;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryEventStore;

/// Handle to the remote event store.
///
/// Implementations are shared across requests, so every call is independent and
/// callers hold no per-call state.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, StoreError>;
    async fn read(&self, request: &ReadRequest) -> Result<ReadResponse, StoreError>;
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
