use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::EventRecord,
    protocol::{ReadRequest, ReadResponse, SearchRequest, SearchResponse},
};
use tokio::sync::Mutex;

use crate::{EventStore, StoreError};

/// In-process event store for tests, behind the `test-support` feature.
///
/// Records are returned oldest first unless `reverse` is set. Every call is logged
/// so tests can check what was asked of the store.
#[derive(Clone, Default)]
pub struct MemoryEventStore {
    records: Arc<Vec<EventRecord>>,
    unavailable: Option<String>,
    searches: Arc<Mutex<Vec<SearchRequest>>>,
    reads: Arc<Mutex<Vec<String>>>,
}

impl MemoryEventStore {
    pub fn new(records: impl IntoIterator<Item = EventRecord>) -> Self {
        Self {
            records: Arc::new(records.into_iter().collect()),
            ..Self::default()
        }
    }

    /// A store whose every call fails as if the backend were down.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::default()
        }
    }

    pub async fn searches(&self) -> Vec<SearchRequest> {
        self.searches.lock().await.clone()
    }

    pub async fn reads(&self) -> Vec<String> {
        self.reads.lock().await.clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        match &self.unavailable {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

fn matches(record: &EventRecord, request: &SearchRequest) -> bool {
    (request.id.is_empty() || record.id == request.id)
        && (request.kind.is_empty() || record.kind == request.kind)
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, StoreError> {
        self.searches.lock().await.push(request.clone());
        self.check_available()?;

        let mut records: Vec<EventRecord> = self
            .records
            .iter()
            .filter(|record| matches(record, request))
            .cloned()
            .collect();
        records.sort_by_key(|record| record.timestamp);
        if request.reverse {
            records.reverse();
        }
        Ok(SearchResponse { records })
    }

    async fn read(&self, request: &ReadRequest) -> Result<ReadResponse, StoreError> {
        self.reads.lock().await.push(request.id.clone());
        self.check_available()?;

        let record = self
            .records
            .iter()
            .filter(|record| record.id == request.id)
            .max_by_key(|record| record.timestamp)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                id: request.id.clone(),
            })?;
        Ok(ReadResponse { record })
    }
}
