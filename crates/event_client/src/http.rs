use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    error::RemoteError,
    protocol::{ReadRequest, ReadResponse, SearchRequest, SearchResponse},
};
use tracing::debug;
use url::Url;

use crate::{EventStore, StoreError};

/// JSON-over-HTTP client for the event store service.
///
/// Each method is a `POST {base}/event/<method>` carrying the request message as JSON.
#[derive(Debug, Clone)]
pub struct HttpEventStore {
    http: Client,
    base: Url,
}

impl HttpEventStore {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, StoreError> {
        let mut base = Url::parse(base_url.trim())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, method: &str) -> Result<Url, StoreError> {
        Ok(self.base.join(&format!("event/{method}"))?)
    }

    async fn call<Req, Rsp>(
        &self,
        method: &str,
        request: &Req,
        read_id: Option<&str>,
    ) -> Result<Rsp, StoreError>
    where
        Req: Serialize + Sync,
        Rsp: DeserializeOwned,
    {
        let url = self.endpoint(method)?;
        debug!(%url, "event store call");
        let response = self.http.post(url).json(request).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(status_error(status, &body, read_id))
    }
}

fn status_error(status: StatusCode, body: &[u8], read_id: Option<&str>) -> StoreError {
    let remote = serde_json::from_slice::<RemoteError>(body).ok();
    let not_found =
        status == StatusCode::NOT_FOUND || remote.as_ref().is_some_and(RemoteError::is_not_found);

    match (read_id, remote) {
        (Some(id), _) if not_found => StoreError::NotFound { id: id.to_string() },
        (_, Some(source)) => StoreError::Remote {
            status: status.as_u16(),
            source,
        },
        (_, None) => StoreError::Status {
            status: status.as_u16(),
        },
    }
}

#[async_trait]
impl EventStore for HttpEventStore {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, StoreError> {
        self.call("search", request, None).await
    }

    async fn read(&self, request: &ReadRequest) -> Result<ReadResponse, StoreError> {
        self.call("read", request, Some(&request.id)).await
    }
}
