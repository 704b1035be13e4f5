use event_client::{EventStore, StoreError};
use serde::Deserialize;
use shared::{
    domain::EventRecord,
    protocol::{ReadRequest, SearchRequest},
};
use thiserror::Error;

use crate::{helpers::url_join, ordering::order_for_display, view_model, view_model::ViewModel};

/// Why a page could not be produced. Every reason ends in a redirect.
#[derive(Debug, Error)]
pub enum FailureReason {
    #[error("event store call failed: {0}")]
    Remote(#[from] StoreError),
    #[error("missing required input: {0}")]
    MissingInput(&'static str),
}

/// Where a failed request is sent instead of a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Root,
    SearchForm,
}

impl Fallback {
    pub fn location(self, base_path: &str) -> String {
        match self {
            Self::Root => "/".to_string(),
            Self::SearchForm => url_join(base_path, "search"),
        }
    }
}

/// Raw search form fields. The type filter is posted as `type`; `typ` is read as
/// well and only used when `type` is blank.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub rid: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub typ: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchSubmission {
    /// A record id was given; show that event and skip searching.
    JumpToEvent(String),
    /// Neither filter was given.
    Empty,
    Query { rid: String, kind: String },
}

impl SearchSubmission {
    pub fn from_form(form: SearchForm) -> Self {
        if !form.id.is_empty() {
            return Self::JumpToEvent(form.id);
        }
        let kind = if form.kind.is_empty() { form.typ } else { form.kind };
        if form.rid.is_empty() && kind.is_empty() {
            return Self::Empty;
        }
        Self::Query {
            rid: form.rid,
            kind,
        }
    }
}

async fn search_ordered(
    store: &dyn EventStore,
    request: &SearchRequest,
) -> Result<Vec<EventRecord>, FailureReason> {
    let mut records = store.search(request).await?.records;
    order_for_display(&mut records);
    Ok(records)
}

pub async fn index(store: &dyn EventStore) -> Result<ViewModel, FailureReason> {
    let records = search_ordered(store, &SearchRequest::newest_first()).await?;
    Ok(view_model::index(records))
}

pub async fn latest(store: &dyn EventStore) -> Result<ViewModel, FailureReason> {
    let records = search_ordered(store, &SearchRequest::newest_first()).await?;
    Ok(view_model::latest(records))
}

pub async fn search_results(
    store: &dyn EventStore,
    rid: &str,
    kind: &str,
) -> Result<ViewModel, FailureReason> {
    let records = search_ordered(store, &SearchRequest::filtered(rid, kind)).await?;
    Ok(view_model::results(rid, kind, records))
}

// TODO: limit/offset once the store supports paging reads.
pub async fn event(store: &dyn EventStore, id: &str) -> Result<ViewModel, FailureReason> {
    if id.is_empty() {
        return Err(FailureReason::MissingInput("event id"));
    }
    let response = store.read(&ReadRequest { id: id.to_string() }).await?;
    Ok(view_model::event(id, response.record))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
