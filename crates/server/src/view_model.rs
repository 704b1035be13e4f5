use std::collections::BTreeMap;

use serde::Serialize;
use shared::domain::EventRecord;

pub const LATEST: &str = "Latest";
pub const RESULTS: &str = "Results";
pub const QUERY: &str = "Query";
pub const RECORD: &str = "Record";
pub const ID: &str = "Id";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Slot {
    Records(Vec<EventRecord>),
    Record(EventRecord),
    Text(String),
}

/// Named values handed to a template for a single response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ViewModel {
    slots: BTreeMap<&'static str, Slot>,
}

impl ViewModel {
    fn with(mut self, name: &'static str, slot: Slot) -> Self {
        self.slots.insert(name, slot);
        self
    }
}

#[cfg(test)]
impl ViewModel {
    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    pub fn records(&self, name: &str) -> Option<&[EventRecord]> {
        match self.get(name)? {
            Slot::Records(records) => Some(records),
            _ => None,
        }
    }

    pub fn record(&self, name: &str) -> Option<&EventRecord> {
        match self.get(name)? {
            Slot::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            Slot::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

pub fn index(latest: Vec<EventRecord>) -> ViewModel {
    ViewModel::default().with(LATEST, Slot::Records(latest))
}

pub fn latest(latest: Vec<EventRecord>) -> ViewModel {
    ViewModel::default().with(LATEST, Slot::Records(latest))
}

pub fn search_form() -> ViewModel {
    ViewModel::default()
}

/// Both filters always appear in the description, even when empty.
pub fn query_description(rid: &str, kind: &str) -> String {
    format!("ID: {rid} Type: {kind}")
}

pub fn results(rid: &str, kind: &str, results: Vec<EventRecord>) -> ViewModel {
    ViewModel::default()
        .with(QUERY, Slot::Text(query_description(rid, kind)))
        .with(RESULTS, Slot::Records(results))
}

pub fn event(id: &str, record: EventRecord) -> ViewModel {
    ViewModel::default()
        .with(ID, Slot::Text(id.to_string()))
        .with(RECORD, Slot::Record(record))
}
