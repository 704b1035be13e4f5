use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One recorded event as served by the event store.
///
/// `id` names the resource the event is about, so several records may share it.
/// Fields the dashboard does not know about are kept in `payload` and written back
/// out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Seconds since the unix epoch.
    pub timestamp: i64,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl EventRecord {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            timestamp,
            payload: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}
