use std::sync::Arc;

use event_client::EventStore;

use crate::render::PageRenderer;

/// Shared by every request; nothing in here changes after startup.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Arc<dyn EventStore>,
    pub(crate) renderer: Arc<dyn PageRenderer>,
    pub(crate) base_path: String,
}
