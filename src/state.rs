use std::sync::Arc;

use crate::backend::BackendClient;
use crate::session::SessionSettings;

/// Shared state for page loaders and form actions.
#[derive(Clone)]
pub struct AppState {
    pub(crate) backend: Arc<BackendClient>,
    pub(crate) settings: SessionSettings,
}

impl AppState {
    #[must_use]
    pub fn new(backend: BackendClient, settings: SessionSettings) -> Self {
        Self {
            backend: Arc::new(backend),
            settings,
        }
    }

    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }
}
