use std::sync::Arc;

use super::config::SessionSettings;
use super::traits::TokenService;

/// State handed to [`session_layer`](super::session_layer).
pub struct SessionState<T> {
    pub(crate) tokens: Arc<T>,
    pub(crate) settings: SessionSettings,
}

impl<T: TokenService> SessionState<T> {
    #[must_use]
    pub fn new(tokens: Arc<T>, settings: SessionSettings) -> Self {
        Self { tokens, settings }
    }
}

// Manual Clone: avoid derive adding a `T: Clone` bound.
impl<T> Clone for SessionState<T> {
    fn clone(&self) -> Self {
        Self {
            tokens: self.tokens.clone(),
            settings: self.settings.clone(),
        }
    }
}
