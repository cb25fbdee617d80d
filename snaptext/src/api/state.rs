use std::sync::Arc;

use crate::config::Config;
use crate::extract::local::LocalOcrProvider;
use crate::extract::remote::GeminiExtractor;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub remote: Arc<GeminiExtractor>,
    pub local: Arc<LocalOcrProvider>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config, remote: GeminiExtractor, local: LocalOcrProvider) -> Self {
        let sessions = SessionStore::new(config.sessions.capacity);
        Self {
            config: Arc::new(config),
            remote: Arc::new(remote),
            local: Arc::new(local),
            sessions: Arc::new(sessions),
        }
    }
}
