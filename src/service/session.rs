use crate::error::SyncError;
use crate::google_oauth::credentials::Credential;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Server-side state of one browser session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionData {
    /// CSRF state issued by `/authorize`, consumed by the callback.
    pub oauth_state: Option<String>,
    pub pkce_verifier: Option<String>,
    pub credential: Option<Credential>,
}

impl SessionData {
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }
}

/// Storage for session state keyed by the id carried in the session cookie.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<SessionData>, SyncError>;

    async fn save(&self, session_id: &str, data: SessionData) -> Result<(), SyncError>;

    async fn clear(&self, session_id: &str) -> Result<(), SyncError>;
}
