use crate::error::SyncError;
use crate::service::session::{SessionData, SessionStore};

use async_trait::async_trait;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Public messages handled by the session actor.
#[derive(Debug)]
pub enum SessionActorMessage {
    /// Fetch a live session; expired entries are dropped and reported as absent.
    Load(String, RpcReplyPort<Option<SessionData>>),
    /// Replace a session's data and restart its lifetime.
    Save { id: String, data: SessionData },
    /// Forget a session entirely.
    Clear(String),
}

/// Handle for interacting with the session actor.
#[derive(Clone)]
pub struct SessionHandle {
    actor: ActorRef<SessionActorMessage>,
}

#[async_trait]
impl SessionStore for SessionHandle {
    async fn load(&self, session_id: &str) -> Result<Option<SessionData>, SyncError> {
        ractor::call!(self.actor, SessionActorMessage::Load, session_id.to_string())
            .map_err(|e| SyncError::Session(format!("Load RPC failed: {e}")))
    }

    async fn save(&self, session_id: &str, data: SessionData) -> Result<(), SyncError> {
        ractor::cast!(
            self.actor,
            SessionActorMessage::Save {
                id: session_id.to_string(),
                data
            }
        )
        .map_err(|e| SyncError::Session(format!("Save cast failed: {e}")))
    }

    async fn clear(&self, session_id: &str) -> Result<(), SyncError> {
        ractor::cast!(self.actor, SessionActorMessage::Clear(session_id.to_string()))
            .map_err(|e| SyncError::Session(format!("Clear cast failed: {e}")))
    }
}

struct SessionEntry {
    data: SessionData,
    expires_at: Instant,
}

/// Internal state held by the ractor-driven session actor
struct SessionActorState {
    sessions: HashMap<String, SessionEntry>,
    ttl: Duration,
    pending_ttl: Duration,
}

impl SessionActorState {
    /// Sessions without a credential only carry an in-flight authorization.
    fn lifetime(&self, data: &SessionData) -> Duration {
        if data.is_authenticated() {
            self.ttl
        } else {
            self.pending_ttl.min(self.ttl)
        }
    }
}

/// ractor-based session actor
struct SessionActor;

#[ractor::async_trait]
impl Actor for SessionActor {
    type Msg = SessionActorMessage;
    type State = SessionActorState;
    type Arguments = (Duration, Duration);

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        (ttl, pending_ttl): Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        info!(
            ttl_secs = ttl.as_secs(),
            pending_ttl_secs = pending_ttl.as_secs(),
            "SessionActor started"
        );
        Ok(SessionActorState {
            sessions: HashMap::new(),
            ttl,
            pending_ttl,
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let now = Instant::now();
        match message {
            SessionActorMessage::Load(id, rp) => {
                let live = match state.sessions.get(&id) {
                    Some(entry) if entry.expires_at > now => Some(entry.data.clone()),
                    Some(_) => {
                        state.sessions.remove(&id);
                        debug!("session expired on load");
                        None
                    }
                    None => None,
                };
                let _ = rp.send(live);
            }
            SessionActorMessage::Save { id, data } => {
                state.sessions.retain(|_, entry| entry.expires_at > now);
                let expires_at = now + state.lifetime(&data);
                state
                    .sessions
                    .insert(id, SessionEntry { data, expires_at });
                debug!(live_sessions = state.sessions.len(), "session saved");
            }
            SessionActorMessage::Clear(id) => {
                let removed = state.sessions.remove(&id).is_some();
                debug!(removed, "session cleared");
            }
        }
        Ok(())
    }
}

/// Async spawn of the session actor and return a handle.
///
/// Authenticated sessions live for `ttl` after their last save; sessions
/// holding only an in-flight authorization live for `pending_ttl`.
pub async fn spawn(ttl: Duration, pending_ttl: Duration) -> Result<SessionHandle, SyncError> {
    let (actor, _jh) = Actor::spawn(None, SessionActor, (ttl, pending_ttl))
        .await
        .map_err(|e| SyncError::Session(format!("failed to spawn SessionActor: {e}")))?;
    Ok(SessionHandle { actor })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google_oauth::credentials::Credential;

    fn credential() -> Credential {
        Credential {
            access_token: "ya29.token".into(),
            refresh_token: Some("1//refresh".into()),
            token_uri: "https://oauth2.googleapis.com/token".into(),
            client_id: "cid".into(),
            client_secret: "secret".into(),
            scopes: ["https://www.googleapis.com/auth/drive".to_string()].into(),
        }
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = spawn(Duration::from_secs(60), Duration::from_secs(60)).await.unwrap();
        let data = SessionData {
            credential: Some(credential()),
            ..Default::default()
        };
        store.save("s1", data.clone()).await.unwrap();

        assert_eq!(store.load("s1").await.unwrap(), Some(data));
        assert_eq!(store.load("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_forgets_the_session() {
        let store = spawn(Duration::from_secs(60), Duration::from_secs(60)).await.unwrap();
        store.save("s1", SessionData::default()).await.unwrap();
        store.clear("s1").await.unwrap();
        assert_eq!(store.load("s1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_overwrites_previous_credential() {
        let store = spawn(Duration::from_secs(60), Duration::from_secs(60)).await.unwrap();
        let mut first = credential();
        first.access_token = "first".into();
        store
            .save("s1", SessionData { credential: Some(first), ..Default::default() })
            .await
            .unwrap();
        store
            .save("s1", SessionData { credential: Some(credential()), ..Default::default() })
            .await
            .unwrap();

        let loaded = store.load("s1").await.unwrap().unwrap();
        assert_eq!(loaded.credential.unwrap().access_token, "ya29.token");
    }

    #[tokio::test]
    async fn sessions_expire_after_ttl() {
        let store = spawn(Duration::from_millis(50), Duration::from_millis(50))
            .await
            .unwrap();
        store
            .save("s1", SessionData { credential: Some(credential()), ..Default::default() })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(store.load("s1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn pending_authorizations_expire_before_signed_in_sessions() {
        let store = spawn(Duration::from_secs(60), Duration::from_millis(50))
            .await
            .unwrap();
        let pending = SessionData {
            oauth_state: Some("state".into()),
            pkce_verifier: Some("verifier".into()),
            ..Default::default()
        };
        let signed_in = SessionData {
            credential: Some(credential()),
            ..Default::default()
        };
        store.save("pending", pending).await.unwrap();
        store.save("signed-in", signed_in.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(store.load("pending").await.unwrap(), None);
        assert_eq!(store.load("signed-in").await.unwrap(), Some(signed_in));
    }
}
