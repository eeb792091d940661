use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use oauth2::CsrfToken;
use time::Duration;

use crate::error::SyncError;
use crate::google_oauth::credentials::Credential;
use crate::router::SyncState;
use crate::service::session::SessionData;

pub const SESSION_COOKIE: &str = "cloudsync_session";

/// The browser's session: its id (when the cookie is present and decrypts)
/// and the server-side data behind it.
#[derive(Debug, Clone, Default)]
pub struct BrowserSession {
    pub id: Option<String>,
    pub data: SessionData,
}

impl BrowserSession {
    /// Existing id, or a freshly minted one for a browser without a session.
    pub fn id_or_new(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| CsrfToken::new_random_len(32).secret().to_string())
    }
}

impl FromRequestParts<SyncState> for BrowserSession {
    type Rejection = SyncError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SyncState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        let Some(id) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
            return Ok(Self::default());
        };
        let data = state.sessions.load(&id).await?.unwrap_or_default();
        Ok(Self { id: Some(id), data })
    }
}

/// Credential of an authenticated session; rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct RequireCredential(pub Credential);

impl FromRequestParts<SyncState> for RequireCredential {
    type Rejection = SyncError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SyncState,
    ) -> Result<Self, Self::Rejection> {
        let session = BrowserSession::from_request_parts(parts, state).await?;
        session
            .data
            .credential
            .map(Self)
            .ok_or(SyncError::Unauthorized)
    }
}

pub fn session_cookie(id: String, state: &SyncState) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .secure(!state.insecure_cookie)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(state.session_ttl_secs as i64))
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
