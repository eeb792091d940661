use crate::google_oauth::endpoints::GoogleOauthEndpoints;
use crate::google_oauth::secrets::ClientSecrets;
use crate::middleware::session::{BrowserSession, clear_session_cookie, session_cookie};
use crate::{SyncError, router::SyncState};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use oauth2::{AuthorizationCode, PkceCodeVerifier};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /authorize -> redirects to Google's consent page.
pub async fn authorize(
    State(state): State<SyncState>,
    session: BrowserSession,
    jar: PrivateCookieJar,
) -> Result<Response, SyncError> {
    let secrets = ClientSecrets::load(&state.client_secrets_file)?;
    let pending = GoogleOauthEndpoints::authorize_url(&secrets, &state.redirect_url)?;

    let id = session.id_or_new();
    let mut data = session.data;
    data.oauth_state = Some(pending.csrf_state.secret().to_string());
    data.pkce_verifier = Some(pending.pkce_verifier.secret().to_string());
    state.sessions.save(&id, data).await?;

    let jar = jar.add(session_cookie(id, &state));
    info!("Dispatching OAuth redirect");
    Ok((jar, Redirect::to(pending.url.as_str())).into_response())
}

/// GET /oauth2callback -> verifies state, exchanges the code, stores the credential.
pub async fn oauth2_callback(
    State(state): State<SyncState>,
    Query(query): Query<AuthCallbackQuery>,
    session: BrowserSession,
) -> Result<Response, SyncError> {
    let Some(id) = session.id else {
        return Err(SyncError::OauthFlow("no session for OAuth callback".to_string()));
    };

    // The issued state and verifier are single-use, whatever the outcome.
    let mut data = session.data;
    let expected_state = data.oauth_state.take();
    let pkce_verifier = data.pkce_verifier.take();
    state.sessions.save(&id, data.clone()).await?;

    let (Some(expected_state), Some(pkce_verifier)) = (expected_state, pkce_verifier) else {
        return Err(SyncError::OauthFlow(
            "no authorization in progress for this session".to_string(),
        ));
    };
    if let Some(error) = query.error.as_deref() {
        return Err(SyncError::OauthFlow(format!("authorization denied: {error}")));
    }
    let Some(state_param) = query.state.as_deref() else {
        return Err(SyncError::OauthFlow("missing `state` in callback".to_string()));
    };
    if !bool::from(state_param.as_bytes().ct_eq(expected_state.as_bytes())) {
        return Err(SyncError::OauthFlow("CSRF state mismatch".to_string()));
    }
    let Some(code) = query.code else {
        return Err(SyncError::OauthFlow("missing `code` in callback".to_string()));
    };

    let secrets = ClientSecrets::load(&state.client_secrets_file)?;
    let credential = GoogleOauthEndpoints::exchange_authorization_code(
        &secrets,
        &state.redirect_url,
        AuthorizationCode::new(code),
        PkceCodeVerifier::new(pkce_verifier),
        &state.http,
    )
    .await?;

    data.credential = Some(credential);
    state.sessions.save(&id, data).await?;
    info!("OAuth callback stored credential");
    Ok(Redirect::to("/dashboard").into_response())
}

/// GET /logout -> drops the whole session and its cookie.
pub async fn logout(
    State(state): State<SyncState>,
    session: BrowserSession,
    jar: PrivateCookieJar,
) -> Result<Response, SyncError> {
    if let Some(id) = session.id.as_deref() {
        state.sessions.clear(id).await?;
        info!("session cleared on logout");
    }
    let jar = jar.remove(clear_session_cookie());
    Ok((jar, Redirect::to("/login")).into_response())
}
