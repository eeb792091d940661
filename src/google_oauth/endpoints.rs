use crate::config::DRIVE_SCOPE;
use crate::error::SyncError;
use crate::google_oauth::credentials::Credential;
use crate::google_oauth::secrets::ClientSecrets;

use oauth2::{
    AuthUrl, AuthorizationCode, Client as OAuth2Client, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope,
    StandardRevocableToken, TokenUrl,
    basic::{
        BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
        BasicTokenResponse,
    },
};
use tracing::info;
use url::Url;

/// Everything the callback needs to finish what `authorize_url` started.
#[derive(Debug)]
pub struct PendingAuthorization {
    pub url: Url,
    pub csrf_state: CsrfToken,
    pub pkce_verifier: PkceCodeVerifier,
}

/// Stateless Google OAuth Endpoints.
pub struct GoogleOauthEndpoints;

impl GoogleOauthEndpoints {
    /// Build the consent-screen URL for offline Drive access.
    pub fn authorize_url(
        secrets: &ClientSecrets,
        redirect_url: &Url,
    ) -> Result<PendingAuthorization, SyncError> {
        let client = build_oauth2_client(secrets, redirect_url)?;
        let (challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (url, csrf_state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(DRIVE_SCOPE.to_string()))
            .add_extra_param("access_type", "offline")
            .add_extra_param("include_granted_scopes", "true")
            .set_pkce_challenge(challenge)
            .url();
        Ok(PendingAuthorization {
            url,
            csrf_state,
            pkce_verifier,
        })
    }

    /// Trade an authorization code for tokens at the secrets' token endpoint.
    pub async fn exchange_authorization_code(
        secrets: &ClientSecrets,
        redirect_url: &Url,
        code: AuthorizationCode,
        pkce_verifier: PkceCodeVerifier,
        http_client: &reqwest::Client,
    ) -> Result<Credential, SyncError> {
        let client = build_oauth2_client(secrets, redirect_url)?;
        let token: BasicTokenResponse = client
            .exchange_code(code)
            .set_pkce_verifier(pkce_verifier)
            .request_async(http_client)
            .await?;
        let credential = Credential::from_token_response(&token, secrets, &[DRIVE_SCOPE]);
        info!(
            client_id = %credential.client_id,
            has_refresh_token = credential.refresh_token.is_some(),
            "authorization code exchanged"
        );
        Ok(credential)
    }
}

/// Build the Google OAuth2 client from client secrets.
fn build_oauth2_client(
    secrets: &ClientSecrets,
    redirect_url: &Url,
) -> Result<GoogleOauth2Client, SyncError> {
    let client = OAuth2Client::new(ClientId::new(secrets.client_id.clone()))
        .set_client_secret(ClientSecret::new(secrets.client_secret.clone()))
        .set_auth_uri(AuthUrl::new(secrets.auth_uri.clone())?)
        .set_token_uri(TokenUrl::new(secrets.token_uri.clone())?)
        .set_redirect_uri(RedirectUrl::from_url(redirect_url.clone()));
    Ok(client)
}

type GoogleOauth2Client = OAuth2Client<
    BasicErrorResponse,
    BasicTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;
