use crate::google_oauth::secrets::ClientSecrets;
use oauth2::TokenResponse;
use oauth2::basic::BasicTokenResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tokens and client identifiers needed to call Drive for one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    /// Google only returns a refresh token on first consent.
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: BTreeSet<String>,
}

impl Credential {
    /// Build from a token response; falls back to the requested scopes when
    /// the provider does not echo the granted ones.
    pub fn from_token_response(
        token: &BasicTokenResponse,
        secrets: &ClientSecrets,
        requested: &[&str],
    ) -> Self {
        let scopes = match token.scopes() {
            Some(granted) => granted.iter().map(|s| s.to_string()).collect(),
            None => requested.iter().map(|s| s.to_string()).collect(),
        };
        Self {
            access_token: token.access_token().secret().clone(),
            refresh_token: token.refresh_token().map(|t| t.secret().clone()),
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes,
        }
    }
}
