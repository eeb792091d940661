use crate::config::{GOOGLE_AUTH_URL, GOOGLE_TOKEN_URI};
use crate::error::SyncError;
use serde::Deserialize;
use std::path::Path;

/// Client identity read from a Google client-secrets file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// The console exports either a `web` or an `installed` application section.
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    web: Option<ClientSecrets>,
    installed: Option<ClientSecrets>,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URL.as_str().to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.as_str().to_string()
}

impl ClientSecrets {
    /// Read the secrets file. Re-read on every authorization so the file can
    /// be dropped in without a restart.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        if !path.exists() {
            return Err(SyncError::Configuration(format!(
                "Error: {display_name} not found on server."
            )));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Configuration(format!("Error: cannot read {display_name}: {e}"))
        })?;
        let file: ClientSecretsFile = serde_json::from_str(&contents).map_err(|e| {
            SyncError::Configuration(format!("Error: malformed {display_name}: {e}"))
        })?;

        file.web.or(file.installed).ok_or_else(|| {
            SyncError::Configuration(format!(
                "Error: {display_name} has neither a `web` nor an `installed` section."
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientSecrets::load(&dir.path().join("credentials.json")).unwrap_err();
        match err {
            SyncError::Configuration(msg) => {
                assert_eq!(msg, "Error: credentials.json not found on server.")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn web_section_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(
            &path,
            r#"{"web":{"client_id":"abc.apps.googleusercontent.com","client_secret":"s3cr3t",
                "auth_uri":"https://accounts.google.com/o/oauth2/auth",
                "token_uri":"https://oauth2.googleapis.com/token",
                "redirect_uris":["http://localhost:5000/oauth2callback"]}}"#,
        )
        .unwrap();
        let secrets = ClientSecrets::load(&path).unwrap();
        assert_eq!(secrets.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(secrets.client_secret, "s3cr3t");
        assert_eq!(secrets.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn installed_section_gets_default_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");
        fs::write(&path, r#"{"installed":{"client_id":"i","client_secret":"s"}}"#).unwrap();
        let secrets = ClientSecrets::load(&path).unwrap();
        assert_eq!(secrets.auth_uri, GOOGLE_AUTH_URL.as_str());
        assert_eq!(secrets.token_uri, GOOGLE_TOKEN_URI.as_str());
    }

    #[test]
    fn file_without_sections_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"other":{}}"#).unwrap();
        assert!(matches!(
            ClientSecrets::load(&path),
            Err(SyncError::Configuration(_))
        ));
    }
}
