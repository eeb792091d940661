use axum_extra::extract::cookie::Key;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::warn;
use url::Url;

/// Single scope requested from Google: full access to the user's drive.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

pub static GOOGLE_AUTH_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://accounts.google.com/o/oauth2/auth").expect("valid Google auth URL")
});

pub static GOOGLE_TOKEN_URI: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://oauth2.googleapis.com/token").expect("valid Google token URL")
});

pub static DRIVE_API_BASE: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://www.googleapis.com/drive/v3/").expect("valid Drive API URL")
});

pub static DRIVE_UPLOAD_BASE: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://www.googleapis.com/upload/drive/v3/").expect("valid Drive upload URL")
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub listen_addr: String,
    /// sqlx connection string for the metadata cache.
    pub database_url: String,
    /// Google client-secrets JSON downloaded from the Cloud console.
    pub client_secrets_file: PathBuf,
    /// Externally visible base URL; the OAuth redirect is `<public_url>/oauth2callback`.
    pub public_url: Url,
    /// At least 64 bytes. A random key is generated per process when unset.
    pub cookie_secret: Option<String>,
    pub insecure_cookie: bool,
    pub session_ttl_secs: u64,
    /// Lifetime of a session that has started `/authorize` but holds no credential yet.
    pub pending_auth_ttl_secs: u64,
    pub max_upload_bytes: usize,
    pub loglevel: String,
    pub proxy: Option<Url>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".to_string(),
            database_url: "sqlite:cloudsync.db".to_string(),
            client_secrets_file: PathBuf::from("credentials.json"),
            public_url: Url::parse("http://localhost:5000").expect("valid default public url"),
            cookie_secret: None,
            insecure_cookie: false,
            session_ttl_secs: 31 * 24 * 60 * 60,
            pending_auth_ttl_secs: 10 * 60,
            max_upload_bytes: 1024 * 1024 * 1024,
            loglevel: "info".to_string(),
            proxy: None,
        }
    }
}

impl Config {
    /// Defaults overlaid with `CLOUDSYNC_*` environment variables.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("CLOUDSYNC_"))
            .extract()
    }

    pub fn redirect_url(&self) -> Result<Url, url::ParseError> {
        self.public_url.join("/oauth2callback")
    }

    pub fn cookie_key(&self) -> Key {
        match self.cookie_secret.as_deref() {
            Some(secret) => Key::try_from(secret.as_bytes()).unwrap_or_else(|e| {
                warn!(error = %e, "cookie_secret unusable; sessions will not survive a restart");
                Key::generate()
            }),
            None => Key::generate(),
        }
    }
}

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::load().expect("FATAL: failed to load configuration"));
