use crate::config::Config;
use crate::db::FileCache;
use crate::drive::DriveApi;
use crate::error::SyncError;
use crate::handlers::{files, google_oauth, pages};
use crate::service::gateway::StorageGateway;
use crate::service::session::SessionStore;
use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct SyncState {
    pub sessions: Arc<dyn SessionStore>,
    pub gateway: StorageGateway,
    pub http: reqwest::Client,
    pub client_secrets_file: PathBuf,
    pub redirect_url: Url,
    pub cookie_key: Key,
    pub insecure_cookie: bool,
    pub session_ttl_secs: u64,
    pub max_upload_bytes: usize,
}

impl SyncState {
    pub fn new(
        cfg: &Config,
        sessions: Arc<dyn SessionStore>,
        drive: Arc<dyn DriveApi>,
        cache: FileCache,
        http: reqwest::Client,
    ) -> Result<Self, SyncError> {
        Ok(Self {
            sessions,
            gateway: StorageGateway::new(drive, cache),
            http,
            client_secrets_file: cfg.client_secrets_file.clone(),
            redirect_url: cfg.redirect_url()?,
            cookie_key: cfg.cookie_key(),
            insecure_cookie: cfg.insecure_cookie,
            session_ttl_secs: cfg.session_ttl_secs,
            max_upload_bytes: cfg.max_upload_bytes,
        })
    }
}

impl FromRef<SyncState> for Key {
    fn from_ref(state: &SyncState) -> Self {
        state.cookie_key.clone()
    }
}

pub fn sync_router(state: SyncState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/", get(pages::index))
        .route("/login", get(pages::login))
        .route("/dashboard", get(pages::dashboard))
        .route("/static/js/script.js", get(pages::dashboard_script))
        .route("/authorize", get(google_oauth::authorize))
        .route("/oauth2callback", get(google_oauth::oauth2_callback))
        .route("/logout", get(google_oauth::logout))
        .route("/api/files", get(files::list_files))
        .route("/api/sync/download/{file_id}", get(files::download_file))
        .route(
            "/api/sync/upload",
            post(files::upload_file).layer(upload_limit),
        )
        .with_state(state)
}
