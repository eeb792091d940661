use super::models::{CreatedFile, DriveError, FileList, FileMetadata, FileSummary};
use super::{ByteStream, DriveApi};
use crate::config::{DRIVE_API_BASE, DRIVE_UPLOAD_BASE};
use crate::error::SyncError;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{CONTENT_LENGTH, LOCATION};
use serde_json::json;
use std::path::Path;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};
use url::Url;

const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, size)";
const METADATA_FIELDS: &str = "id, name, mimeType";

/// Drive v3 REST client.
#[derive(Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    api_base: Url,
    upload_base: Url,
}

impl DriveClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_urls(http, DRIVE_API_BASE.clone(), DRIVE_UPLOAD_BASE.clone())
    }

    pub fn with_base_urls(http: reqwest::Client, api_base: Url, upload_base: Url) -> Self {
        Self {
            http,
            api_base,
            upload_base,
        }
    }
}

#[async_trait]
impl DriveApi for DriveClient {
    async fn list_files(
        &self,
        access_token: &str,
        page_size: u32,
    ) -> Result<Vec<FileSummary>, SyncError> {
        let url = endpoint(&self.api_base, &["files"])?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(&[("pageSize", page_size.to_string().as_str()), ("fields", LIST_FIELDS)])
            .send()
            .await?;
        let list: FileList = ensure_success(resp).await?.json().await?;
        if list.next_page_token.is_some() {
            debug!(returned = list.files.len(), "more files available; only the first page is fetched");
        }
        Ok(list.files)
    }

    async fn get_metadata(
        &self,
        access_token: &str,
        file_id: &str,
    ) -> Result<FileMetadata, SyncError> {
        let url = endpoint(&self.api_base, &["files", file_id])?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(&[("fields", METADATA_FIELDS)])
            .send()
            .await?;
        Ok(ensure_success(resp).await?.json().await?)
    }

    async fn download(&self, access_token: &str, file_id: &str) -> Result<ByteStream, SyncError> {
        let url = endpoint(&self.api_base, &["files", file_id])?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(&[("alt", "media")])
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        debug!(file_id, content_length = ?resp.content_length(), "streaming file content");
        Ok(resp.bytes_stream().map_err(SyncError::from).boxed())
    }

    async fn create_file(
        &self,
        access_token: &str,
        name: &str,
        content: &Path,
    ) -> Result<String, SyncError> {
        let file = tokio::fs::File::open(content).await?;
        let len = file.metadata().await?.len();

        // Resumable upload: open a session carrying the metadata, then PUT the bytes.
        let mut url = endpoint(&self.upload_base, &["files"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "resumable")
            .append_pair("fields", "id");
        let session = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .header("X-Upload-Content-Length", len)
            .json(&json!({ "name": name }))
            .send()
            .await?;
        let session = ensure_success(session).await?;
        let location = session
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                SyncError::RemoteApi("resumable upload session has no Location header".to_string())
            })?
            .to_string();

        let resp = self
            .http
            .put(location)
            .bearer_auth(access_token)
            .header(CONTENT_LENGTH, len)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;
        let created: CreatedFile = ensure_success(resp).await?.json().await?;
        info!(file_id = %created.id, bytes = len, "file uploaded to Drive");
        Ok(created.id)
    }
}

/// Append path segments to a base URL, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, SyncError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SyncError::RemoteApi(format!("unusable Drive base URL: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turn a non-2xx Drive response into `RemoteApi` carrying Drive's own message.
async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<DriveError>(&body) {
        Ok(e) => format!("Drive API error {}: {}", e.error.code, e.error.message),
        Err(_) if body.is_empty() => format!("Drive API returned {status}"),
        Err(_) => format!("Drive API returned {status}: {body}"),
    };
    Err(SyncError::RemoteApi(message))
}
