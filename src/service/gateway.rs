use crate::db::{CachedFileRecord, FileCache};
use crate::drive::{ByteStream, DriveApi, FileSummary};
use crate::error::SyncError;
use crate::google_oauth::credentials::Credential;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Only the first page is ever requested.
pub const LIST_PAGE_SIZE: u32 = 50;
pub const FALLBACK_DOWNLOAD_NAME: &str = "downloaded_file";

/// File content on its way to the browser.
pub struct Download {
    pub filename: String,
    pub mime_type: Option<String>,
    pub content: ByteStream,
}

/// An uploaded file part staged on local disk. The temporary file is removed
/// when this value is dropped, whichever way the upload ends.
pub struct StagedUpload {
    filename: String,
    file: NamedTempFile,
    writer: tokio::fs::File,
}

impl StagedUpload {
    pub fn create(filename: &str) -> Result<Self, SyncError> {
        if filename.is_empty() {
            return Err(SyncError::BadRequest("No selected file".to_string()));
        }
        let file = tempfile::Builder::new()
            .prefix("cloudsync-upload-")
            .tempfile()?;
        let writer = tokio::fs::File::from_std(file.as_file().try_clone()?);
        Ok(Self {
            filename: filename.to_string(),
            file,
            writer,
        })
    }

    pub async fn append(&mut self, chunk: &[u8]) -> Result<(), SyncError> {
        self.writer.write_all(chunk).await?;
        Ok(())
    }

    pub async fn finish(&mut self) -> Result<(), SyncError> {
        self.writer.flush().await?;
        self.writer.sync_all().await?;
        Ok(())
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// The three Drive operations the HTTP surface needs, with cache side effects.
#[derive(Clone)]
pub struct StorageGateway {
    drive: Arc<dyn DriveApi>,
    cache: FileCache,
}

impl StorageGateway {
    pub fn new(drive: Arc<dyn DriveApi>, cache: FileCache) -> Self {
        Self { drive, cache }
    }

    #[cfg(test)]
    fn cache(&self) -> &FileCache {
        &self.cache
    }

    pub async fn list_files(&self, cred: &Credential) -> Result<Vec<FileSummary>, SyncError> {
        let mut files = self
            .drive
            .list_files(&cred.access_token, LIST_PAGE_SIZE)
            .await?;
        files.truncate(LIST_PAGE_SIZE as usize);

        let records: Vec<CachedFileRecord> = files.iter().map(CachedFileRecord::from).collect();
        self.cache.upsert_many(&records).await?;
        debug!(count = files.len(), "file listing cached");
        Ok(files)
    }

    pub async fn download_file(
        &self,
        cred: &Credential,
        file_id: &str,
    ) -> Result<Download, SyncError> {
        let meta = self.drive.get_metadata(&cred.access_token, file_id).await?;
        let filename = meta
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| FALLBACK_DOWNLOAD_NAME.to_string());
        let content = self.drive.download(&cred.access_token, file_id).await?;
        info!(file_id, filename = %filename, "download started");
        Ok(Download {
            filename,
            mime_type: meta.mime_type,
            content,
        })
    }

    /// Send a staged upload to Drive; the staging file is gone when this returns.
    pub async fn upload_file(
        &self,
        cred: &Credential,
        upload: StagedUpload,
    ) -> Result<String, SyncError> {
        let file_id = self
            .drive
            .create_file(&cred.access_token, upload.filename(), upload.path())
            .await?;
        info!(file_id = %file_id, filename = upload.filename(), "upload finished");
        Ok(file_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::FileMetadata;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::{StreamExt, TryStreamExt, stream};
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeDrive {
        listing: Vec<FileSummary>,
        name: Option<String>,
        fail_metadata: bool,
        fail_create: bool,
        seen_upload: Mutex<Option<(String, PathBuf, Vec<u8>)>>,
    }

    #[async_trait]
    impl DriveApi for FakeDrive {
        async fn list_files(&self, _: &str, _: u32) -> Result<Vec<FileSummary>, SyncError> {
            Ok(self.listing.clone())
        }

        async fn get_metadata(&self, _: &str, id: &str) -> Result<FileMetadata, SyncError> {
            if self.fail_metadata {
                return Err(SyncError::RemoteApi(format!("File not found: {id}.")));
            }
            Ok(FileMetadata {
                id: Some(id.to_string()),
                name: self.name.clone(),
                mime_type: Some("text/plain".into()),
            })
        }

        async fn download(&self, _: &str, _: &str) -> Result<ByteStream, SyncError> {
            let chunks = vec![Ok(Bytes::from_static(b"ab")), Ok(Bytes::from_static(b"cd"))];
            Ok(stream::iter(chunks).boxed())
        }

        async fn create_file(&self, _: &str, name: &str, content: &Path) -> Result<String, SyncError> {
            let bytes = std::fs::read(content)?;
            *self.seen_upload.lock().unwrap() = Some((name.to_string(), content.to_path_buf(), bytes));
            if self.fail_create {
                return Err(SyncError::RemoteApi("quota exceeded".into()));
            }
            Ok("remote-1".into())
        }
    }

    fn credential() -> Credential {
        Credential {
            access_token: "tok".into(),
            refresh_token: None,
            token_uri: "https://oauth2.googleapis.com/token".into(),
            client_id: "cid".into(),
            client_secret: "secret".into(),
            scopes: Default::default(),
        }
    }

    fn summary(i: usize) -> FileSummary {
        FileSummary {
            id: format!("f{i}"),
            name: format!("file{i}.txt"),
            mime_type: "text/plain".into(),
            size: Some(i.to_string()),
        }
    }

    async fn gateway(drive: FakeDrive) -> (StorageGateway, Arc<FakeDrive>) {
        let drive = Arc::new(drive);
        let cache = FileCache::in_memory().await.unwrap();
        (StorageGateway::new(drive.clone(), cache), drive)
    }

    #[tokio::test]
    async fn listing_is_capped_and_cached() {
        let (gw, _) = gateway(FakeDrive {
            listing: (0..60).map(summary).collect(),
            ..Default::default()
        })
        .await;

        let files = gw.list_files(&credential()).await.unwrap();
        assert_eq!(files.len(), 50);
        let rows = gw.cache().list().await.unwrap();
        assert_eq!(rows.len(), 50);
        assert!(rows.iter().all(|r| r.last_modified.as_deref() == Some("")));
    }

    #[tokio::test]
    async fn download_falls_back_to_default_name() {
        let (gw, _) = gateway(FakeDrive::default()).await;
        let download = gw.download_file(&credential(), "f1").await.unwrap();
        assert_eq!(download.filename, FALLBACK_DOWNLOAD_NAME);
        let body: Vec<Bytes> = download.content.try_collect().await.unwrap();
        assert_eq!(body.concat(), b"abcd");
    }

    #[tokio::test]
    async fn download_metadata_failure_is_remote_error() {
        let (gw, _) = gateway(FakeDrive {
            fail_metadata: true,
            ..Default::default()
        })
        .await;
        let err = gw.download_file(&credential(), "f9").await.err().unwrap();
        assert!(matches!(err, SyncError::RemoteApi(_)));
    }

    #[test]
    fn empty_filename_is_rejected_before_staging() {
        assert!(matches!(
            StagedUpload::create(""),
            Err(SyncError::BadRequest(msg)) if msg == "No selected file"
        ));
    }

    #[tokio::test]
    async fn staged_file_is_removed_after_success_and_failure() {
        for fail_create in [false, true] {
            let (gw, drive) = gateway(FakeDrive {
                fail_create,
                ..Default::default()
            })
            .await;
            let mut upload = StagedUpload::create("notes.txt").unwrap();
            upload.append(b"hello ").await.unwrap();
            upload.append(b"world").await.unwrap();
            upload.finish().await.unwrap();

            let result = gw.upload_file(&credential(), upload).await;
            assert_eq!(result.is_err(), fail_create);

            let (name, path, bytes) = drive.seen_upload.lock().unwrap().take().unwrap();
            assert_eq!(name, "notes.txt");
            assert_eq!(bytes, b"hello world");
            assert!(!path.exists());
        }
    }
}
