//! Google Drive v3 access.
//!
//! `DriveApi` is the provider capability the rest of the crate depends on;
//! `DriveClient` implements it over `reqwest`.

pub mod client;
pub mod models;

use crate::error::SyncError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::path::Path;

pub use client::DriveClient;
pub use models::{FileMetadata, FileSummary};

/// Lazy, finite, non-restartable sequence of content chunks.
pub type ByteStream = BoxStream<'static, Result<Bytes, SyncError>>;

#[async_trait]
pub trait DriveApi: Send + Sync {
    /// First page of the user's files, at most `page_size` entries.
    async fn list_files(
        &self,
        access_token: &str,
        page_size: u32,
    ) -> Result<Vec<FileSummary>, SyncError>;

    async fn get_metadata(
        &self,
        access_token: &str,
        file_id: &str,
    ) -> Result<FileMetadata, SyncError>;

    async fn download(&self, access_token: &str, file_id: &str) -> Result<ByteStream, SyncError>;

    /// Create a file named `name` with the content at `content`; returns its id.
    async fn create_file(
        &self,
        access_token: &str,
        name: &str,
        content: &Path,
    ) -> Result<String, SyncError>;
}
