use serde::{Deserialize, Serialize};

/// One listing entry, serialized back to the browser unchanged.
/// refer to https://developers.google.com/drive/api/reference/rest/v3/files#File
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// Decimal string; absent for folders and Google Docs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl FileSummary {
    pub fn size_bytes(&self) -> Option<i64> {
        self.size.as_deref().and_then(|s| s.parse().ok())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: Option<String>,
    pub name: Option<String>,
    pub mime_type: Option<String>,
}

/// refer to https://developers.google.com/drive/api/reference/rest/v3/files/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileList {
    #[serde(default)]
    pub(crate) files: Vec<FileSummary>,
    pub(crate) next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedFile {
    pub(crate) id: String,
}

/// Drive API error envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct DriveError {
    pub(crate) error: DriveErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DriveErrorBody {
    #[serde(default)]
    pub(crate) code: u16,
    pub(crate) message: String,
}
