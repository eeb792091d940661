use crate::drive::FileSummary;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CachedFileRecord {
    #[sqlx(rename = "id")]
    pub remote_id: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub size: Option<i64>,
    /// Never populated; always the empty string.
    pub last_modified: Option<String>,
}

impl From<&FileSummary> for CachedFileRecord {
    fn from(f: &FileSummary) -> Self {
        Self {
            remote_id: f.id.clone(),
            name: f.name.clone(),
            mime_type: Some(f.mime_type.clone()),
            size: f.size_bytes(),
            last_modified: Some(String::new()),
        }
    }
}
