use crate::drive::FileSummary;
use crate::middleware::session::RequireCredential;
use crate::service::gateway::StagedUpload;
use crate::{SyncError, router::SyncState};
use axum::{
    Json,
    body::Body,
    extract::{
        Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub status: &'static str,
    pub file_id: String,
}

/// GET /api/files
pub async fn list_files(
    State(state): State<SyncState>,
    RequireCredential(cred): RequireCredential,
) -> Result<Json<Vec<FileSummary>>, SyncError> {
    Ok(Json(state.gateway.list_files(&cred).await?))
}

/// GET /api/sync/download/{file_id}
pub async fn download_file(
    State(state): State<SyncState>,
    RequireCredential(cred): RequireCredential,
    Path(file_id): Path<String>,
) -> Result<Response, SyncError> {
    let download = state.gateway.download_file(&cred, &file_id).await?;
    let content_type = download
        .mime_type
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let headers = [
        (CONTENT_TYPE, content_type),
        (CONTENT_DISPOSITION, content_disposition(&download.filename)),
    ];
    Ok((headers, Body::from_stream(download.content)).into_response())
}

/// POST /api/sync/upload (multipart field `file`)
pub async fn upload_file(
    State(state): State<SyncState>,
    RequireCredential(cred): RequireCredential,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, SyncError> {
    let no_file_part = || SyncError::BadRequest("No file part".to_string());
    let mut multipart = multipart.map_err(|_| no_file_part())?;

    let mut staged = None;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some("file") {
            continue;
        }
        // A part without a filename attribute is a plain form value, not a file.
        let Some(filename) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let mut upload = StagedUpload::create(&filename)?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(multipart_error)?
        {
            upload.append(&chunk).await?;
        }
        upload.finish().await?;
        staged = Some(upload);
        break;
    }

    let upload = staged.ok_or_else(no_file_part)?;
    let file_id = state.gateway.upload_file(&cred, upload).await?;
    Ok(Json(UploadResponse {
        status: "success",
        file_id,
    }))
}

/// Body-limit overruns keep their 413; every other multipart fault is the client's.
fn multipart_error(e: MultipartError) -> SyncError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        SyncError::PayloadTooLarge(e.body_text())
    } else {
        SyncError::BadRequest(e.body_text())
    }
}

/// `attachment` disposition with an ASCII fallback name and an RFC 5987
/// `filename*` carrying the original UTF-8 name.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    if fallback == filename {
        return format!("attachment; filename=\"{fallback}\"");
    }
    let mut encoded = String::with_capacity(filename.len() * 3);
    for b in filename.bytes() {
        if b.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&b) {
            encoded.push(b as char);
        } else {
            encoded.push_str(&format!("%{b:02X}"));
        }
    }
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_names_are_quoted() {
        assert_eq!(
            content_disposition("report 2024.pdf"),
            r#"attachment; filename="report 2024.pdf""#
        );
    }

    #[test]
    fn non_ascii_names_get_extended_parameter() {
        assert_eq!(
            content_disposition("résumé.txt"),
            r#"attachment; filename="r_sum_.txt"; filename*=UTF-8''r%C3%A9sum%C3%A9.txt"#
        );
    }

    #[test]
    fn quotes_are_not_passed_through() {
        assert_eq!(
            content_disposition("a\"b.txt"),
            r#"attachment; filename="a_b.txt"; filename*=UTF-8''a%22b.txt"#
        );
    }
}
