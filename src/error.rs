use axum::{Json, http::StatusCode, response::IntoResponse};
use oauth2::basic::BasicErrorResponseType;
use oauth2::reqwest::Error as ReqwestClientError;
use oauth2::{HttpClientError, RequestTokenError, StandardErrorResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::{error, warn};

#[derive(Debug, ThisError)]
pub enum SyncError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    RemoteApi(String),

    #[error("OAuth flow error: {0}")]
    OauthFlow(String),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::RemoteApi(e.to_string())
    }
}

impl
    From<
        RequestTokenError<
            HttpClientError<ReqwestClientError>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    > for SyncError
{
    fn from(
        e: RequestTokenError<
            HttpClientError<ReqwestClientError>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    ) -> Self {
        match e {
            RequestTokenError::ServerResponse(err) => {
                let detail = err
                    .error_description()
                    .map(|d| format!(": {d}"))
                    .unwrap_or_default();
                SyncError::RemoteApi(format!("token endpoint rejected the code ({}){detail}", err.error()))
            }
            RequestTokenError::Request(req_e) => {
                SyncError::RemoteApi(format!("token request failed: {}", req_e))
            }
            RequestTokenError::Parse(parse_err, _body) => SyncError::RemoteApi(format!(
                "unparseable token response: {}",
                parse_err.into_inner()
            )),
            RequestTokenError::Other(s) => SyncError::RemoteApi(s),
        }
    }
}

/// JSON error body returned by every API route.
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
}

impl IntoResponse for SyncError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            SyncError::Unauthorized => StatusCode::UNAUTHORIZED,
            SyncError::BadRequest(_) | SyncError::OauthFlow(_) => StatusCode::BAD_REQUEST,
            SyncError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            SyncError::Configuration(msg) => {
                error!(error = %msg, "configuration error");
                return (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()).into_response();
            }
            SyncError::RemoteApi(_)
            | SyncError::Database(_)
            | SyncError::Io(_)
            | SyncError::Session(_)
            | SyncError::UrlParse(_)
            | SyncError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else if status != StatusCode::UNAUTHORIZED {
            warn!(error = %self, "request rejected");
        }

        let body = match self {
            SyncError::BadRequest(msg)
            | SyncError::PayloadTooLarge(msg)
            | SyncError::OauthFlow(msg)
            | SyncError::RemoteApi(msg) => msg,
            other => other.to_string(),
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::header::CONTENT_TYPE;

    async fn render(err: SyncError) -> (StatusCode, String, String) {
        let resp = err.into_response();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn unauthorized_is_401_json() {
        let (status, ct, body) = render(SyncError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(ct.starts_with("application/json"));
        assert_eq!(body, r#"{"error":"Unauthorized"}"#);
    }

    #[tokio::test]
    async fn configuration_is_plain_text_500() {
        let (status, ct, body) = render(SyncError::Configuration(
            "Error: credentials.json not found on server.".into(),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(ct.starts_with("text/plain"));
        assert_eq!(body, "Error: credentials.json not found on server.");
    }

    #[tokio::test]
    async fn remote_api_exposes_raw_message() {
        let (status, _, body) = render(SyncError::RemoteApi("File not found: f9.".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"error":"File not found: f9."}"#);
    }

    #[tokio::test]
    async fn oauth_flow_is_bad_request() {
        let (status, _, body) = render(SyncError::OauthFlow("CSRF state mismatch".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"error":"CSRF state mismatch"}"#);
    }
}
