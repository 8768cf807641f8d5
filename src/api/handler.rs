//! HTTP Request Handlers
//!
//! - `PUT /v1/file` stores the multipart field `file` and answers with its URL
//! - `GET /v1/:path` returns a stored file as an attachment
//! - `GET /health` reports liveness and store statistics
//! - `OPTIONS` on any route answers `200` with no body
//!
//! ## Upload TTL
//!
//! The `File-TTL` header carries the lifetime in whole minutes. A missing or
//! unparseable header falls back to the configured default; a zero or negative
//! value stores a file that is already expired.

use crate::api::error::ApiError;
use crate::service::FileService;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Header carrying the upload TTL in minutes.
pub const TTL_HEADER: &str = "File-TTL";

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub service: FileService,
    /// TTL applied when the upload carries no valid `File-TTL` header
    pub default_ttl: Duration,
}

/// Response body of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Response body of the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub objects: u64,
    pub writes: u64,
    pub reads: u64,
    pub expired: u64,
}

/// Parses the `File-TTL` header value.
pub fn parse_ttl(value: Option<&HeaderValue>, default_ttl: Duration) -> Duration {
    let minutes = value
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<i64>().ok());

    match minutes {
        Some(m) if m <= 0 => Duration::ZERO,
        Some(m) => Duration::from_secs((m as u64).saturating_mul(60)),
        None => {
            if let Some(raw) = value {
                debug!(value = ?raw, "Invalid TTL header, using default");
            }
            default_ttl
        }
    }
}

/// `PUT /v1/file`
pub async fn upload_file(
    State(state): State<ApiState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let ttl = parse_ttl(headers.get(TTL_HEADER), state.default_ttl);

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field.bytes().await?;
        let url = state.service.upload(&filename, content, ttl).await?;

        return Ok(Json(UploadResponse { url }));
    }

    Err(ApiError::MissingFile)
}

/// `GET /v1/:path`
pub async fn download_file(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let content = state.service.download(&key).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    // Force a download in browsers
    let disposition = HeaderValue::from_bytes(format!("attachment; filename={}", key).as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((headers, content))
}

/// `GET /health`
pub async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let stats = state.service.stats();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        uptime_secs: state.service.uptime().as_secs(),
        objects: stats.objects,
        writes: stats.writes,
        reads: stats.reads,
        expired: stats.expired_on_read + stats.expired_by_sweep,
    })
}

/// `OPTIONS` on any route, including requests that are not CORS preflights
pub async fn options() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: Duration = Duration::from_secs(60);

    #[test]
    fn test_parse_ttl_minutes() {
        let value = HeaderValue::from_static("5");
        assert_eq!(parse_ttl(Some(&value), DEFAULT), Duration::from_secs(300));

        let padded = HeaderValue::from_static(" 2 ");
        assert_eq!(parse_ttl(Some(&padded), DEFAULT), Duration::from_secs(120));
    }

    #[test]
    fn test_parse_ttl_missing_uses_default() {
        assert_eq!(parse_ttl(None, DEFAULT), DEFAULT);
    }

    #[test]
    fn test_parse_ttl_malformed_uses_default() {
        for raw in ["abc", "1.5", "", "10m"] {
            let value = HeaderValue::from_str(raw).unwrap();
            assert_eq!(parse_ttl(Some(&value), DEFAULT), DEFAULT, "{:?}", raw);
        }
    }

    #[test]
    fn test_parse_ttl_non_positive_is_zero() {
        let zero = HeaderValue::from_static("0");
        assert_eq!(parse_ttl(Some(&zero), DEFAULT), Duration::ZERO);

        let negative = HeaderValue::from_static("-3");
        assert_eq!(parse_ttl(Some(&negative), DEFAULT), Duration::ZERO);
    }
}
