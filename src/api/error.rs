use crate::storage::StoreError;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error, warn};

/// Errors that can occur while handling an HTTP request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The store engine rejected or failed the request
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The multipart body could not be read
    #[error("invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    /// The multipart body had no `file` field
    #[error("missing `file` field in multipart body")]
    MissingFile,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Stopped | StoreError::Timeout(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Store(StoreError::AlreadyStarted) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Multipart(_) | ApiError::MissingFile => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match status {
            StatusCode::NOT_FOUND => debug!(error = %self, "File missing"),
            s if s.is_server_error() => error!(error = %self, "Request failed"),
            _ => warn!(error = %self, "Bad request"),
        }

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(StoreError::NotFound("k".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::Stopped).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(StoreError::Timeout(Duration::from_secs(1))).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiError::MissingFile.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_body_names_key() {
        let err = ApiError::from(StoreError::NotFound("gone.txt".into()));
        assert_eq!(err.to_string(), "object not found: gone.txt");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
