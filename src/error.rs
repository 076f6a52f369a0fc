use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::envelope::Envelope;

/// Every failure a handler can report. Only the static message reaches the
/// client; `Internal` keeps its cause for the server log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn internal(message: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message,
            source: source.into(),
        }
    }

    // Credential and duplicate failures answer 400, matching what existing clients expect.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Conflict(_) | Self::Unauthorized(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Conflict(m) | Self::Unauthorized(m) | Self::NotFound(m) | Self::BadRequest(m) => {
                *m
            }
            Self::Internal { message, .. } => *message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(Envelope::fail(self.message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn internal_error_hides_its_cause() {
        let err = ApiError::internal("generic", anyhow::anyhow!("relation amparousers does not exist"));
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("generic"));
        assert!(!text.contains("amparousers"));
    }

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(ApiError::Conflict("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::BadRequest("x").status_code(), StatusCode::BAD_REQUEST);
    }
}
