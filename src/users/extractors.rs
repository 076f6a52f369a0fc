use axum::extract::{rejection::JsonRejection, FromRequest};
use tracing::warn;

use crate::error::ApiError;

pub const INVALID_REQUEST: &str = "Requisição inválida.";

/// `Json` whose rejection is rendered in the response envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "rejected request body");
        ApiError::BadRequest(INVALID_REQUEST)
    }
}
