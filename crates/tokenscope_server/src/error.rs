use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use engine_logging::{engine_error, engine_warn};
use tokenscope_engine::ServiceError;

/// Everything a handler can fail with. Serialized as `{"error": message}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The body was not a JSON object of the expected shape.
    #[error("invalid request body: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Service(ServiceError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Service(ServiceError::Provider(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            engine_error!("Token count failed: {}", message);
        } else {
            engine_warn!("Rejected token count request: {}", message);
        }

        let body = Json(serde_json::json!({ "error": message }));
        (status, body).into_response()
    }
}
