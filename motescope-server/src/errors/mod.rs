pub mod announce;
pub mod api;
pub mod result_log;
pub mod session;

pub use announce::AnnounceError;
pub use api::ApiError;
pub use result_log::ResultLogError;
pub use session::SessionError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Extract status code and error message from the specific error type
        let (status, error_message) = match &self {
            ApiError::SessionError(e) => (e.status_code(), e.to_string()),
            ApiError::InvalidRange { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        let error_obj = json!({
            "code": status.as_u16(),
            "message": error_message
        });

        let body = Json(json!({
            "error": error_obj
        }));

        (status, body).into_response()
    }
}
