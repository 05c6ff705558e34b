use axum::http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Interval {0} outside 1..=65535")]
    InvalidInterval(i64),

    #[error("Interval version {0} is exhausted, no newer version can be announced")]
    VersionExhausted(u16),
}

impl SessionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SessionError::InvalidInterval(_) => StatusCode::BAD_REQUEST,
            SessionError::VersionExhausted(_) => StatusCode::CONFLICT,
        }
    }
}
