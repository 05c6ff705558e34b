use super::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Session error: {0}")]
    SessionError(#[from] SessionError),

    #[error("Invalid sample range {from}..{to}")]
    InvalidRange { from: usize, to: usize },
}
