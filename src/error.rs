use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreviewError {
    #[error("Request could not be completed: {0}")]
    NetworkError(String),

    #[error("Metadata service returned status {status}")]
    HttpError { status: u16 },

    #[error("Failed to decode metadata response: {0}")]
    DecodeError(String),

    #[error("Invalid metadata endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuildError(String),
}

impl PreviewError {
    pub fn from_reqwest_error(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PreviewError::DecodeError(e.to_string())
        } else if let Some(status) = e.status() {
            PreviewError::HttpError {
                status: status.as_u16(),
            }
        } else if e.is_timeout() {
            PreviewError::NetworkError(format!("request timed out: {e}"))
        } else {
            PreviewError::NetworkError(e.to_string())
        }
    }

    pub fn log(&self) {
        match self {
            PreviewError::NetworkError(e) => {
                warn!(error = %e, "Metadata request failed");
            }
            PreviewError::HttpError { status } => {
                warn!(status = %status, "Metadata service rejected request");
            }
            PreviewError::DecodeError(e) => {
                warn!(error = %e, "Metadata response could not be decoded");
            }
            PreviewError::InvalidEndpoint(e) => {
                error!(error = %e, "Metadata endpoint is not a valid URL");
            }
            PreviewError::ClientBuildError(e) => {
                error!(error = %e, "HTTP client construction failed");
            }
        }
    }
}
