use orderdesk_core::DecodeError;
use thiserror::Error;

pub use orderdesk_core::SubmitOutcome;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
