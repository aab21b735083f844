//! Error kinds shared across the pipeline.

use thiserror::Error;

use crate::url::UrlError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("publisher is not ready")]
    PublisherNotReady,

    #[error("broker rejected the message (queue overflow)")]
    QueueRejected,

    #[error("broker connection was lost mid-publish")]
    ConnectionLost,

    #[error("timed out waiting for publish confirm")]
    PublisherTimeout,

    #[error("document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("fetch failed (retryable): {0}")]
    FetchRetryable(String),

    #[error("fetch failed (permanent): {0}")]
    FetchPermanent(String),

    #[error("malformed message: {0}")]
    MalformedMessage(String),
}

impl IngestError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            IngestError::PublisherNotReady
                | IngestError::QueueRejected
                | IngestError::ConnectionLost
                | IngestError::PublisherTimeout
                | IngestError::StoreUnavailable(_)
        )
    }
}

impl From<UrlError> for IngestError {
    fn from(e: UrlError) -> Self {
        IngestError::Validation(e.to_string())
    }
}
