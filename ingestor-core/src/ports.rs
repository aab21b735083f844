//! Capability traits for the adapters that plug into the core pipeline.
//!
//! These replace the source's structural (duck-typed) `MessagePublisher`,
//! `MetadataRepository`, and `AbstractHttpClient` protocols with explicit
//! traits, wired by each binary's composition root.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::envelope::EnqueueEnvelope;
use crate::error::IngestError;
use crate::record::{FetchedMetadata, MetadataRecord};
use crate::url::NormalizedUrl;

/// Outcome of a `mark_in_progress` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InProgressOutcome {
    /// Record transitioned (or stayed) in-progress; this is the attempt
    /// number to use for this fetch.
    Started { attempt_number: u32 },
    /// The record was already in a terminal state; the caller must
    /// short-circuit without fetching.
    AlreadyTerminal,
}

/// A durable, idempotent store for metadata records.
#[async_trait]
pub trait MetadataRepository: Send + Sync {
    async fn ensure_pending(
        &self,
        url: &NormalizedUrl,
        now: DateTime<Utc>,
    ) -> Result<MetadataRecord, IngestError>;

    async fn mark_in_progress(
        &self,
        url: &NormalizedUrl,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<InProgressOutcome, IngestError>;

    async fn mark_completed(
        &self,
        url: &NormalizedUrl,
        metadata: FetchedMetadata,
        now: DateTime<Utc>,
    ) -> Result<(), IngestError>;

    async fn mark_retryable_failure(
        &self,
        url: &NormalizedUrl,
        error_msg: &str,
        now: DateTime<Utc>,
    ) -> Result<(), IngestError>;

    async fn mark_permanent_failure(
        &self,
        url: &NormalizedUrl,
        error_msg: &str,
        now: DateTime<Utc>,
    ) -> Result<(), IngestError>;

    async fn get(&self, url: &NormalizedUrl) -> Result<Option<MetadataRecord>, IngestError>;

    async fn ping(&self) -> Result<(), IngestError>;
}

/// The publisher side of the broker, as seen by the producer API
/// and by the read-through path.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(&self, envelope: &EnqueueEnvelope) -> Result<(), IngestError>;

    /// True iff the publisher's state machine is in `READY`.
    fn is_ready(&self) -> bool;
}

/// Classified fetch failure.
#[derive(Debug, Clone)]
pub enum FetchError {
    Retryable(String),
    Permanent(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Retryable(msg) => write!(f, "{msg}"),
            FetchError::Permanent(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// The external HTTP fetcher: opaque
/// operation returning a metadata result or a classified error.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, url: &NormalizedUrl) -> Result<FetchedMetadata, FetchError>;
}
