//! The Processor: converts one delivery into a record transition and an ack
//! decision. Pure orchestration — no broker interaction.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::envelope::EnqueueEnvelope;
use crate::ports::{FetchError, InProgressOutcome, MetadataFetcher, MetadataRepository};
use crate::record::FetchedMetadata;
use crate::url::NormalizedUrl;

/// What the Consumer should do with the broker delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessorOutcome {
    Completed,
    PermanentFailure,
    RetryableFailure { attempt_number: u32 },
    Malformed { reason: String },
}

pub struct Processor<R, F> {
    repository: Arc<R>,
    fetcher: Arc<F>,
    max_retries: u32,
    max_page_source_length: usize,
}

impl<R, F> Processor<R, F>
where
    R: MetadataRepository,
    F: MetadataFetcher,
{
    pub fn new(
        repository: Arc<R>,
        fetcher: Arc<F>,
        max_retries: u32,
        max_page_source_length: usize,
    ) -> Self {
        Self { repository, fetcher, max_retries, max_page_source_length }
    }

    /// Runs the full fetch/persist/retry algorithm for a single delivery.
    pub async fn process(&self, envelope: &EnqueueEnvelope) -> ProcessorOutcome {
        let url = match NormalizedUrl::parse(&envelope.url) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = %envelope.url, error = %e, "processor: malformed delivery");
                return ProcessorOutcome::Malformed { reason: e.to_string() };
            }
        };

        let now = Utc::now();

        if let Err(e) = self.repository.ensure_pending(&url, now).await {
            warn!(url = %url, error = %e, "processor: ensure_pending failed");
            return ProcessorOutcome::RetryableFailure { attempt_number: 0 };
        }

        let attempt_number = match self.repository.mark_in_progress(&url, envelope.request_id, now).await {
            Ok(InProgressOutcome::Started { attempt_number }) => attempt_number,
            Ok(InProgressOutcome::AlreadyTerminal) => {
                info!(url = %url, "processor: short-circuit, record already terminal");
                return ProcessorOutcome::Completed;
            }
            Err(e) => {
                warn!(url = %url, error = %e, "processor: mark_in_progress failed");
                return ProcessorOutcome::RetryableFailure { attempt_number: 0 };
            }
        };

        match self.fetcher.fetch(&url).await {
            Ok(mut metadata) => {
                metadata.truncate_to(self.max_page_source_length);
                let now = Utc::now();
                match self.repository.mark_completed(&url, metadata, now).await {
                    Ok(()) => ProcessorOutcome::Completed,
                    Err(e) => {
                        warn!(url = %url, error = %e, "processor: mark_completed failed");
                        ProcessorOutcome::RetryableFailure { attempt_number }
                    }
                }
            }
            Err(FetchError::Retryable(msg)) => {
                self.on_retryable(&url, attempt_number, &msg).await
            }
            Err(FetchError::Permanent(msg)) => {
                let now = Utc::now();
                if let Err(e) = self.repository.mark_permanent_failure(&url, &msg, now).await {
                    warn!(url = %url, error = %e, "processor: mark_permanent_failure failed");
                }
                ProcessorOutcome::PermanentFailure
            }
        }
    }

    async fn on_retryable(&self, url: &NormalizedUrl, attempt_number: u32, msg: &str) -> ProcessorOutcome {
        let now = Utc::now();
        if attempt_number < self.max_retries {
            if let Err(e) = self.repository.mark_retryable_failure(url, msg, now).await {
                warn!(url = %url, error = %e, "processor: mark_retryable_failure failed");
            }
            ProcessorOutcome::RetryableFailure { attempt_number }
        } else {
            if let Err(e) = self.repository.mark_permanent_failure(url, msg, now).await {
                warn!(url = %url, error = %e, "processor: mark_permanent_failure failed");
            }
            ProcessorOutcome::PermanentFailure
        }
    }
}
