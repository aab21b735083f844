//! The metadata record state machine.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::url::NormalizedUrl;

/// Default cap on fetched body size before truncation (1,000,000 bytes).
pub const DEFAULT_MAX_PAGE_SOURCE_LENGTH: usize = 1_000_000;

/// Default maximum number of fetch attempts before `FAILED_PERMANENT`.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Pending,
    InProgress,
    Completed,
    FailedRetryable,
    FailedPermanent,
}

impl RecordStatus {
    /// Terminal states are never transitioned out of.
    pub fn is_terminal(self) -> bool {
        matches!(self, RecordStatus::Completed | RecordStatus::FailedPermanent)
    }

    /// States from which `mark_in_progress` is allowed to fire.
    pub fn eligible_for_in_progress(self) -> bool {
        matches!(
            self,
            RecordStatus::Pending | RecordStatus::FailedRetryable | RecordStatus::InProgress
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationDetails {
    pub truncated: bool,
    pub original_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedMetadata {
    pub status_code: u16,
    /// Case-preserved, order-preserved response headers.
    pub headers: Vec<(String, String)>,
    pub cookies: HashMap<String, String>,
    pub page_source: String,
    pub final_url: String,
    pub additional_details: Option<TruncationDetails>,
}

impl FetchedMetadata {
    /// Truncate `page_source` to `max_len` if needed, recording the original
    /// length. Idempotent: calling twice with the same `max_len` is a no-op
    /// the second time because `page_source.len() == max_len` already.
    pub fn truncate_to(&mut self, max_len: usize) {
        let original_length = self.page_source.len();
        if original_length <= max_len {
            return;
        }

        let mut cut = max_len;
        while cut > 0 && !self.page_source.is_char_boundary(cut) {
            cut -= 1;
        }
        self.page_source.truncate(cut);
        self.additional_details = Some(TruncationDetails { truncated: true, original_length });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingState {
    pub attempt_number: u32,
    pub error_msg: Option<String>,
    pub last_request_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub url: NormalizedUrl,
    pub status: RecordStatus,
    pub metadata: Option<FetchedMetadata>,
    pub processing: ProcessingState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MetadataRecord {
    /// A freshly-inserted record as produced by `ensure_pending`.
    pub fn new_pending(url: NormalizedUrl, now: DateTime<Utc>) -> Self {
        Self {
            url,
            status: RecordStatus::Pending,
            metadata: None,
            processing: ProcessingState::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_sets_details_only_when_needed() {
        let mut m = FetchedMetadata {
            status_code: 200,
            headers: vec![],
            cookies: HashMap::new(),
            page_source: "a".repeat(10),
            final_url: "https://example.com/".into(),
            additional_details: None,
        };
        m.truncate_to(20);
        assert!(m.additional_details.is_none());
        assert_eq!(m.page_source.len(), 10);

        m.truncate_to(5);
        assert_eq!(m.page_source.len(), 5);
        let details = m.additional_details.unwrap();
        assert!(details.truncated);
        assert_eq!(details.original_length, 10);
    }

    #[test]
    fn terminal_states() {
        assert!(RecordStatus::Completed.is_terminal());
        assert!(RecordStatus::FailedPermanent.is_terminal());
        assert!(!RecordStatus::Pending.is_terminal());
        assert!(!RecordStatus::InProgress.is_terminal());
        assert!(!RecordStatus::FailedRetryable.is_terminal());
    }

    #[test]
    fn eligible_for_in_progress_excludes_terminal() {
        assert!(RecordStatus::Pending.eligible_for_in_progress());
        assert!(RecordStatus::FailedRetryable.eligible_for_in_progress());
        assert!(RecordStatus::InProgress.eligible_for_in_progress());
        assert!(!RecordStatus::Completed.eligible_for_in_progress());
        assert!(!RecordStatus::FailedPermanent.eligible_for_in_progress());
    }
}
