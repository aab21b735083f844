//! Domain model and processing state machine for the metadata ingestion
//! pipeline, shared by the producer and consumer binaries and their broker,
//! store, and fetcher adapters.

pub mod envconfig;
pub mod envelope;
pub mod error;
pub mod inmemory;
pub mod ports;
pub mod processor;
pub mod record;
pub mod url;

pub use envelope::EnqueueEnvelope;
pub use error::IngestError;
pub use inmemory::InMemoryPublisher;
pub use ports::{FetchError, InProgressOutcome, MessagePublisher, MetadataFetcher, MetadataRepository};
pub use processor::{Processor, ProcessorOutcome};
pub use record::{
    FetchedMetadata, MetadataRecord, ProcessingState, RecordStatus, TruncationDetails,
    DEFAULT_MAX_PAGE_SOURCE_LENGTH, DEFAULT_MAX_RETRIES,
};
pub use url::{NormalizedUrl, UrlError};
