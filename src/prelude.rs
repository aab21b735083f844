//! Convenient re-exports for common Nine Lives types.
pub use crate::{
    backoff::{
        Backoff, BackoffError, BackoffStrategy, ConstantBackoff, ExponentialBackoff, LinearBackoff,
        MAX_BACKOFF,
    },
    bulkhead::{BulkheadError, BulkheadPolicy},
    circuit_breaker::{CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerPolicy},
    jitter::Jitter,
    retry::{BuildError, RetryPolicy, RetryPolicyBuilder},
    telemetry::{
        BulkheadEvent, CircuitBreakerEvent, FallbackSink, LogSink, MemorySink, MulticastSink,
        NullSink, PolicyEvent, RequestOutcome, RetryEvent, StreamingSink, TelemetrySink,
        TimeoutEvent,
    },
    timeout::{TimeoutError, TimeoutPolicy, MAX_TIMEOUT},
    ResilienceError, ResilienceStack, ResilienceStackBuilder,
};
