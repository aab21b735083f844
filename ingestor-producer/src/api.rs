//! HTTP surface: `POST /metadata`, `GET /metadata`, health probes.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use ingestor_core::{EnqueueEnvelope, IngestError, MessagePublisher, MetadataRecord, MetadataRepository, NormalizedUrl, RecordStatus};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub struct AppState {
    pub publisher: Arc<dyn MessagePublisher>,
    pub repository: Arc<dyn MetadataRepository>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .route("/metadata", post(post_metadata).get(get_metadata))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_live() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if !state.publisher.is_ready() {
        warn!(reason = "publisher_not_ready", "readiness_failed");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "reason": "publisher_not_ready" })),
        );
    }
    if let Err(e) = state.repository.ping().await {
        warn!(reason = %e, "readiness_failed");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "reason": e.to_string() })),
        );
    }
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

#[derive(Debug, Deserialize)]
pub struct PostMetadataRequest {
    pub url: String,
}

async fn post_metadata(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PostMetadataRequest>,
) -> impl IntoResponse {
    let url = match NormalizedUrl::parse(&body.url) {
        Ok(url) => url,
        Err(e) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "status": "error", "reason": e.to_string() })),
            )
        }
    };

    enqueue(&state, url).await
}

#[derive(Debug, Deserialize)]
pub struct GetMetadataQuery {
    #[serde(default)]
    pub url: Option<String>,
}

async fn get_metadata(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GetMetadataQuery>,
) -> impl IntoResponse {
    let Some(raw_url) = query.url else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "reason": "missing url" })),
        );
    };
    let url = match NormalizedUrl::parse(&raw_url) {
        Ok(url) => url,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "error", "reason": e.to_string() })),
            )
        }
    };

    let record = match state.repository.get(&url).await {
        Ok(record) => record,
        Err(e) => {
            warn!(url = %url, error = %e, "store unavailable on read-through lookup");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error", "reason": e.to_string() })),
            );
        }
    };

    match record {
        None => enqueue(&state, url).await,
        Some(record) => match record.status {
            RecordStatus::Completed | RecordStatus::FailedPermanent => {
                (StatusCode::OK, Json(record_to_json(&record)))
            }
            RecordStatus::InProgress | RecordStatus::Pending | RecordStatus::FailedRetryable => (
                StatusCode::ACCEPTED,
                Json(json!({ "status": "IN_PROGRESS", "url": url.as_str() })),
            ),
        },
    }
}

async fn enqueue(state: &AppState, url: NormalizedUrl) -> (StatusCode, Json<serde_json::Value>) {
    let envelope = EnqueueEnvelope::new(url.as_str());
    match state.publisher.publish(&envelope).await {
        Ok(()) => {
            info!(url = %url, request_id = %envelope.request_id, "metadata enqueued");
            if let Err(e) = state.repository.ensure_pending(&url, Utc::now()).await {
                warn!(url = %url, error = %e, "ensure_pending failed after successful publish");
            }
            (
                StatusCode::ACCEPTED,
                Json(json!({
                    "status": "QUEUED",
                    "url": url.as_str(),
                    "request_id": envelope.request_id,
                })),
            )
        }
        Err(e) => {
            warn!(url = %url, error = %e, "publish_failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error", "reason": error_reason(&e) })),
            )
        }
    }
}

fn error_reason(e: &IngestError) -> &'static str {
    match e {
        IngestError::PublisherNotReady => "publisher_not_ready",
        IngestError::QueueRejected => "queue_rejected",
        IngestError::ConnectionLost => "connection_lost",
        IngestError::PublisherTimeout => "publisher_timeout",
        _ => "unavailable",
    }
}

fn record_to_json(record: &MetadataRecord) -> serde_json::Value {
    serde_json::to_value(record).unwrap_or_else(|_| json!({ "status": "error" }))
}
