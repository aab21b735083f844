//! MongoDB-backed [`MetadataRepository`].

use async_trait::async_trait;
use bson::{doc, Document};
use chrono::{DateTime, Utc};
use ingestor_core::{
    FetchedMetadata, InProgressOutcome, IngestError, MetadataRecord, MetadataRepository, NormalizedUrl,
};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::warn;
use uuid::Uuid;

const COLLECTION_NAME: &str = "metadata";

pub struct MongoRepository {
    database: Database,
    collection: Collection<Document>,
}

impl MongoRepository {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, IngestError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| IngestError::StoreUnavailable(e.to_string()))?;
        let database = client.database(db_name);
        let repository = Self { collection: database.collection(COLLECTION_NAME), database };
        repository.ensure_indexes().await?;
        Ok(repository)
    }

    /// Creates the repository's indexes; idempotent.
    async fn ensure_indexes(&self) -> Result<(), IngestError> {
        let unique_url = IndexModel::builder()
            .keys(doc! { "url": 1 })
            .options(IndexOptions::builder().unique(true).name("uq_metadata_url".to_string()).build())
            .build();
        let created_at_asc = IndexModel::builder()
            .keys(doc! { "created_at": 1 })
            .options(IndexOptions::builder().name("idx_metadata_created_at".to_string()).build())
            .build();

        self.collection
            .create_indexes([unique_url, created_at_asc], None)
            .await
            .map_err(|e| IngestError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    fn record_from_doc(doc: Document) -> Result<MetadataRecord, IngestError> {
        bson::from_document(doc).map_err(|e| IngestError::StoreUnavailable(e.to_string()))
    }
}

#[async_trait]
impl MetadataRepository for MongoRepository {
    async fn ensure_pending(
        &self,
        url: &NormalizedUrl,
        now: DateTime<Utc>,
    ) -> Result<MetadataRecord, IngestError> {
        let filter = doc! { "url": url.as_str() };
        let update = doc! {
            "$setOnInsert": {
                "url": url.as_str(),
                "status": "PENDING",
                "metadata": Option::<Document>::None,
                "processing": {
                    "attempt_number": 0,
                    "error_msg": Option::<String>::None,
                    "last_request_id": Option::<String>::None,
                },
                "created_at": now,
                "updated_at": now,
            }
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let doc = self
            .collection
            .find_one_and_update(filter, update, options)
            .await
            .map_err(|e| IngestError::StoreUnavailable(e.to_string()))?
            .ok_or_else(|| IngestError::StoreUnavailable("upsert returned no document".into()))?;

        Self::record_from_doc(doc)
    }

    async fn mark_in_progress(
        &self,
        url: &NormalizedUrl,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<InProgressOutcome, IngestError> {
        let filter = doc! {
            "url": url.as_str(),
            "status": { "$in": ["PENDING", "FAILED_RETRYABLE", "IN_PROGRESS"] },
        };
        let request_id_bson =
            bson::to_bson(&request_id).map_err(|e| IngestError::StoreUnavailable(e.to_string()))?;
        let update = doc! {
            "$set": {
                "status": "IN_PROGRESS",
                "processing.last_request_id": request_id_bson,
                "updated_at": now,
            },
            "$inc": { "processing.attempt_number": 1 },
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(filter, update, options)
            .await
            .map_err(|e| IngestError::StoreUnavailable(e.to_string()))?;

        match updated {
            Some(doc) => {
                let record = Self::record_from_doc(doc)?;
                Ok(InProgressOutcome::Started { attempt_number: record.processing.attempt_number })
            }
            None => {
                // Either the record is missing (shouldn't happen, ensure_pending
                // runs first) or it's already in a terminal state.
                match self.get(url).await? {
                    Some(_) => Ok(InProgressOutcome::AlreadyTerminal),
                    None => {
                        warn!(url = %url, "mark_in_progress: no record found for url");
                        Err(IngestError::StoreUnavailable("record not found".into()))
                    }
                }
            }
        }
    }

    async fn mark_completed(
        &self,
        url: &NormalizedUrl,
        metadata: FetchedMetadata,
        now: DateTime<Utc>,
    ) -> Result<(), IngestError> {
        let metadata_doc =
            bson::to_bson(&metadata).map_err(|e| IngestError::StoreUnavailable(e.to_string()))?;
        let update = doc! {
            "$set": {
                "status": "COMPLETED",
                "metadata": metadata_doc,
                "processing.error_msg": Option::<String>::None,
                "updated_at": now,
            }
        };
        self.collection
            .update_one(doc! { "url": url.as_str() }, update, None)
            .await
            .map_err(|e| IngestError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn mark_retryable_failure(
        &self,
        url: &NormalizedUrl,
        error_msg: &str,
        now: DateTime<Utc>,
    ) -> Result<(), IngestError> {
        let update = doc! {
            "$set": {
                "status": "FAILED_RETRYABLE",
                "processing.error_msg": error_msg,
                "updated_at": now,
            }
        };
        self.collection
            .update_one(doc! { "url": url.as_str() }, update, None)
            .await
            .map_err(|e| IngestError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn mark_permanent_failure(
        &self,
        url: &NormalizedUrl,
        error_msg: &str,
        now: DateTime<Utc>,
    ) -> Result<(), IngestError> {
        let update = doc! {
            "$set": {
                "status": "FAILED_PERMANENT",
                "processing.error_msg": error_msg,
                "updated_at": now,
            }
        };
        self.collection
            .update_one(doc! { "url": url.as_str() }, update, None)
            .await
            .map_err(|e| IngestError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, url: &NormalizedUrl) -> Result<Option<MetadataRecord>, IngestError> {
        let doc = self
            .collection
            .find_one(doc! { "url": url.as_str() }, None)
            .await
            .map_err(|e| IngestError::StoreUnavailable(e.to_string()))?;
        doc.map(Self::record_from_doc).transpose()
    }

    async fn ping(&self) -> Result<(), IngestError> {
        self.database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| IngestError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }
}
