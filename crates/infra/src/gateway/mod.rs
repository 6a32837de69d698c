//! Persistence gateway: generic CRUD + query over named collections.
//!
//! The hosted document store only guarantees per-document atomicity. Nothing
//! built on this trait may assume two writes commit together.

pub mod in_memory;
pub mod query;

pub use in_memory::InMemoryGateway;
pub use query::{Direction, Filter, FilterOp, Ordering, Query};

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use rihla_core::DocumentId;

/// Raw document body. The id is not part of the body.
pub type Document = Map<String, JsonValue>;

/// A document together with the id the store assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub data: Document,
}

impl StoredDocument {
    /// Decode into a typed record. The store id is injected as `id` so
    /// records that carry their own id field deserialize cleanly.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        let mut data = self.data.clone();
        data.insert("id".to_string(), JsonValue::String(self.id.as_str().to_string()));
        serde_json::from_value(JsonValue::Object(data))
            .map_err(|e| GatewayError::Serialization(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("document {id} not found in '{collection}'")]
    NotFound { collection: String, id: DocumentId },

    /// Network or service outage.
    #[error("persistence unavailable: {0}")]
    Unavailable(String),

    /// The store refused the write (rules, quota, malformed patch).
    #[error("write rejected: {0}")]
    Rejected(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Serialize a record into a document body, dropping any `id` field.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, GatewayError> {
    match serde_json::to_value(value) {
        Ok(JsonValue::Object(mut map)) => {
            map.remove("id");
            Ok(map)
        }
        Ok(other) => Err(GatewayError::Serialization(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(GatewayError::Serialization(e.to_string())),
    }
}

#[async_trait::async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn create(&self, collection: &str, doc: Document) -> Result<DocumentId, GatewayError>;

    async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, GatewayError>;

    async fn query(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<StoredDocument>, GatewayError>;

    /// Merge `patch` into an existing document. Missing documents are `NotFound`.
    async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        patch: Document,
    ) -> Result<(), GatewayError>;

    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), GatewayError>;
}

#[async_trait::async_trait]
impl<G> PersistenceGateway for Arc<G>
where
    G: PersistenceGateway + ?Sized,
{
    async fn create(&self, collection: &str, doc: Document) -> Result<DocumentId, GatewayError> {
        (**self).create(collection, doc).await
    }

    async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, GatewayError> {
        (**self).get(collection, id).await
    }

    async fn query(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<StoredDocument>, GatewayError> {
        (**self).query(collection, query).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        patch: Document,
    ) -> Result<(), GatewayError> {
        (**self).update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), GatewayError> {
        (**self).delete(collection, id).await
    }
}
