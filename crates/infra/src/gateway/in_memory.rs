use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::Duration;

use rihla_core::DocumentId;

use super::{Document, GatewayError, PersistenceGateway, Query, StoredDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteFailure {
    Always,
    Next(u32),
    After(u32),
}

/// In-memory gateway for tests/dev.
///
/// Writes to a collection can be made to fail permanently, for the next `n`
/// attempts, or from the `n + 1`th attempt on, to exercise partial-failure
/// paths.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    collections: RwLock<HashMap<String, BTreeMap<DocumentId, Document>>>,
    failures: RwLock<HashMap<String, WriteFailure>>,
    write_attempts: RwLock<HashMap<String, usize>>,
    write_latency: Option<Duration>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write sleeps for `latency` before it is applied.
    pub fn with_write_latency(mut self, latency: Duration) -> Self {
        self.write_latency = Some(latency);
        self
    }

    pub fn fail_writes(&self, collection: &str) {
        if let Ok(mut f) = self.failures.write() {
            f.insert(collection.to_string(), WriteFailure::Always);
        }
    }

    pub fn fail_next_writes(&self, collection: &str, count: u32) {
        if let Ok(mut f) = self.failures.write() {
            f.insert(collection.to_string(), WriteFailure::Next(count));
        }
    }

    /// Let the next `successes` writes to `collection` through, then fail
    /// every later one until [`restore`](Self::restore).
    pub fn fail_writes_after(&self, collection: &str, successes: u32) {
        if let Ok(mut f) = self.failures.write() {
            f.insert(collection.to_string(), WriteFailure::After(successes));
        }
    }

    pub fn restore(&self, collection: &str) {
        if let Ok(mut f) = self.failures.write() {
            f.remove(collection);
        }
    }

    /// Number of create/update/delete calls made against `collection`,
    /// including failed ones.
    pub fn write_attempts(&self, collection: &str) -> usize {
        self.write_attempts
            .read()
            .map(|m| m.get(collection).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|m| m.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Snapshot of every document in `collection`.
    pub fn documents(&self, collection: &str) -> Vec<StoredDocument> {
        let Ok(map) = self.collections.read() else {
            return vec![];
        };
        map.get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| StoredDocument {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn before_write(&self, collection: &str) -> Result<(), GatewayError> {
        if let Ok(mut attempts) = self.write_attempts.write() {
            *attempts.entry(collection.to_string()).or_insert(0) += 1;
        }

        if let Some(latency) = self.write_latency {
            tokio::time::sleep(latency).await;
        }

        let mut failures = self
            .failures
            .write()
            .map_err(|_| GatewayError::Unavailable("failure table poisoned".to_string()))?;
        match failures.get(collection).copied() {
            None => Ok(()),
            Some(WriteFailure::Always) => Err(simulated(collection)),
            Some(WriteFailure::Next(n)) => {
                if n <= 1 {
                    failures.remove(collection);
                } else {
                    failures.insert(collection.to_string(), WriteFailure::Next(n - 1));
                }
                Err(simulated(collection))
            }
            Some(WriteFailure::After(0)) => {
                failures.insert(collection.to_string(), WriteFailure::Always);
                Err(simulated(collection))
            }
            Some(WriteFailure::After(n)) => {
                failures.insert(collection.to_string(), WriteFailure::After(n - 1));
                Ok(())
            }
        }
    }

    fn poisoned() -> GatewayError {
        GatewayError::Unavailable("store lock poisoned".to_string())
    }
}

fn simulated(collection: &str) -> GatewayError {
    GatewayError::Unavailable(format!("simulated outage writing '{collection}'"))
}

#[async_trait::async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn create(&self, collection: &str, doc: Document) -> Result<DocumentId, GatewayError> {
        self.before_write(collection).await?;
        let id = DocumentId::generate();
        let mut map = self.collections.write().map_err(|_| Self::poisoned())?;
        map.entry(collection.to_string())
            .or_default()
            .insert(id.clone(), doc);
        Ok(id)
    }

    async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, GatewayError> {
        let map = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(map.get(collection).and_then(|docs| {
            docs.get(id).map(|data| StoredDocument {
                id: id.clone(),
                data: data.clone(),
            })
        }))
    }

    async fn query(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<StoredDocument>, GatewayError> {
        let map = self.collections.read().map_err(|_| Self::poisoned())?;
        let mut hits: Vec<StoredDocument> = map
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| query.matches(data))
                    .map(|(id, data)| StoredDocument {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        drop(map);

        hits.sort_by(|a, b| query.compare_docs(&a.data, &b.data));
        if let Some(limit) = query.limit {
            hits.truncate(limit);
        }
        Ok(hits)
    }

    async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        patch: Document,
    ) -> Result<(), GatewayError> {
        self.before_write(collection).await?;
        let mut map = self.collections.write().map_err(|_| Self::poisoned())?;
        let doc = map
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| GatewayError::NotFound {
                collection: collection.to_string(),
                id: id.clone(),
            })?;
        doc.extend(patch);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), GatewayError> {
        self.before_write(collection).await?;
        let mut map = self.collections.write().map_err(|_| Self::poisoned())?;
        map.get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or_else(|| GatewayError::NotFound {
                collection: collection.to_string(),
                id: id.clone(),
            })
    }
}
