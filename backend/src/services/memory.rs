//! In-memory client store
//!
//! Used when no Firestore project is configured, so the backend can run
//! locally without Google credentials. Records are lost on restart.

use crate::services::http::require;
use crate::services::{ClientRecord, ClientRecords, ServiceError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Client records kept in process memory
#[derive(Debug, Default)]
pub struct MemoryClientStore {
    records: RwLock<BTreeMap<String, Map<String, Value>>>,
}

impl MemoryClientStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientRecords for MemoryClientStore {
    async fn upsert(
        &self,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<ClientRecord, ServiceError> {
        require(id, "client id")?;
        let mut records = self.records.write().await;
        let stored = records.entry(id.to_string()).or_default();
        for (key, value) in fields.iter().filter(|(key, _)| key.as_str() != "id") {
            stored.insert(key.clone(), value.clone());
        }
        Ok(ClientRecord::new(id, stored.clone()))
    }

    async fn get(&self, id: &str) -> Result<Option<ClientRecord>, ServiceError> {
        let records = self.records.read().await;
        Ok(records
            .get(id)
            .map(|fields| ClientRecord::new(id, fields.clone())))
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.records.write().await.remove(id);
        Ok(())
    }

    async fn search(&self, prefix: &str) -> Result<Vec<ClientRecord>, ServiceError> {
        let prefix = prefix.trim();
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|(_, fields)| {
                prefix.is_empty()
                    || fields
                        .get("name")
                        .and_then(Value::as_str)
                        .is_some_and(|name| name.starts_with(prefix))
            })
            .map(|(id, fields)| ClientRecord::new(id.clone(), fields.clone()))
            .collect())
    }
}
