use super::newest_first;
use crate::domain::model::{Category, DateRange, DrawRecord, HistoryEntry};
use crate::domain::ports::ResultStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<Vec<HistoryEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an already-shaped entry, e.g. when importing history that may
    /// carry labels this build does not know.
    pub async fn import(&self, entry: HistoryEntry) {
        self.entries.write().await.push(entry);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn append(&self, outcome: Category, timestamp: DateTime<Utc>) -> Result<DrawRecord> {
        let record = DrawRecord {
            id: Uuid::new_v4().to_string(),
            outcome,
            timestamp,
        };
        self.entries.write().await.push(record.clone().into());
        tracing::debug!("Stored draw {} ({}) in memory", record.id, record.outcome);
        Ok(record)
    }

    async fn recent(&self, limit: NonZeroUsize) -> Result<Vec<HistoryEntry>> {
        let entries = self.entries.read().await;
        Ok(newest_first(entries.iter().cloned(), limit))
    }

    async fn range_query(&self, range: &DateRange) -> Result<Vec<HistoryEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|entry| range.contains(entry.timestamp))
            .cloned()
            .collect())
    }
}
