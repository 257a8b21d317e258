pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::domain::model::{Category, DateRange, DrawRecord, HistoryEntry};
use crate::domain::ports::ResultStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::num::NonZeroUsize;

/// `entries` must be in insertion order.
pub(crate) fn newest_first<I>(entries: I, limit: NonZeroUsize) -> Vec<HistoryEntry>
where
    I: IntoIterator<Item = HistoryEntry>,
    I::IntoIter: DoubleEndedIterator,
{
    // 反轉後再做穩定排序，相同時間戳記時較晚寫入的排在前面
    let mut newest: Vec<HistoryEntry> = entries.into_iter().rev().collect();
    newest.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    newest.truncate(limit.get());
    newest
}

/// The store selected by configuration, constructed once at startup and
/// handed to the service.
#[derive(Debug)]
pub enum StoreClient {
    Memory(MemoryStore),
    File(FileStore),
}

impl StoreClient {
    pub fn backend_name(&self) -> &'static str {
        match self {
            StoreClient::Memory(_) => "memory",
            StoreClient::File(_) => "file",
        }
    }
}

#[async_trait]
impl ResultStore for StoreClient {
    async fn append(&self, outcome: Category, timestamp: DateTime<Utc>) -> Result<DrawRecord> {
        match self {
            StoreClient::Memory(store) => store.append(outcome, timestamp).await,
            StoreClient::File(store) => store.append(outcome, timestamp).await,
        }
    }

    async fn recent(&self, limit: NonZeroUsize) -> Result<Vec<HistoryEntry>> {
        match self {
            StoreClient::Memory(store) => store.recent(limit).await,
            StoreClient::File(store) => store.recent(limit).await,
        }
    }

    async fn range_query(&self, range: &DateRange) -> Result<Vec<HistoryEntry>> {
        match self {
            StoreClient::Memory(store) => store.range_query(range).await,
            StoreClient::File(store) => store.range_query(range).await,
        }
    }
}
