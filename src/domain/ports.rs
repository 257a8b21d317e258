use crate::domain::model::{Category, DateRange, DrawRecord, HistoryEntry};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::num::NonZeroUsize;

/// Append-only persistence of draws.
///
/// Implementations never retry; every failure surfaces as
/// [`OmikujiError::Storage`](crate::utils::error::OmikujiError::Storage).
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Durably writes one draw. On success the record is visible to the
    /// caller's next query.
    async fn append(&self, outcome: Category, timestamp: DateTime<Utc>) -> Result<DrawRecord>;

    /// Most-recent-first, at most `limit` entries. Equal timestamps are
    /// ordered by insertion, later first.
    async fn recent(&self, limit: NonZeroUsize) -> Result<Vec<HistoryEntry>>;

    /// Every entry with `range.start() <= timestamp <= range.end()`, in no
    /// particular order.
    async fn range_query(&self, range: &DateRange) -> Result<Vec<HistoryEntry>>;
}

pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait RandomPort: Send + Sync {
    /// Uniform index in `0..len`. `len` is never zero.
    fn gen_index(&self, len: usize) -> usize;
}
