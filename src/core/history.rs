use crate::domain::model::HistoryEntry;
use crate::domain::ports::ResultStore;
use crate::utils::error::Result;
use std::num::NonZeroUsize;
use std::sync::Arc;

pub const DEFAULT_HISTORY_LIMIT: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(limit) => limit,
    None => unreachable!(),
};

pub struct HistoryQuery<S: ResultStore> {
    store: Arc<S>,
}

impl<S: ResultStore> HistoryQuery<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Latest `n` draws, most recent first. An empty store yields an empty
    /// vec; store errors are returned as-is.
    pub async fn latest(&self, n: NonZeroUsize) -> Result<Vec<HistoryEntry>> {
        let entries = self.store.recent(n).await?;
        tracing::debug!("Loaded {} history entries (limit {})", entries.len(), n);
        Ok(entries)
    }
}

impl<S: ResultStore> Clone for HistoryQuery<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}
