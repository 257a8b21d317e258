use super::newest_first;
use crate::domain::model::{Category, DateRange, DrawRecord, HistoryEntry};
use crate::domain::ports::ResultStore;
use crate::utils::error::{OmikujiError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::SeekFrom;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Append-only JSON Lines store: one `{"id","result","timestamp"}` object per
/// line in `<dir>/<collection>.jsonl`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(base_path: impl AsRef<Path>, collection: &str) -> Self {
        Self {
            path: base_path.as_ref().join(format!("{}.jsonl", collection)),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self, operation: &str) -> Result<Vec<HistoryEntry>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            // 還沒有任何抽籤紀錄
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(OmikujiError::storage(
                    operation,
                    format!("{}: {}", self.path.display(), e),
                ))
            }
        };

        // 寫入中斷時最後一行可能沒有換行；這種殘缺紀錄略過，其餘損壞仍視為錯誤
        let complete = content.ends_with('\n');
        let lines: Vec<&str> = content.lines().collect();
        let last_index = lines.len().saturating_sub(1);

        let mut entries = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) if index == last_index && !complete => {
                    tracing::warn!(
                        "⚠️ Skipping incomplete last line {} of {}: {}",
                        index + 1,
                        self.path.display(),
                        e
                    );
                }
                Err(e) => {
                    return Err(OmikujiError::storage(
                        operation,
                        format!("{} line {}: {}", self.path.display(), index + 1, e),
                    ))
                }
            }
        }
        Ok(entries)
    }

    /// Drops a partial record left behind by an interrupted write, so the
    /// next record starts on its own line.
    async fn discard_torn_tail(&self, file: &mut File) -> std::io::Result<()> {
        if file.metadata().await?.len() == 0 {
            return Ok(());
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1)).await?;
        file.read_exact(&mut last).await?;
        if last[0] == b'\n' {
            return Ok(());
        }

        let content = fs::read(&self.path).await?;
        let keep = content
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |i| i + 1);
        tracing::warn!(
            "⚠️ Discarding {} bytes of an incomplete record at the end of {}",
            content.len() - keep,
            self.path.display()
        );
        file.set_len(keep as u64).await
    }
}

#[async_trait]
impl ResultStore for FileStore {
    async fn append(&self, outcome: Category, timestamp: DateTime<Utc>) -> Result<DrawRecord> {
        let record = DrawRecord {
            id: Uuid::new_v4().to_string(),
            outcome,
            timestamp,
        };
        let context = format!("{} at {}", outcome, timestamp.to_rfc3339());
        let mut line = serde_json::to_string(&record)
            .map_err(|e| OmikujiError::storage("append", e).with_parameters(&context))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| OmikujiError::storage("append", e).with_parameters(&context))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                OmikujiError::storage("append", format!("{}: {}", self.path.display(), e))
                    .with_parameters(&context)
            })?;

        self.discard_torn_tail(&mut file)
            .await
            .map_err(|e| OmikujiError::storage("append", e).with_parameters(&context))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| OmikujiError::storage("append", e).with_parameters(&context))?;
        file.sync_data()
            .await
            .map_err(|e| OmikujiError::storage("append", e).with_parameters(&context))?;

        tracing::debug!("Appended draw {} to {}", record.id, self.path.display());
        Ok(record)
    }

    async fn recent(&self, limit: NonZeroUsize) -> Result<Vec<HistoryEntry>> {
        let entries = self
            .load("recent")
            .await
            .map_err(|e| e.with_parameters(format!("limit {}", limit)))?;
        Ok(newest_first(entries, limit))
    }

    async fn range_query(&self, range: &DateRange) -> Result<Vec<HistoryEntry>> {
        let entries = self.load("range_query").await?;
        Ok(entries
            .into_iter()
            .filter(|entry| range.contains(entry.timestamp))
            .collect())
    }
}
