use crate::domain::model::{AggregationResult, Category, DateRange, HistoryEntry, LegendEntry, Segment};
use crate::domain::ports::ResultStore;
use crate::utils::error::{OmikujiError, Result};
use std::sync::Arc;

pub struct RangeAggregator<S: ResultStore> {
    store: Arc<S>,
}

impl<S: ResultStore> RangeAggregator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Counts draws per category inside the inclusive `range`.
    ///
    /// The bound order is checked before the store is queried.
    pub async fn aggregate(&self, range: &DateRange) -> Result<AggregationResult> {
        if !range.is_ordered() {
            return Err(OmikujiError::invalid_range(format!(
                "start {} is after end {}",
                range.start().to_rfc3339(),
                range.end().to_rfc3339()
            )));
        }

        let entries = self.store.range_query(range).await.map_err(|e| {
            e.with_parameters(format!(
                "[{} .. {}]",
                range.start().to_rfc3339(),
                range.end().to_rfc3339()
            ))
        })?;
        let result = tally(&entries);

        tracing::info!(
            "Aggregated {} draws between {} and {}",
            result.total,
            range.start().to_rfc3339(),
            range.end().to_rfc3339()
        );
        Ok(result)
    }
}

impl<S: ResultStore> Clone for RangeAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

/// Order-independent per-category count. Unknown labels are skipped and
/// reported through `unrecognized`.
pub fn tally(entries: &[HistoryEntry]) -> AggregationResult {
    let mut result = AggregationResult::empty();

    for entry in entries {
        match entry.outcome.category() {
            Some(category) => *result.counts.entry(category).or_insert(0) += 1,
            None => {
                tracing::warn!(
                    "Ignoring record {} with unknown outcome '{}'",
                    entry.id,
                    entry.outcome.label()
                );
                result.unrecognized += 1;
            }
        }
    }

    result.total = result.counts.values().sum();
    result
}

fn share(count: u64, total: u64) -> f64 {
    count as f64 / total as f64 * 100.0
}

/// Cumulative pie-chart spans in display order. Zero-count categories get no
/// segment; an empty result yields the single sentinel segment.
pub fn derive_segments(result: &AggregationResult) -> Vec<Segment> {
    if result.total == 0 {
        return vec![Segment::empty_sentinel()];
    }

    let mut cumulative = 0.0;
    let mut segments = Vec::new();
    for category in Category::ALL {
        let count = result.count(category);
        if count == 0 {
            continue;
        }
        let start_percent = cumulative;
        cumulative += share(count, result.total);
        segments.push(Segment {
            category: Some(category),
            start_percent,
            end_percent: cumulative,
        });
    }
    segments
}

/// Per-category count with `round(count / total * 100)`. Independent of the
/// segment spans; the rounded values may not add up to 100.
pub fn legend(result: &AggregationResult) -> Vec<LegendEntry> {
    Category::ALL
        .into_iter()
        .map(|category| {
            let count = result.count(category);
            let percent = if result.total == 0 {
                0
            } else {
                share(count, result.total).round() as u32
            };
            LegendEntry {
                category,
                color: category.color(),
                count,
                percent,
            }
        })
        .collect()
}
