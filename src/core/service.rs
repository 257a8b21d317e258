use crate::adapters::SystemClock;
use crate::core::aggregate::{derive_segments, legend, RangeAggregator};
use crate::core::draw::DrawGenerator;
use crate::core::history::{HistoryQuery, DEFAULT_HISTORY_LIMIT};
use crate::domain::model::{AggregationResult, DateRange, DrawRecord, HistoryEntry, LegendEntry, Segment};
use crate::domain::ports::{ClockPort, RandomPort, ResultStore};
use crate::utils::error::{OmikujiError, Result};
use chrono::{
    DateTime, Days, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, SubsecRound,
    TimeZone, Utc,
};
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;

pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Time zone in which calendar dates of a statistics request are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportZone {
    Local,
    Fixed(FixedOffset),
}

impl ReportZone {
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            ReportZone::Local => now.with_timezone(&Local).date_naive(),
            ReportZone::Fixed(offset) => now.with_timezone(offset).date_naive(),
        }
    }

    /// `[start 00:00:00.000, end 23:59:59.999]` in this zone, as UTC instants.
    pub fn day_range(&self, start: NaiveDate, end: NaiveDate) -> Result<DateRange> {
        if start > end {
            return Err(OmikujiError::invalid_range(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }

        let first = start
            .and_hms_milli_opt(0, 0, 0, 0)
            .ok_or_else(|| OmikujiError::invalid_range(format!("invalid start date {}", start)))?;
        let last = end
            .and_hms_milli_opt(23, 59, 59, 999)
            .ok_or_else(|| OmikujiError::invalid_range(format!("invalid end date {}", end)))?;

        let range = DateRange::new(self.resolve(first, true)?, self.resolve(last, false)?)
            .ok_or_else(|| OmikujiError::invalid_range("range collapses in this time zone"))?;
        Ok(range)
    }

    fn resolve(&self, naive: NaiveDateTime, earliest: bool) -> Result<DateTime<Utc>> {
        let resolved = match self {
            ReportZone::Local => pick(Local.from_local_datetime(&naive), earliest),
            ReportZone::Fixed(offset) => pick(offset.from_local_datetime(&naive), earliest),
        };
        resolved.ok_or_else(|| {
            OmikujiError::invalid_range(format!("{} does not exist in the report time zone", naive))
        })
    }
}

// DST 切換時選擇能涵蓋整天的那一端
fn pick<Tz: TimeZone>(result: LocalResult<DateTime<Tz>>, earliest: bool) -> Option<DateTime<Utc>> {
    let chosen = if earliest {
        result.earliest()
    } else {
        result.latest()
    };
    chosen.map(|dt| dt.with_timezone(&Utc))
}

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        OmikujiError::invalid_range(format!("{} '{}' is not a YYYY-MM-DD date ({})", field, value, e))
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub range: DateRange,
    pub result: AggregationResult,
    pub segments: Vec<Segment>,
    pub legend: Vec<LegendEntry>,
}

/// Entry point for draw, history and statistics requests.
pub struct OmikujiService<S: ResultStore> {
    store: Arc<S>,
    generator: DrawGenerator,
    clock: Arc<dyn ClockPort>,
    history: HistoryQuery<S>,
    aggregator: RangeAggregator<S>,
    zone: ReportZone,
    history_limit: NonZeroUsize,
    window_days: u32,
}

impl<S: ResultStore> OmikujiService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            history: HistoryQuery::new(Arc::clone(&store)),
            aggregator: RangeAggregator::new(Arc::clone(&store)),
            store,
            generator: DrawGenerator::default(),
            clock: Arc::new(SystemClock),
            zone: ReportZone::Local,
            history_limit: DEFAULT_HISTORY_LIMIT,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    pub fn with_random(mut self, random: Arc<dyn RandomPort>) -> Self {
        self.generator = DrawGenerator::new(random);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn ClockPort>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_zone(mut self, zone: ReportZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_history_limit(mut self, limit: NonZeroUsize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    pub fn history_query(&self) -> &HistoryQuery<S> {
        &self.history
    }

    pub fn aggregator(&self) -> &RangeAggregator<S> {
        &self.aggregator
    }

    /// Draws a category and records it.
    ///
    /// When the store rejects the write the outcome is still returned inside
    /// [`OmikujiError::DrawNotRecorded`], so the caller may show it anyway.
    pub async fn draw(&self) -> Result<DrawRecord> {
        let outcome = self.generator.draw();
        let timestamp = self.clock.now().trunc_subsecs(3);

        match self.store.append(outcome, timestamp).await {
            Ok(record) => {
                tracing::info!("🎋 Drew {} ({})", record.outcome, record.id);
                Ok(record)
            }
            Err(e) => {
                tracing::error!("❌ Failed to record draw {} at {}: {}", outcome, timestamp, e);
                Err(OmikujiError::DrawNotRecorded {
                    outcome,
                    source: Box::new(e),
                })
            }
        }
    }

    /// Recent draws for display. History is secondary, so a failing store
    /// yields an empty list instead of an error.
    pub async fn history(&self, limit: Option<NonZeroUsize>) -> Vec<HistoryEntry> {
        let limit = limit.unwrap_or(self.history_limit);
        match self.history.latest(limit).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("⚠️ Failed to load history (limit {}): {}", limit, e);
                Vec::new()
            }
        }
    }

    /// The default statistics window: `window_days` days back through today.
    pub fn default_window(&self) -> (NaiveDate, NaiveDate) {
        let today = self.zone.today(self.clock.now());
        let start = today
            .checked_sub_days(Days::new(u64::from(self.window_days)))
            .unwrap_or(NaiveDate::MIN);
        (start, today)
    }

    /// Statistics for `YYYY-MM-DD` dates; an omitted date falls back to the
    /// default window.
    pub async fn statistics(&self, start: Option<&str>, end: Option<&str>) -> Result<StatisticsReport> {
        let (default_start, default_end) = self.default_window();
        let start = match start {
            Some(value) => parse_date("start date", value)?,
            None => default_start,
        };
        let end = match end {
            Some(value) => parse_date("end date", value)?,
            None => default_end,
        };
        self.statistics_for_days(start, end).await
    }

    pub async fn statistics_for_days(&self, start: NaiveDate, end: NaiveDate) -> Result<StatisticsReport> {
        let range = self.zone.day_range(start, end)?;

        let result = self.aggregator.aggregate(&range).await.map_err(|e| {
            tracing::error!("❌ Aggregation for {} ~ {} failed: {}", start, end, e);
            e
        })?;

        if result.unrecognized > 0 {
            tracing::warn!(
                "⚠️ {} draws between {} and {} had unknown outcomes and were not counted",
                result.unrecognized,
                start,
                end
            );
        }

        Ok(StatisticsReport {
            start_date: start,
            end_date: end,
            range,
            segments: derive_segments(&result),
            legend: legend(&result),
            result,
        })
    }
}
