use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A fortune grade. Variant order is the fixed display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "大吉")]
    Daikichi,
    #[serde(rename = "中吉")]
    Chukichi,
    #[serde(rename = "小吉")]
    Shokichi,
    #[serde(rename = "凶")]
    Kyo,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Daikichi,
        Category::Chukichi,
        Category::Shokichi,
        Category::Kyo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Daikichi => "大吉",
            Category::Chukichi => "中吉",
            Category::Shokichi => "小吉",
            Category::Kyo => "凶",
        }
    }

    /// Legend colour for chart rendering.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Daikichi => "#22c55e",
            Category::Chukichi => "#3b82f6",
            Category::Shokichi => "#f59e0b",
            Category::Kyo => "#ef4444",
        }
    }

    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLabel(pub String);

impl fmt::Display for InvalidLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a fortune category", self.0)
    }
}

impl std::error::Error for InvalidLabel {}

impl FromStr for Category {
    type Err = InvalidLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_label(s).ok_or_else(|| InvalidLabel(s.to_string()))
    }
}

/// An outcome as read back from storage. Labels written by other tools or
/// older versions are kept verbatim instead of failing the whole read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Known(Category),
    Unrecognized(String),
}

impl Outcome {
    pub fn from_stored(label: &str) -> Self {
        match Category::from_label(label) {
            Some(category) => Outcome::Known(category),
            None => Outcome::Unrecognized(label.to_string()),
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            Outcome::Known(category) => Some(*category),
            Outcome::Unrecognized(_) => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Outcome::Known(category) => category.label(),
            Outcome::Unrecognized(label) => label,
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Outcome::from_stored(&label))
    }
}

/// A draw as written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub id: String,
    #[serde(rename = "result")]
    pub outcome: Category,
    pub timestamp: DateTime<Utc>,
}

/// Read projection of a stored draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(rename = "result")]
    pub outcome: Outcome,
    pub timestamp: DateTime<Utc>,
}

impl From<DrawRecord> for HistoryEntry {
    fn from(record: DrawRecord) -> Self {
        HistoryEntry {
            id: record.id,
            outcome: Outcome::Known(record.outcome),
            timestamp: record.timestamp,
        }
    }
}

/// Inclusive instant window, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Returns `None` when `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start <= end).then_some(DateRange { start, end })
    }

    /// Builds a range without checking the bound order.
    #[cfg(test)]
    pub(crate) fn unchecked(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        DateRange { start, end }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationResult {
    /// Every category is present, zero included.
    pub counts: BTreeMap<Category, u64>,
    pub total: u64,
    /// Records in range whose stored label is not a known category.
    pub unrecognized: u64,
}

impl AggregationResult {
    pub fn empty() -> Self {
        AggregationResult {
            counts: Category::ALL.into_iter().map(|c| (c, 0)).collect(),
            total: 0,
            unrecognized: 0,
        }
    }

    pub fn count(&self, category: Category) -> u64 {
        self.counts.get(&category).copied().unwrap_or(0)
    }
}

/// A proportional span of the pie chart. `category` is `None` only for the
/// sentinel returned when there is nothing to display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub category: Option<Category>,
    pub start_percent: f64,
    pub end_percent: f64,
}

impl Segment {
    pub fn empty_sentinel() -> Self {
        Segment {
            category: None,
            start_percent: 0.0,
            end_percent: 100.0,
        }
    }

    pub fn is_empty_sentinel(&self) -> bool {
        self.category.is_none()
    }

    pub fn span(&self) -> f64 {
        self.end_percent - self.start_percent
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub category: Category,
    pub color: &'static str,
    pub count: u64,
    /// Rounded for display; entries need not sum to 100.
    pub percent: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for category in Category::ALL {
            assert_eq!(category.label().parse::<Category>(), Ok(category));
        }
        assert_eq!(
            "末吉".parse::<Category>(),
            Err(InvalidLabel("末吉".to_string()))
        );
    }

    #[test]
    fn test_display_order_matches_ord() {
        let mut sorted = Category::ALL;
        sorted.sort();
        assert_eq!(sorted, Category::ALL);
    }

    #[test]
    fn test_outcome_keeps_unknown_labels() {
        assert_eq!(Outcome::from_stored("中吉"), Outcome::Known(Category::Chukichi));

        let foreign = Outcome::from_stored("末吉");
        assert_eq!(foreign.category(), None);
        assert_eq!(foreign.label(), "末吉");
    }

    #[test]
    fn test_history_entry_serializes_label_as_result() {
        let entry = HistoryEntry {
            id: "abc".to_string(),
            outcome: Outcome::Known(Category::Daikichi),
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["result"], "大吉");

        let back: HistoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let end = start + Duration::hours(1);
        let range = DateRange::new(start, end).unwrap();

        assert!(range.contains(start));
        assert!(range.contains(end));
        assert!(!range.contains(start - Duration::milliseconds(1)));
        assert!(!range.contains(end + Duration::milliseconds(1)));
        assert!(DateRange::new(end, start).is_none());
        assert!(DateRange::new(start, start).is_some());
    }

    #[test]
    fn test_empty_aggregation_has_every_category() {
        let empty = AggregationResult::empty();
        assert_eq!(empty.counts.len(), Category::ALL.len());
        assert!(Category::ALL.iter().all(|c| empty.count(*c) == 0));
        assert_eq!(empty.total, 0);
    }
}
