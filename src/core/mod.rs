pub mod aggregate;
pub mod draw;
pub mod history;
pub mod service;

pub use crate::domain::model::{
    AggregationResult, Category, DateRange, DrawRecord, HistoryEntry, LegendEntry, Outcome, Segment,
};
pub use crate::domain::ports::{ClockPort, RandomPort, ResultStore};
pub use crate::utils::error::Result;
