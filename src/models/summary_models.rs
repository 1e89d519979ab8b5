use super::detection_models::{CameraLocation, DetectionEvent};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of calendar days covered by the daily summary, today included
pub const SUMMARY_DAYS: i64 = 7;

/// Per-day aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total: usize,
    /// Mean duration of completed detections, 0.0 when there are none
    pub average_duration: f64,
    pub location_counts: BTreeMap<CameraLocation, usize>,
}

/// Detections falling into one hour of the day, across all days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyStat {
    pub hour: u32,
    pub count: usize,
}

/// Per-camera aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub total: usize,
    pub active: usize,
    /// Mean duration over all detections at the location, 0.0 when there are none
    pub average_duration: f64,
}

/// Cosmetic pipeline telemetry shown next to the camera feeds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub fps: f64,
    pub latency_ms: f64,
    pub gpu_usage: f64,
}

/// Everything one generation run produces. Consumers only read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub generated_at: NaiveDateTime,
    /// Sorted by timestamp, ascending
    pub events: Vec<DetectionEvent>,
    pub daily_summary: BTreeMap<NaiveDate, DailySummary>,
    pub hourly_stats: Vec<HourlyStat>,
    pub location_summary: BTreeMap<CameraLocation, LocationSummary>,
    pub metrics: SystemMetrics,
}

impl Dataset {
    pub fn today(&self) -> NaiveDate {
        self.generated_at.date()
    }

    pub fn active_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_active()).count()
    }

    pub fn events_on(&self, date: NaiveDate) -> impl Iterator<Item = &DetectionEvent> {
        self.events
            .iter()
            .filter(move |e| e.timestamp.date() == date)
    }
}

/// Mean of an iterator of minutes; empty input yields 0.0
pub fn average_minutes<I>(durations: I) -> f64
where
    I: IntoIterator<Item = u32>,
{
    let (sum, count) = durations
        .into_iter()
        .fold((0u64, 0u64), |(s, c), d| (s + u64::from(d), c + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
