use crate::models::{
    average_minutes, CameraLocation, DailySummary, Dataset, DetectionEvent, DetectionStatus,
    HourlyStat, LocationSummary, SUMMARY_DAYS,
};
use chrono::{Duration, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Build the trailing per-day summary ending at `today`. Days without
/// detections are present with zero totals.
pub fn daily_summary(
    events: &[DetectionEvent],
    today: NaiveDate,
) -> BTreeMap<NaiveDate, DailySummary> {
    (0..SUMMARY_DAYS)
        .map(|offset| {
            let date = today - Duration::days(offset);
            let day: Vec<&DetectionEvent> = events
                .iter()
                .filter(|e| e.timestamp.date() == date)
                .collect();

            let average_duration = average_minutes(
                day.iter()
                    .filter(|e| e.status == DetectionStatus::Completed)
                    .map(|e| e.duration_minutes),
            );

            let location_counts = CameraLocation::ALL
                .into_iter()
                .map(|loc| (loc, day.iter().filter(|e| e.location == loc).count()))
                .collect();

            (
                date,
                DailySummary {
                    date,
                    total: day.len(),
                    average_duration,
                    location_counts,
                },
            )
        })
        .collect()
}

/// Count detections per hour of day; always 24 entries
pub fn hourly_stats(events: &[DetectionEvent]) -> Vec<HourlyStat> {
    let mut counts = [0usize; 24];
    for e in events {
        counts[e.timestamp.hour() as usize] += 1;
    }
    counts
        .iter()
        .enumerate()
        .map(|(hour, &count)| HourlyStat {
            hour: hour as u32,
            count,
        })
        .collect()
}

/// Aggregate per camera; always one entry per location
pub fn location_summary(events: &[DetectionEvent]) -> BTreeMap<CameraLocation, LocationSummary> {
    CameraLocation::ALL
        .into_iter()
        .map(|loc| {
            let at_loc: Vec<&DetectionEvent> =
                events.iter().filter(|e| e.location == loc).collect();
            (
                loc,
                LocationSummary {
                    total: at_loc.len(),
                    active: at_loc.iter().filter(|e| e.is_active()).count(),
                    average_duration: average_minutes(at_loc.iter().map(|e| e.duration_minutes)),
                },
            )
        })
        .collect()
}

/// Coarse part of the day used to group hourly counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayPeriod {
    Morning,
    Midday,
    Afternoon,
    Evening,
    Night,
}

impl DayPeriod {
    pub const ALL: [DayPeriod; 5] = [
        DayPeriod::Morning,
        DayPeriod::Midday,
        DayPeriod::Afternoon,
        DayPeriod::Evening,
        DayPeriod::Night,
    ];

    pub fn of_hour(hour: u32) -> Self {
        match hour {
            5..=9 => DayPeriod::Morning,
            10..=13 => DayPeriod::Midday,
            14..=17 => DayPeriod::Afternoon,
            18..=21 => DayPeriod::Evening,
            _ => DayPeriod::Night,
        }
    }
}

impl std::fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayPeriod::Morning => write!(f, "Morning (5-10)"),
            DayPeriod::Midday => write!(f, "Midday (10-14)"),
            DayPeriod::Afternoon => write!(f, "Afternoon (14-18)"),
            DayPeriod::Evening => write!(f, "Evening (18-22)"),
            DayPeriod::Night => write!(f, "Night (22-5)"),
        }
    }
}

/// Hour with the most detections; the earliest hour wins ties
pub fn peak_hour(hourly: &[HourlyStat]) -> Option<HourlyStat> {
    hourly
        .iter()
        .copied()
        .reduce(|best, s| if s.count > best.count { s } else { best })
}

/// Period with the largest summed count; earlier periods win ties
pub fn busiest_period(hourly: &[HourlyStat]) -> DayPeriod {
    let totals = period_totals(hourly);
    DayPeriod::ALL
        .into_iter()
        .reduce(|best, p| if totals[&p] > totals[&best] { p } else { best })
        .unwrap_or(DayPeriod::Morning)
}

pub fn period_totals(hourly: &[HourlyStat]) -> BTreeMap<DayPeriod, usize> {
    let mut totals: BTreeMap<DayPeriod, usize> =
        DayPeriod::ALL.into_iter().map(|p| (p, 0)).collect();
    for s in hourly {
        *totals.entry(DayPeriod::of_hour(s.hour)).or_insert(0) += s.count;
    }
    totals
}

/// Totals over an inclusive date range of the daily summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeStatistics {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_violations: usize,
    /// Mean of the per-day average durations in range
    pub average_duration: f64,
    pub busiest_day: Option<DailySummary>,
}

/// A reversed range selects no days.
pub fn range_statistics(dataset: &Dataset, from: NaiveDate, to: NaiveDate) -> RangeStatistics {
    let days: Vec<&DailySummary> = if from > to {
        Vec::new()
    } else {
        dataset.daily_summary.range(from..=to).map(|(_, d)| d).collect()
    };

    let total_violations = days.iter().map(|d| d.total).sum();
    let average_duration = if days.is_empty() {
        0.0
    } else {
        days.iter().map(|d| d.average_duration).sum::<f64>() / days.len() as f64
    };
    let busiest_day = days
        .iter()
        .copied()
        .reduce(|best, d| if d.total > best.total { d } else { best })
        .cloned();

    RangeStatistics {
        from,
        to,
        total_violations,
        average_duration,
        busiest_day,
    }
}

/// Right-closed duration bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DurationBucket {
    UpTo5,
    UpTo10,
    UpTo15,
    UpTo30,
    UpTo60,
    Over60,
}

impl DurationBucket {
    pub const ALL: [DurationBucket; 6] = [
        DurationBucket::UpTo5,
        DurationBucket::UpTo10,
        DurationBucket::UpTo15,
        DurationBucket::UpTo30,
        DurationBucket::UpTo60,
        DurationBucket::Over60,
    ];

    pub fn of_minutes(minutes: u32) -> Self {
        match minutes {
            0..=5 => DurationBucket::UpTo5,
            6..=10 => DurationBucket::UpTo10,
            11..=15 => DurationBucket::UpTo15,
            16..=30 => DurationBucket::UpTo30,
            31..=60 => DurationBucket::UpTo60,
            _ => DurationBucket::Over60,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationBucket::UpTo5 => "<5",
            DurationBucket::UpTo10 => "5-10",
            DurationBucket::UpTo15 => "10-15",
            DurationBucket::UpTo30 => "15-30",
            DurationBucket::UpTo60 => "30-60",
            DurationBucket::Over60 => ">60",
        }
    }
}

/// Detection counts per duration bucket, all buckets present
pub fn duration_histogram<'a, I>(events: I) -> BTreeMap<DurationBucket, usize>
where
    I: IntoIterator<Item = &'a DetectionEvent>,
{
    let mut histogram: BTreeMap<DurationBucket, usize> =
        DurationBucket::ALL.into_iter().map(|b| (b, 0)).collect();
    for e in events {
        *histogram
            .entry(DurationBucket::of_minutes(e.duration_minutes))
            .or_insert(0) += 1;
    }
    histogram
}
