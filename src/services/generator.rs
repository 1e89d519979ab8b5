use crate::config::GeneratorConfig;
use crate::models::{
    CameraLocation, Dataset, DetectionEvent, DetectionStatus, Priority, SystemMetrics,
    NOTIFICATION_DELIVERY_RATE,
};
use crate::services::statistics;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Hours with elevated violation activity (morning, lunch and evening rush)
pub const PEAK_HOURS: [u32; 6] = [8, 9, 12, 13, 17, 18];

/// First monitored hour of the day
pub const FIRST_ACTIVE_HOUR: u32 = 7;

/// Last monitored hour of the day for completed history days
pub const LAST_ACTIVE_HOUR: u32 = 21;

/// Number of full days of history before today
pub const HISTORY_DAYS: i64 = 5;

const PEAK_RANGE: (u32, u32) = (2, 5);
const OFF_PEAK_RANGE: (u32, u32) = (0, 2);

const CONFIDENCE_RANGE: (f64, f64) = (0.75, 0.98);
const FPS_RANGE: (f64, f64) = (21.5, 28.5);
const LATENCY_RANGE: (f64, f64) = (35.0, 95.0);
const GPU_USAGE_RANGE: (f64, f64) = (60.0, 85.0);

pub fn is_peak_hour(hour: u32) -> bool {
    PEAK_HOURS.contains(&hour)
}

/// Synthetic detection generator
pub struct DetectionGenerator {
    rng: StdRng,
}

impl DetectionGenerator {
    /// Create a generator, seeded for reproducible output when a seed is given
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.seed)
    }

    /// Generate a fresh dataset relative to `current_time`
    pub fn generate(&mut self, current_time: NaiveDateTime) -> Dataset {
        let dataset = generate(current_time, &mut self.rng);
        info!(
            "Generated {} detections ({} active) for {}",
            dataset.events.len(),
            dataset.active_count(),
            current_time.format("%Y-%m-%d %H:%M:%S")
        );
        dataset
    }
}

/// Generate a dataset from an explicit random source
pub fn generate<R: Rng + ?Sized>(current_time: NaiveDateTime, rng: &mut R) -> Dataset {
    let timestamps = schedule_timestamps(current_time, rng);

    let mut events: Vec<DetectionEvent> = timestamps
        .into_iter()
        .map(|ts| build_event(ts, current_time, rng))
        .collect();

    sort_chronologically(&mut events);
    debug!("Scheduled {} detection slots", events.len());

    let daily_summary = statistics::daily_summary(&events, current_time.date());
    let hourly_stats = statistics::hourly_stats(&events);
    let location_summary = statistics::location_summary(&events);
    let metrics = system_metrics(rng);

    Dataset {
        generated_at: current_time,
        events,
        daily_summary,
        hourly_stats,
        location_summary,
        metrics,
    }
}

/// Draw how many violations happen in `hour`
fn violations_in_hour<R: Rng + ?Sized>(hour: u32, rng: &mut R) -> u32 {
    let (lo, hi) = if is_peak_hour(hour) {
        PEAK_RANGE
    } else {
        OFF_PEAK_RANGE
    };
    rng.gen_range(lo..=hi)
}

fn at(date: NaiveDate, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
        + Duration::hours(i64::from(hour))
        + Duration::minutes(i64::from(minute))
        + Duration::seconds(i64::from(second))
}

/// Lay out timestamps for the history days and today's partial day.
/// Every timestamp shares the seconds of `current_time`, so capping the
/// minute of the current hour is enough to stay in the past.
fn schedule_timestamps<R: Rng + ?Sized>(
    current_time: NaiveDateTime,
    rng: &mut R,
) -> Vec<NaiveDateTime> {
    let today = current_time.date();
    let second = current_time.second();
    let mut timestamps = Vec::new();

    for day in 1..=HISTORY_DAYS {
        let date = today - Duration::days(day);
        for hour in FIRST_ACTIVE_HOUR..=LAST_ACTIVE_HOUR {
            for _ in 0..violations_in_hour(hour, rng) {
                let minute = rng.gen_range(0..=59);
                timestamps.push(at(date, hour, minute, second));
            }
        }
    }

    let current_hour = current_time.hour();
    for hour in FIRST_ACTIVE_HOUR..=current_hour {
        let max_minute = if hour == current_hour {
            current_time.minute()
        } else {
            59
        };
        for _ in 0..violations_in_hour(hour, rng) {
            let minute = rng.gen_range(0..=max_minute);
            timestamps.push(at(today, hour, minute, second));
        }
    }

    timestamps
}

fn build_event<R: Rng + ?Sized>(
    timestamp: NaiveDateTime,
    current_time: NaiveDateTime,
    rng: &mut R,
) -> DetectionEvent {
    let location = CameraLocation::ALL[rng.gen_range(0..CameraLocation::ALL.len())];
    let confidence = round2(rng.gen_range(CONFIDENCE_RANGE.0..=CONFIDENCE_RANGE.1));
    let (min_duration, max_duration) = location.category().duration_range();
    let duration_minutes = rng.gen_range(min_duration..=max_duration);

    let status = DetectionStatus::derive(timestamp, duration_minutes, current_time);
    let priority = Priority::derive(duration_minutes, location);
    let notification_sent =
        status == DetectionStatus::Completed || rng.gen_bool(NOTIFICATION_DELIVERY_RATE);

    DetectionEvent {
        id: Uuid::from_bytes(rng.gen()),
        timestamp,
        location,
        confidence,
        duration_minutes,
        status,
        priority,
        notification_sent,
    }
}

/// Oldest first. Stable, so equal timestamps keep their creation order.
pub fn sort_chronologically(events: &mut [DetectionEvent]) {
    events.sort_by_key(|e| e.timestamp);
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn system_metrics<R: Rng + ?Sized>(rng: &mut R) -> SystemMetrics {
    SystemMetrics {
        fps: rng.gen_range(FPS_RANGE.0..FPS_RANGE.1),
        latency_ms: rng.gen_range(LATENCY_RANGE.0..LATENCY_RANGE.1),
        gpu_usage: rng.gen_range(GPU_USAGE_RANGE.0..GPU_USAGE_RANGE.1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SUMMARY_DAYS;
    use std::collections::HashSet;

    fn reference_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_no_future_timestamps() {
        for seed in 0..20 {
            let now = reference_time() + Duration::seconds(seed as i64 * 97);
            let dataset = DetectionGenerator::new(Some(seed)).generate(now);
            assert!(dataset.events.iter().all(|e| e.timestamp <= now));
        }
    }

    #[test]
    fn test_events_sorted_ascending() {
        let dataset = DetectionGenerator::new(Some(7)).generate(reference_time());
        assert!(dataset
            .events
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_sort_orders_shuffled_creation() {
        let now = reference_time();
        let mut rng = StdRng::seed_from_u64(9);
        let t = |hours_ago: i64| now - Duration::hours(hours_ago);

        let mut events = vec![
            build_event(t(0), now, &mut rng),
            build_event(t(2), now, &mut rng),
            build_event(t(1), now, &mut rng),
            build_event(t(2), now, &mut rng),
        ];
        let tied = (events[1].id, events[3].id);
        sort_chronologically(&mut events);

        let order: Vec<NaiveDateTime> = events.iter().map(|e| e.timestamp).collect();
        assert_eq!(order, vec![t(2), t(2), t(1), t(0)]);
        assert_eq!((events[0].id, events[1].id), tied);
    }

    #[test]
    fn test_field_ranges() {
        let dataset = DetectionGenerator::new(Some(3)).generate(reference_time());
        assert!(!dataset.events.is_empty());
        for e in &dataset.events {
            let (lo, hi) = e.location.category().duration_range();
            assert!(e.duration_minutes > 0);
            assert!((lo..=hi).contains(&e.duration_minutes));
            assert!((0.75..=0.98).contains(&e.confidence));
            assert_eq!(e.confidence, round2(e.confidence));
            assert_eq!(e.priority, Priority::derive(e.duration_minutes, e.location));
            assert_eq!(
                e.status,
                DetectionStatus::derive(e.timestamp, e.duration_minutes, reference_time())
            );
            if e.status == DetectionStatus::Completed {
                assert!(e.notification_sent);
            }
        }
    }

    #[test]
    fn test_history_covers_active_hours_only() {
        let now = reference_time();
        let dataset = DetectionGenerator::new(Some(11)).generate(now);
        for e in &dataset.events {
            let hour = e.timestamp.hour();
            assert!(hour >= FIRST_ACTIVE_HOUR);
            if e.timestamp.date() == now.date() {
                assert!(hour <= now.hour());
            } else {
                assert!(hour <= LAST_ACTIVE_HOUR);
                let age = (now.date() - e.timestamp.date()).num_days();
                assert!((1..=HISTORY_DAYS).contains(&age));
            }
        }
    }

    #[test]
    fn test_peak_hours_always_populated_in_history() {
        let now = reference_time();
        let dataset = DetectionGenerator::new(Some(5)).generate(now);
        for day in 1..=HISTORY_DAYS {
            let date = now.date() - Duration::days(day);
            for hour in PEAK_HOURS {
                let n = dataset
                    .events_on(date)
                    .filter(|e| e.timestamp.hour() == hour)
                    .count();
                assert!((2..=5).contains(&n), "{} {}:00 had {}", date, hour, n);
            }
        }
    }

    #[test]
    fn test_before_opening_today_is_empty() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(6, 15, 0)
            .unwrap();
        let dataset = DetectionGenerator::new(Some(1)).generate(now);
        assert_eq!(dataset.events_on(now.date()).count(), 0);
        assert_eq!(dataset.daily_summary[&now.date()].total, 0);
    }

    #[test]
    fn test_current_hour_minute_is_capped() {
        // 08:00:00 is a peak hour, so at least two detections land on the first minute
        let now = NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        for seed in 0..10 {
            let dataset = DetectionGenerator::new(Some(seed)).generate(now);
            let current: Vec<_> = dataset
                .events_on(now.date())
                .filter(|e| e.timestamp.hour() == 8)
                .collect();
            assert!(current.len() >= 2);
            assert!(current.iter().all(|e| e.timestamp == now));
            assert!(current.iter().all(|e| e.is_active()));
        }
    }

    #[test]
    fn test_summaries_are_total() {
        let dataset = DetectionGenerator::new(Some(9)).generate(reference_time());
        assert_eq!(dataset.daily_summary.len(), SUMMARY_DAYS as usize);
        assert_eq!(dataset.hourly_stats.len(), 24);
        assert_eq!(dataset.location_summary.len(), 4);
    }

    #[test]
    fn test_metrics_ranges() {
        let dataset = DetectionGenerator::new(Some(2)).generate(reference_time());
        let m = dataset.metrics;
        assert!((21.5..28.5).contains(&m.fps));
        assert!((35.0..95.0).contains(&m.latency_ms));
        assert!((60.0..85.0).contains(&m.gpu_usage));
    }

    #[test]
    fn test_same_seed_reproduces_dataset() {
        let a = DetectionGenerator::new(Some(42)).generate(reference_time());
        let b = DetectionGenerator::new(Some(42)).generate(reference_time());
        assert_eq!(a.events, b.events);
        assert_eq!(a.metrics, b.metrics);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = DetectionGenerator::new(Some(1)).generate(reference_time());
        let b = DetectionGenerator::new(Some(2)).generate(reference_time());
        assert_ne!(a.events, b.events);

        let ids: HashSet<_> = a.events.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), a.events.len());
    }
}
