use crate::config::CamerasConfig;
use crate::models::{CameraLocation, DailySummary, Dataset, DetectionEvent};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Window for the recent alert history
pub const RECENT_ALERT_HOURS: i64 = 24;

/// Entries shown in the recent alert history by default
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Active detections, most urgent first and most recent first within a priority
pub fn active_alerts(dataset: &Dataset) -> Vec<&DetectionEvent> {
    let mut active: Vec<&DetectionEvent> =
        dataset.events.iter().filter(|e| e.is_active()).collect();
    active.sort_by_key(|e| (e.priority, Reverse(e.timestamp)));
    active
}

/// Detections from the last 24 hours before `now`, newest first
pub fn recent_alerts(dataset: &Dataset, now: NaiveDateTime, limit: usize) -> Vec<&DetectionEvent> {
    let since = now - Duration::hours(RECENT_ALERT_HOURS);
    dataset
        .events
        .iter()
        .rev()
        .filter(|e| e.timestamp >= since && e.timestamp <= now)
        .take(limit)
        .collect()
}

/// Indicator shown for each camera feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraStatus {
    Clear,
    Active(usize),
}

impl std::fmt::Display for CameraStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraStatus::Clear => write!(f, "CLEAR"),
            CameraStatus::Active(n) => write!(f, "ACTIVE: {}", n),
        }
    }
}

pub fn camera_status(dataset: &Dataset) -> Vec<(CameraLocation, CameraStatus)> {
    dataset
        .location_summary
        .iter()
        .map(|(&loc, summary)| {
            let status = if summary.active > 0 {
                CameraStatus::Active(summary.active)
            } else {
                CameraStatus::Clear
            };
            (loc, status)
        })
        .collect()
}

/// Headline numbers for the monitoring screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    pub today_detections: usize,
    pub yesterday_detections: usize,
    pub delta: i64,
    pub active_detections: usize,
    pub enabled_cameras: usize,
    pub total_cameras: usize,
    /// Mean duration over all detections, 0.0 when there are none
    pub average_duration: f64,
    pub today: Option<DailySummary>,
}

pub fn overview(dataset: &Dataset, cameras: &CamerasConfig) -> Overview {
    let today = dataset.today();
    let today_detections = dataset.events_on(today).count();
    let yesterday_detections = dataset.events_on(today - Duration::days(1)).count();

    let mut enabled = cameras.enabled.clone();
    enabled.sort();
    enabled.dedup();

    Overview {
        today_detections,
        yesterday_detections,
        delta: today_detections as i64 - yesterday_detections as i64,
        active_detections: dataset.active_count(),
        enabled_cameras: enabled.len(),
        total_cameras: CameraLocation::ALL.len(),
        average_duration: crate::models::average_minutes(
            dataset.events.iter().map(|e| e.duration_minutes),
        ),
        today: dataset.daily_summary.get(&today).cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DetectionStatus;
    use crate::services::generator::DetectionGenerator;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(18, 45, 0)
            .unwrap()
    }

    #[test]
    fn test_active_alerts_ordering() {
        for seed in 0..10 {
            let dataset = DetectionGenerator::new(Some(seed)).generate(now());
            let alerts = active_alerts(&dataset);
            assert_eq!(alerts.len(), dataset.active_count());
            assert!(alerts.iter().all(|e| e.status == DetectionStatus::Active));
            for w in alerts.windows(2) {
                assert!(w[0].priority <= w[1].priority);
                if w[0].priority == w[1].priority {
                    assert!(w[0].timestamp >= w[1].timestamp);
                }
            }
        }
    }

    #[test]
    fn test_recent_alerts_window_and_limit() {
        let dataset = DetectionGenerator::new(Some(4)).generate(now());
        let since = now() - Duration::hours(24);

        let recent = recent_alerts(&dataset, now(), DEFAULT_RECENT_LIMIT);
        assert!(recent.len() <= DEFAULT_RECENT_LIMIT);
        assert!(recent.iter().all(|e| e.timestamp >= since));
        assert!(recent.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

        let all = recent_alerts(&dataset, now(), usize::MAX);
        let expected = dataset.events.iter().filter(|e| e.timestamp >= since).count();
        assert_eq!(all.len(), expected);
    }

    #[test]
    fn test_camera_status_covers_all_cameras() {
        let dataset = DetectionGenerator::new(Some(8)).generate(now());
        let statuses = camera_status(&dataset);
        assert_eq!(statuses.len(), 4);
        for (loc, status) in statuses {
            let active = dataset.location_summary[&loc].active;
            match status {
                CameraStatus::Clear => assert_eq!(active, 0),
                CameraStatus::Active(n) => assert_eq!(n, active),
            }
        }
        assert_eq!(CameraStatus::Active(2).to_string(), "ACTIVE: 2");
    }

    #[test]
    fn test_overview_counts() {
        let dataset = DetectionGenerator::new(Some(6)).generate(now());
        let overview = overview(&dataset, &CamerasConfig::default());

        assert_eq!(overview.enabled_cameras, 3);
        assert_eq!(overview.total_cameras, 4);
        assert_eq!(
            overview.today_detections,
            dataset.daily_summary[&now().date()].total
        );
        assert_eq!(
            overview.delta,
            overview.today_detections as i64 - overview.yesterday_detections as i64
        );
        assert!(overview.today.is_some());
        assert!(overview.average_duration > 0.0);
    }
}
