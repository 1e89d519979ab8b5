use crate::error::Error;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Probability that a notification for a still-active violation has been delivered
pub const NOTIFICATION_DELIVERY_RATE: f64 = 0.8;

/// Duration category of a camera, drives the synthetic dwell time range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneCategory {
    DropOff,
    EntranceExit,
    Other,
}

impl ZoneCategory {
    /// Inclusive range of dwell minutes generated for this zone
    pub fn duration_range(self) -> (u32, u32) {
        match self {
            ZoneCategory::DropOff => (2, 12),
            ZoneCategory::EntranceExit => (10, 40),
            ZoneCategory::Other => (5, 30),
        }
    }
}

/// Monitored camera location
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraLocation {
    MainEntrance,
    PedestrianWalkway,
    DropOffArea,
    RearExit,
}

impl CameraLocation {
    pub const ALL: [CameraLocation; 4] = [
        CameraLocation::MainEntrance,
        CameraLocation::PedestrianWalkway,
        CameraLocation::DropOffArea,
        CameraLocation::RearExit,
    ];

    /// Label shown on the monitoring screens and in exports
    pub fn label(self) -> &'static str {
        match self {
            CameraLocation::MainEntrance => "Kamera-01: Pintu Masuk Utama",
            CameraLocation::PedestrianWalkway => "Kamera-02: Jalur Pejalan Kaki",
            CameraLocation::DropOffArea => "Kamera-03: Area Drop-off",
            CameraLocation::RearExit => "Kamera-04: Pintu Keluar Belakang",
        }
    }

    /// Short identifier, e.g. `cam3`
    pub fn short_id(self) -> &'static str {
        match self {
            CameraLocation::MainEntrance => "cam1",
            CameraLocation::PedestrianWalkway => "cam2",
            CameraLocation::DropOffArea => "cam3",
            CameraLocation::RearExit => "cam4",
        }
    }

    pub fn category(self) -> ZoneCategory {
        match self {
            CameraLocation::DropOffArea => ZoneCategory::DropOff,
            CameraLocation::MainEntrance | CameraLocation::RearExit => ZoneCategory::EntranceExit,
            CameraLocation::PedestrianWalkway => ZoneCategory::Other,
        }
    }
}

impl std::fmt::Display for CameraLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for CameraLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        CameraLocation::ALL
            .into_iter()
            .find(|loc| {
                needle.eq_ignore_ascii_case(loc.short_id())
                    || needle.eq_ignore_ascii_case(loc.label())
                    || needle.eq_ignore_ascii_case(&format!("{:?}", loc))
                    || (needle.len() >= "kamera-0x".len()
                        && loc
                            .label()
                            .to_ascii_lowercase()
                            .starts_with(&needle.to_ascii_lowercase()))
            })
            .ok_or_else(|| Error::InvalidInput(format!("Unknown camera location: {}", s)))
    }
}

/// Lifecycle state of a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DetectionStatus {
    Active,
    Completed,
}

impl DetectionStatus {
    /// A detection stays active while less than its duration has elapsed
    pub fn derive(
        timestamp: NaiveDateTime,
        duration_minutes: u32,
        current_time: NaiveDateTime,
    ) -> Self {
        if current_time - timestamp < Duration::minutes(i64::from(duration_minutes)) {
            DetectionStatus::Active
        } else {
            DetectionStatus::Completed
        }
    }
}

impl std::fmt::Display for DetectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionStatus::Active => write!(f, "Active"),
            DetectionStatus::Completed => write!(f, "Completed"),
        }
    }
}

impl FromStr for DetectionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(DetectionStatus::Active),
            "completed" => Ok(DetectionStatus::Completed),
            other => Err(Error::InvalidInput(format!("Unknown status: {}", other))),
        }
    }
}

/// Urgency of a detection. Declaration order is display order (most urgent first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Duration is checked before location at each level.
    pub fn derive(duration_minutes: u32, location: CameraLocation) -> Self {
        if duration_minutes > 30 || location == CameraLocation::MainEntrance {
            Priority::High
        } else if duration_minutes > 15 || location == CameraLocation::PedestrianWalkway {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(Error::InvalidInput(format!("Unknown priority: {}", other))),
        }
    }
}

/// A single (simulated) sighting of an illegal parking attendant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub id: Uuid,
    pub timestamp: NaiveDateTime,
    pub location: CameraLocation,
    pub confidence: f64,
    pub duration_minutes: u32,
    pub status: DetectionStatus,
    pub priority: Priority,
    pub notification_sent: bool,
}

impl DetectionEvent {
    pub fn is_active(&self) -> bool {
        self.status == DetectionStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_priority_derivation() {
        for loc in CameraLocation::ALL {
            assert_eq!(Priority::derive(35, loc), Priority::High);
        }
        assert_eq!(
            Priority::derive(20, CameraLocation::PedestrianWalkway),
            Priority::Medium
        );
        assert_eq!(Priority::derive(8, CameraLocation::DropOffArea), Priority::Low);
        assert_eq!(Priority::derive(5, CameraLocation::MainEntrance), Priority::High);
        assert_eq!(Priority::derive(16, CameraLocation::RearExit), Priority::Medium);
        assert_eq!(Priority::derive(30, CameraLocation::DropOffArea), Priority::Medium);
        assert_eq!(Priority::derive(15, CameraLocation::RearExit), Priority::Low);
    }

    #[test]
    fn test_status_boundary() {
        let now = at(14, 30);
        assert_eq!(
            DetectionStatus::derive(at(14, 21), 10, now),
            DetectionStatus::Active
        );
        // exactly the duration elapsed is no longer active
        assert_eq!(
            DetectionStatus::derive(at(14, 20), 10, now),
            DetectionStatus::Completed
        );
        assert_eq!(
            DetectionStatus::derive(now, 2, now),
            DetectionStatus::Active
        );
    }

    #[test]
    fn test_location_parsing() {
        assert_eq!(
            "Kamera-03: Area Drop-off".parse::<CameraLocation>().unwrap(),
            CameraLocation::DropOffArea
        );
        assert_eq!("cam4".parse::<CameraLocation>().unwrap(), CameraLocation::RearExit);
        assert_eq!(
            "MainEntrance".parse::<CameraLocation>().unwrap(),
            CameraLocation::MainEntrance
        );
        assert_eq!(
            "kamera-02".parse::<CameraLocation>().unwrap(),
            CameraLocation::PedestrianWalkway
        );
        assert!("lobby".parse::<CameraLocation>().is_err());
    }

    #[test]
    fn test_zone_categories() {
        assert_eq!(CameraLocation::DropOffArea.category().duration_range(), (2, 12));
        assert_eq!(CameraLocation::MainEntrance.category().duration_range(), (10, 40));
        assert_eq!(CameraLocation::RearExit.category().duration_range(), (10, 40));
        assert_eq!(
            CameraLocation::PedestrianWalkway.category().duration_range(),
            (5, 30)
        );
    }

    #[test]
    fn test_priority_order_is_urgency_order() {
        let mut v = vec![Priority::Low, Priority::High, Priority::Medium];
        v.sort();
        assert_eq!(v, Priority::ALL.to_vec());
    }
}
