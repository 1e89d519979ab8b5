pub mod detection_models;
pub mod summary_models;

pub use detection_models::{
    CameraLocation, DetectionEvent, DetectionStatus, Priority, ZoneCategory,
    NOTIFICATION_DELIVERY_RATE,
};
pub use summary_models::{
    average_minutes, DailySummary, Dataset, HourlyStat, LocationSummary, SystemMetrics,
    SUMMARY_DAYS,
};
