pub mod alerts;
pub mod export;
pub mod filter;
pub mod generator;
pub mod statistics;

pub use alerts::{active_alerts, camera_status, overview, recent_alerts, CameraStatus, Overview};
pub use export::CsvExporter;
pub use filter::DetectionFilter;
pub use generator::DetectionGenerator;
pub use statistics::{DayPeriod, DurationBucket, RangeStatistics};
