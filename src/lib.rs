pub mod config;
pub mod error;
pub mod frame;
pub mod models;
pub mod services;

// Re-export main components for easier use
pub use config::{load_config, Config};
pub use error::Error;
pub use models::{
    CameraLocation, Dataset, DetectionEvent, DetectionStatus, Priority, SystemMetrics,
};
pub use services::{CsvExporter, DetectionFilter, DetectionGenerator};
