use crate::error::Error;
use crate::models::CameraLocation;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub cameras: CamerasConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub frame: FrameConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Synthetic data generator configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneratorConfig {
    /// Fixed RNG seed; a fresh entropy seed is used when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Which cameras are switched on in the control panel
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CamerasConfig {
    #[serde(default = "default_enabled_cameras")]
    pub enabled: Vec<CameraLocation>,
}

fn default_enabled_cameras() -> Vec<CameraLocation> {
    vec![
        CameraLocation::MainEntrance,
        CameraLocation::PedestrianWalkway,
        CameraLocation::DropOffArea,
    ]
}

/// Default bounds for the detection history filter
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Minimum confidence (0.0 - 1.0)
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Minimum duration in minutes (inclusive)
    #[serde(default)]
    pub min_duration: u32,
    /// Maximum duration in minutes (inclusive)
    #[serde(default = "default_max_duration")]
    pub max_duration: u32,
}

fn default_min_confidence() -> f64 {
    0.5
}

fn default_max_duration() -> u32 {
    60
}

/// CSV export configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Directory for exported files when no explicit path is given
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_delimiter() -> char {
    ','
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Mock CCTV frame configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FrameConfig {
    #[serde(default = "default_frame_width")]
    pub width: u32,
    #[serde(default = "default_frame_height")]
    pub height: u32,
    /// Max per-channel noise added to simulate a poor sensor
    #[serde(default = "default_noise_amplitude")]
    pub noise_amplitude: u8,
}

fn default_frame_width() -> u32 {
    640
}

fn default_frame_height() -> u32 {
    480
}

fn default_noise_amplitude() -> u8 {
    10
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CamerasConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_cameras(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            min_duration: 0,
            max_duration: default_max_duration(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: default_frame_width(),
            height: default_frame_height(),
            noise_amplitude: default_noise_amplitude(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Reject settings the views cannot work with
    pub fn validate(&self) -> std::result::Result<(), Error> {
        if !(0.0..=1.0).contains(&self.filter.min_confidence) {
            return Err(Error::Config(format!(
                "filter.min_confidence must be within [0, 1], got {}",
                self.filter.min_confidence
            )));
        }
        if self.filter.min_duration > self.filter.max_duration {
            return Err(Error::Config(format!(
                "filter.min_duration ({}) exceeds filter.max_duration ({})",
                self.filter.min_duration, self.filter.max_duration
            )));
        }
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(Error::Config("frame dimensions must be non-zero".to_string()));
        }
        if matches!(self.export.delimiter, '"' | '\n' | '\r') {
            return Err(Error::Config(format!(
                "export.delimiter cannot be {:?}",
                self.export.delimiter
            )));
        }
        Ok(())
    }
}

/// Load configuration from a file or use default
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = match config_path {
        Some(path) => {
            let config_str = std::fs::read_to_string(path)
                .context(format!("Failed to read config file: {:?}", path))?;

            if path.extension().map_or(false, |ext| ext == "json") {
                serde_json::from_str(&config_str).context("Failed to parse JSON config")?
            } else if path.extension().map_or(false, |ext| ext == "toml") {
                toml::from_str(&config_str).context("Failed to parse TOML config")?
            } else {
                return Err(anyhow::anyhow!("Unsupported config file format"));
            }
        }
        None => Config::default(),
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = load_config(None).unwrap();
        assert_eq!(config.cameras.enabled.len(), 3);
        assert!(!config.cameras.enabled.contains(&CameraLocation::RearExit));
        assert_eq!(config.frame.width, 640);
        assert_eq!(config.logging.log_level, "info");
    }

    #[test]
    fn test_load_partial_toml() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            "[generator]\nseed = 42\n\n[cameras]\nenabled = [\"main_entrance\", \"rear_exit\"]\n\n[export]\ndelimiter = \";\""
        )?;

        let config = load_config(Some(file.path()))?;
        assert_eq!(config.generator.seed, Some(42));
        assert_eq!(
            config.cameras.enabled,
            vec![CameraLocation::MainEntrance, CameraLocation::RearExit]
        );
        assert_eq!(config.export.delimiter, ';');
        assert_eq!(config.filter.max_duration, 60);
        Ok(())
    }

    #[test]
    fn test_load_json() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
        write!(file, r#"{{"frame": {{"width": 320, "height": 240}}}}"#)?;

        let config = load_config(Some(file.path()))?;
        assert_eq!(config.frame.width, 320);
        assert_eq!(config.frame.noise_amplitude, 10);
        Ok(())
    }

    #[test]
    fn test_invalid_duration_bounds_rejected() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "[filter]\nmin_duration = 40\nmax_duration = 10")?;

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Config(_))));
        Ok(())
    }

    #[test]
    fn test_unsupported_extension() -> Result<()> {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile()?;
        assert!(load_config(Some(file.path())).is_err());
        Ok(())
    }
}
