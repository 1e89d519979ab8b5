use crate::config::ExportConfig;
use crate::error::Error;
use crate::models::DetectionEvent;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;
use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column order of the detection export
pub const EXPORT_HEADER: [&str; 7] = [
    "time",
    "location",
    "confidence",
    "duration",
    "status",
    "priority",
    "notification_sent",
];

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default file name for the export of one day
pub fn export_file_name(date: NaiveDate) -> String {
    format!("detections_{}.csv", date.format("%Y-%m-%d"))
}

/// Delimited-text writer for detection records
pub struct CsvExporter {
    delimiter: char,
}

impl CsvExporter {
    pub fn new(delimiter: char) -> std::result::Result<Self, Error> {
        if matches!(delimiter, '"' | '\n' | '\r') {
            return Err(Error::Export(format!("Invalid delimiter: {:?}", delimiter)));
        }
        Ok(Self { delimiter })
    }

    pub fn from_config(config: &ExportConfig) -> std::result::Result<Self, Error> {
        Self::new(config.delimiter)
    }

    fn escape<'a>(&self, field: &'a str) -> Cow<'a, str> {
        if field.contains(self.delimiter) || field.contains(['"', '\n', '\r']) {
            Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
        } else {
            Cow::Borrowed(field)
        }
    }

    fn write_row<W: Write>(&self, out: &mut W, fields: &[&str]) -> std::io::Result<()> {
        let mut sep = [0u8; 4];
        let sep: &str = self.delimiter.encode_utf8(&mut sep);
        let line = fields
            .iter()
            .map(|f| self.escape(f))
            .collect::<Vec<_>>()
            .join(sep);
        writeln!(out, "{}", line)
    }

    /// Write the header and one row per event
    pub fn write<'a, W, I>(&self, out: &mut W, events: I) -> Result<usize>
    where
        W: Write,
        I: IntoIterator<Item = &'a DetectionEvent>,
    {
        self.write_row(out, &EXPORT_HEADER)
            .map_err(|e| Error::Export(format!("Failed to write header: {}", e)))?;

        let mut rows = 0;
        for event in events {
            let time = event.timestamp.format(TIME_FORMAT).to_string();
            let confidence = format!("{:.2}", event.confidence);
            let duration = event.duration_minutes.to_string();
            let status = event.status.to_string();
            let priority = event.priority.to_string();
            let notification = event.notification_sent.to_string();

            self.write_row(
                out,
                &[
                    time.as_str(),
                    event.location.label(),
                    confidence.as_str(),
                    duration.as_str(),
                    status.as_str(),
                    priority.as_str(),
                    notification.as_str(),
                ],
            )
            .map_err(|e| Error::Export(format!("Failed to write row {}: {}", rows + 1, e)))?;
            rows += 1;
        }

        Ok(rows)
    }

    /// Render the export into a string
    pub fn render<'a, I>(&self, events: I) -> Result<String>
    where
        I: IntoIterator<Item = &'a DetectionEvent>,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, events)?;
        String::from_utf8(buf).context("Export produced invalid UTF-8")
    }

    /// Write the export to a file, creating parent directories
    pub fn write_file<'a, I>(&self, path: &Path, events: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a DetectionEvent>,
    {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create export directory: {:?}", parent))?;
        }
        let file = std::fs::File::create(path)
            .context(format!("Failed to create export file: {:?}", path))?;
        let mut out = std::io::BufWriter::new(file);
        let rows = self.write(&mut out, events)?;
        out.flush()
            .context(format!("Failed to flush export file: {:?}", path))?;

        info!("Exported {} detections to {:?}", rows, path);
        Ok(rows)
    }
}

/// Resolve where an export goes when no explicit path was given
pub fn default_export_path(config: &ExportConfig, date: NaiveDate) -> PathBuf {
    config.output_dir.join(export_file_name(date))
}
