use crate::config::FilterConfig;
use crate::error::Error;
use crate::models::{CameraLocation, DetectionEvent, DetectionStatus, Priority};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Detection history filter. Empty sets and `None` bounds do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionFilter {
    pub date: Option<NaiveDate>,
    pub statuses: Vec<DetectionStatus>,
    pub locations: Vec<CameraLocation>,
    pub priorities: Vec<Priority>,
    pub min_confidence: Option<f64>,
    pub min_duration: Option<u32>,
    pub max_duration: Option<u32>,
}

impl DetectionFilter {
    /// Filter seeded with the configured confidence and duration bounds
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            min_confidence: Some(config.min_confidence),
            min_duration: Some(config.min_duration),
            max_duration: Some(config.max_duration),
            ..Self::default()
        }
    }

    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_locations(mut self, locations: Vec<CameraLocation>) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_statuses(mut self, statuses: Vec<DetectionStatus>) -> Self {
        self.statuses = statuses;
        self
    }

    pub fn with_priorities(mut self, priorities: Vec<Priority>) -> Self {
        self.priorities = priorities;
        self
    }

    pub fn matches(&self, event: &DetectionEvent) -> bool {
        if let Some(date) = self.date {
            if event.timestamp.date() != date {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&event.status) {
            return false;
        }
        if !self.locations.is_empty() && !self.locations.contains(&event.location) {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&event.priority) {
            return false;
        }
        if self.min_confidence.map_or(false, |min| event.confidence < min) {
            return false;
        }
        if self.min_duration.map_or(false, |min| event.duration_minutes < min) {
            return false;
        }
        if self.max_duration.map_or(false, |max| event.duration_minutes > max) {
            return false;
        }
        true
    }

    /// Matching events, in input order
    pub fn apply<'a>(&self, events: &'a [DetectionEvent]) -> Vec<&'a DetectionEvent> {
        events.iter().filter(|e| self.matches(e)).collect()
    }

    /// The `index`-th matching event, counting from zero in chronological order
    pub fn select<'a>(
        &self,
        events: &'a [DetectionEvent],
        index: usize,
    ) -> Result<&'a DetectionEvent, Error> {
        let mut matching = events.iter().filter(|e| self.matches(e));
        let total = matching.clone().count();
        matching.nth(index).ok_or_else(|| {
            Error::InvalidInput(format!(
                "detection #{} does not exist, {} detections match",
                index, total
            ))
        })
    }
}
