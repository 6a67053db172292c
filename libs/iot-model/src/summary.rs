//! Rollup records polled by the dashboard UI

use serde::{Deserialize, Serialize};

/// Health bucket an entity falls into when summarised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Healthy,
    Warning,
    Error,
}

impl Severity {
    /// Classify a status string, case-insensitively
    ///
    /// Only `warning` and `error` are meaningful; anything else is healthy.
    pub fn from_status(status: &str) -> Self {
        if status.eq_ignore_ascii_case("warning") {
            Severity::Warning
        } else if status.eq_ignore_ascii_case("error") {
            Severity::Error
        } else {
            Severity::Healthy
        }
    }

    /// Classify a facility utilization fraction
    ///
    /// Warning is the open interval (0.5, 0.7); error is below 0.5.
    /// Exactly 0.5 falls in neither bucket.
    pub fn from_utilization(utilization: f64) -> Self {
        if utilization < 0.5 {
            Severity::Error
        } else if utilization > 0.5 && utilization < 0.7 {
            Severity::Warning
        } else {
            Severity::Healthy
        }
    }
}

/// Aggregate count and severity breakdown for one entity category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub name: String,
    pub title: String,
    pub count: u64,
    pub warning_count: u64,
    pub error_count: u64,
}

impl Summary {
    /// Summary with a count and no severity breakdown
    pub fn new(name: impl Into<String>, title: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            count,
            warning_count: 0,
            error_count: 0,
        }
    }

    /// Build a summary by classifying every item
    pub fn classify<I>(name: impl Into<String>, title: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = Severity>,
    {
        let mut summary = Self::new(name, title, 0);
        for severity in items {
            summary.count += 1;
            match severity {
                Severity::Warning => summary.warning_count += 1,
                Severity::Error => summary.error_count += 1,
                Severity::Healthy => {},
            }
        }
        summary
    }

    pub fn with_counts(mut self, warning_count: u64, error_count: u64) -> Self {
        self.warning_count = warning_count;
        self.error_count = error_count;
        self
    }
}
