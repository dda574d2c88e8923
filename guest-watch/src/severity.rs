//! Severity classification of usage percentages

use crate::models::Usage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of one metric. Variant order is the escalation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Unknown,
    Healthy,
    Warning,
    Critical,
}

impl Severity {
    pub fn name(self) -> &'static str {
        match self {
            Severity::Unknown => "UNKNOWN",
            Severity::Healthy => "HEALTHY",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Whether a transition into this state is worth alerting on
    pub fn is_alerting(self) -> bool {
        self >= Severity::Warning
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cut points for classification. Expected `ok <= warning <= critical`;
/// other orderings are accepted as given and only reported by `is_monotonic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default)]
    pub ok: u32,
    pub warning: u32,
    pub critical: u32,
}

impl Thresholds {
    pub fn new(warning: u32, critical: u32) -> Self {
        Self { ok: 0, warning, critical }
    }

    pub fn is_monotonic(&self) -> bool {
        self.ok <= self.warning && self.warning <= self.critical
    }

    pub fn classify(&self, usage: Usage) -> Severity {
        let Usage::Percent(value) = usage else {
            return Severity::Unknown;
        };

        if value >= self.critical {
            Severity::Critical
        } else if value >= self.warning {
            Severity::Warning
        } else if value >= self.ok {
            Severity::Healthy
        } else {
            Severity::Unknown
        }
    }
}
