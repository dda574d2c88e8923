//! Transition detection between two consecutive polls
//!
//! Alerts are one-directional: only a change *into* Warning or Critical is
//! reported. De-escalations, first sightings and changes between Unknown and
//! Healthy are silent.

use crate::models::{GuestReading, GuestSnapshot, Usage};
use crate::severity::{Severity, Thresholds};
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cpu,
    Ram,
    Disk,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Cpu, Metric::Ram, Metric::Disk];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Cpu => "CPU usage",
            Metric::Ram => "RAM usage",
            Metric::Disk => "Disk usage",
        }
    }

    fn of_reading(self, reading: &GuestReading) -> Usage {
        match self {
            Metric::Cpu => reading.cpu,
            Metric::Ram => reading.ram,
            Metric::Disk => reading.disk,
        }
    }

    fn of_snapshot(self, snapshot: &GuestSnapshot) -> Option<Usage> {
        match self {
            Metric::Cpu => snapshot.cpu_usage,
            Metric::Ram => snapshot.ram_usage,
            Metric::Disk => snapshot.disk_usage,
        }
    }
}

/// A notification-worthy severity change of one metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub metric: Metric,
    pub value: Usage,
    pub from: Severity,
    pub to: Severity,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}%) changed from {} to {}",
            self.metric.label(),
            self.value,
            self.from,
            self.to
        )
    }
}

/// Compare one metric against its previous value
pub fn evaluate(
    metric: Metric,
    previous: Option<Usage>,
    current: Usage,
    thresholds: &Thresholds,
) -> Option<Transition> {
    let previous = previous?;
    let from = thresholds.classify(previous);
    let to = thresholds.classify(current);

    if from == to || !to.is_alerting() {
        return None;
    }

    Some(Transition {
        metric,
        value: current,
        from,
        to,
    })
}

/// Evaluate all metrics of a guest, then overwrite the snapshot with the
/// current reading (Unknown values included)
pub fn observe(
    snapshot: &mut GuestSnapshot,
    reading: &GuestReading,
    thresholds: &Thresholds,
    now: DateTime<Utc>,
) -> Vec<Transition> {
    let transitions: Vec<Transition> = Metric::ALL
        .iter()
        .filter_map(|&metric| {
            evaluate(
                metric,
                metric.of_snapshot(&*snapshot),
                metric.of_reading(reading),
                thresholds,
            )
        })
        .collect();

    snapshot.name = Some(reading.name.clone());
    snapshot.cpu_usage = Some(reading.cpu);
    snapshot.ram_usage = Some(reading.ram);
    snapshot.disk_usage = Some(reading.disk);
    snapshot.last_seen = Some(now);

    transitions
}
