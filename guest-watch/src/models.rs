use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Marker written to the state file for metrics without usable telemetry
pub const UNKNOWN_MARKER: &str = "?";

/// Utilization of one metric: a whole percentage, or no usable reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    Percent(u32),
    Unknown,
}

impl Usage {
    pub fn percent(self) -> Option<u32> {
        match self {
            Usage::Percent(p) => Some(p),
            Usage::Unknown => None,
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Usage::Percent(p) => write!(f, "{}", p),
            Usage::Unknown => f.write_str(UNKNOWN_MARKER),
        }
    }
}

impl Serialize for Usage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Usage::Percent(p) => serializer.serialize_u32(*p),
            Usage::Unknown => serializer.serialize_str(UNKNOWN_MARKER),
        }
    }
}

// Older state files may hold floats or numeric strings; anything that does
// not coerce to a non-negative integer reads back as Unknown.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredUsage {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Usage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let usage = match StoredUsage::deserialize(deserializer)? {
            StoredUsage::Int(n) => u32::try_from(n).map(Usage::Percent).unwrap_or(Usage::Unknown),
            StoredUsage::Float(f) if f.is_finite() && f >= 0.0 && f < u32::MAX as f64 => {
                Usage::Percent(f.trunc() as u32)
            }
            StoredUsage::Float(_) => Usage::Unknown,
            StoredUsage::Text(s) => s
                .trim()
                .parse::<u32>()
                .map(Usage::Percent)
                .unwrap_or(Usage::Unknown),
        };
        Ok(usage)
    }
}

/// One running guest as observed in the current poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestReading {
    pub id: String,
    pub name: String,
    pub cpu: Usage,
    pub ram: Usage,
    pub disk: Usage,
}

/// Persisted per-guest state carried between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram_usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

/// Guest id (e.g. `qemu/100`) -> snapshot
pub type GuestStates = BTreeMap<String, GuestSnapshot>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_display() {
        assert_eq!(Usage::Percent(42).to_string(), "42");
        assert_eq!(Usage::Unknown.to_string(), "?");
    }

    #[test]
    fn test_legacy_snapshot_values() {
        let yaml = "cpu_usage: 12\nram_usage: '?'\ndisk_usage: '57'\nname: web\n";
        let snapshot: GuestSnapshot = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(snapshot.cpu_usage, Some(Usage::Percent(12)));
        assert_eq!(snapshot.ram_usage, Some(Usage::Unknown));
        assert_eq!(snapshot.disk_usage, Some(Usage::Percent(57)));
        assert_eq!(snapshot.name.as_deref(), Some("web"));
        assert_eq!(snapshot.last_seen, None);
    }

    #[test]
    fn test_odd_stored_values() {
        let snapshot: GuestSnapshot =
            serde_yaml::from_str("cpu_usage: 33.9\nram_usage: -4\ndisk_usage: n/a\n").unwrap();
        assert_eq!(snapshot.cpu_usage, Some(Usage::Percent(33)));
        assert_eq!(snapshot.ram_usage, Some(Usage::Unknown));
        assert_eq!(snapshot.disk_usage, Some(Usage::Unknown));
    }

    #[test]
    fn test_missing_metric_is_none() {
        let snapshot: GuestSnapshot = serde_yaml::from_str("name: db\n").unwrap();
        assert_eq!(snapshot.cpu_usage, None);
        assert_eq!(snapshot.ram_usage, None);
    }
}
