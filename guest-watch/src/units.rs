//! Unit normalization for the capacity columns of the resource table
//!
//! Memory and disk values arrive as human readable strings such as
//! `"3.50 GiB"` or `"512.00 MiB"`. Everything is converted to whole MiB
//! before the usage percentage is computed.

use crate::error::UnrecognizedUnit;
use crate::models::Usage;
use tracing::debug;

/// Exact text a guest without an agent reports as its usage
pub const NO_TELEMETRY: &str = "0.00 B";

const MIB_PER_GIB: f64 = 1024.0;

/// Convert a `"<n> GiB"` / `"<n> MiB"` string to whole MiB, rounding half up
pub fn to_mib(value: &str) -> Result<u64, UnrecognizedUnit> {
    let factor = if value.contains("GiB") {
        MIB_PER_GIB
    } else if value.contains("MiB") {
        1.0
    } else {
        return Err(UnrecognizedUnit(value.to_string()));
    };

    let magnitude: f64 = value
        .split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .filter(|n: &f64| n.is_finite() && *n >= 0.0)
        .ok_or_else(|| UnrecognizedUnit(value.to_string()))?;

    // f64::round rounds half away from zero, i.e. half up for non-negative values
    Ok((magnitude * factor).round() as u64)
}

/// Usage percentage of `used` against `max`, floored
pub fn usage_percent(max: &str, used: &str) -> Usage {
    if used == NO_TELEMETRY {
        return Usage::Unknown;
    }

    let (max_mib, used_mib) = match (to_mib(max), to_mib(used)) {
        (Ok(max_mib), Ok(used_mib)) => (max_mib, used_mib),
        (Err(e), _) | (_, Err(e)) => {
            debug!("{}", e);
            return Usage::Unknown;
        }
    };

    if max_mib == 0 {
        debug!("zero capacity '{}', usage unknown", max);
        return Usage::Unknown;
    }

    let percent = used_mib.saturating_mul(100) / max_mib;
    u32::try_from(percent).map(Usage::Percent).unwrap_or(Usage::Unknown)
}

/// CPU column is already a percentage, e.g. `"12.34%"`; keep the integer part
pub fn cpu_percent(value: &str) -> Usage {
    let integer = value.split('.').next().unwrap_or(value);
    match integer.trim().trim_end_matches('%').parse::<u32>() {
        Ok(p) => Usage::Percent(p),
        Err(_) => {
            debug!("failed to convert cpu value '{}' to integer", value);
            Usage::Unknown
        }
    }
}
