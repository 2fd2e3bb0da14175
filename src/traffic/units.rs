//! Traffic unit conversions
//!
//! All byte units are binary: 1 GB = 1024 * 1024 KB and 1 TB = 1024 GB.
//! Displayed volumes depend on these exact constants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EstimatorError;

pub const KB_PER_GB: f64 = 1024.0 * 1024.0;
pub const GB_PER_TB: f64 = 1024.0;
pub const KB_PER_TB: f64 = KB_PER_GB * GB_PER_TB;

/// Events needed to fill `gigabytes` at the given average event size.
/// A non-positive event size yields zero events.
pub fn gigabytes_to_events(gigabytes: f64, average_event_size_kb: f64) -> f64 {
    if !average_event_size_kb.is_finite() || average_event_size_kb <= 0.0 {
        return 0.0;
    }
    gigabytes * KB_PER_GB / average_event_size_kb
}

pub fn events_to_gigabytes(events: f64, average_event_size_kb: f64) -> f64 {
    events * average_event_size_kb / KB_PER_GB
}

/// Unit the traffic input is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficUnit {
    Events,
    #[default]
    Gb,
    Tb,
}

impl TrafficUnit {
    pub const ALL: [TrafficUnit; 3] = [Self::Events, Self::Gb, Self::Tb];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Gb => "gb",
            Self::Tb => "tb",
        }
    }

    /// Suffix for displayed values ("GB/day")
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Gb => "GB",
            Self::Tb => "TB",
        }
    }

    /// Convert a per-day value in this unit to events per day
    pub fn to_daily_events(&self, value: f64, average_event_size_kb: f64) -> f64 {
        match self {
            Self::Events => value,
            Self::Gb => gigabytes_to_events(value, average_event_size_kb),
            Self::Tb => gigabytes_to_events(value * GB_PER_TB, average_event_size_kb),
        }
    }

    /// Express events per day in this unit
    pub fn from_daily_events(&self, events: f64, average_event_size_kb: f64) -> f64 {
        match self {
            Self::Events => events,
            Self::Gb => events_to_gigabytes(events, average_event_size_kb),
            Self::Tb => events_to_gigabytes(events, average_event_size_kb) / GB_PER_TB,
        }
    }
}

impl fmt::Display for TrafficUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrafficUnit {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "events" | "event" => Ok(Self::Events),
            "gb" | "gigabytes" => Ok(Self::Gb),
            "tb" | "terabytes" => Ok(Self::Tb),
            _ => Err(EstimatorError::InvalidInput(format!(
                "unknown traffic unit '{}' (expected events, gb or tb)",
                s
            ))),
        }
    }
}

/// Render a volume in the coarsest unit that keeps the number >= 1
///
/// The unit is chosen on the value as displayed, so a volume that rounds up
/// to the next boundary moves to the coarser unit.
pub fn format_kilobytes(kilobytes: f64) -> String {
    if round_to_cents(kilobytes) < KB_PER_GB {
        format!("{} KB", format_decimal(kilobytes, 2))
    } else if round_to_cents(kilobytes / KB_PER_GB) < GB_PER_TB {
        format!("{} GB", format_decimal(kilobytes / KB_PER_GB, 2))
    } else {
        format!("{} TB", format_decimal(kilobytes / KB_PER_TB, 2))
    }
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounded whole number with thousands separators
pub fn format_count(value: f64) -> String {
    format_decimal(value, 0)
}

/// Fixed-precision number with thousands separators
pub fn format_decimal(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut result = group_thousands(int_part);
    if let Some(frac) = frac_part {
        result.push('.');
        result.push_str(frac);
    }

    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{}", result)
    } else {
        result
    }
}

fn group_thousands(digits: &str) -> String {
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
