//! Conversion of simulated run-off depth to a volume rate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Unit of the reported catchment run-off.
///
/// The model produces a depth in mm/day; 1 mm over 1 km² is 1000 m³.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOffUnit {
    /// Keep the depth in mm/day; the area is ignored.
    #[default]
    NoConversion,
    CubicMetrePerDay,
    MegalitrePerDay,
    CubicMetrePerSecond,
}

impl RunOffUnit {
    pub const ALL: [RunOffUnit; 4] = [
        RunOffUnit::NoConversion,
        RunOffUnit::CubicMetrePerDay,
        RunOffUnit::MegalitrePerDay,
        RunOffUnit::CubicMetrePerSecond,
    ];

    /// Factor applied to `depth [mm/day] * area [km²]`.
    pub fn conversion_factor(self) -> f64 {
        match self {
            RunOffUnit::NoConversion => 1.0,
            RunOffUnit::CubicMetrePerDay => 1000.0,
            RunOffUnit::MegalitrePerDay => 1.0,
            RunOffUnit::CubicMetrePerSecond => 1000.0 / 86400.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RunOffUnit::NoConversion => "mm/d",
            RunOffUnit::CubicMetrePerDay => "m³/d",
            RunOffUnit::MegalitrePerDay => "Ml/d",
            RunOffUnit::CubicMetrePerSecond => "m³/s",
        }
    }

    fn name(self) -> &'static str {
        match self {
            RunOffUnit::NoConversion => "no_conversion",
            RunOffUnit::CubicMetrePerDay => "cubic_metre_per_day",
            RunOffUnit::MegalitrePerDay => "megalitre_per_day",
            RunOffUnit::CubicMetrePerSecond => "cubic_metre_per_second",
        }
    }

    /// Convert one depth value for a catchment of `total_area` km².
    pub fn convert(self, depth: f64, total_area: f64) -> f64 {
        match self {
            RunOffUnit::NoConversion => depth,
            _ => depth * total_area * self.conversion_factor(),
        }
    }

    /// Convert a depth series in place.
    pub fn convert_series(self, depths: &mut [f64], total_area: f64) {
        if self == RunOffUnit::NoConversion {
            return;
        }
        for q in depths.iter_mut() {
            *q = self.convert(*q, total_area);
        }
    }
}

impl fmt::Display for RunOffUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RunOffUnit {
    type Err = ConfigurationError;

    /// Accepts the snake_case name or the label (e.g. `"m3/s"` or `"m³/s"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        let unit = match key.as_str() {
            "no_conversion" | "none" | "mm/d" => RunOffUnit::NoConversion,
            "cubic_metre_per_day" | "m3/d" | "m³/d" => RunOffUnit::CubicMetrePerDay,
            "megalitre_per_day" | "ml/d" => RunOffUnit::MegalitrePerDay,
            "cubic_metre_per_second" | "m3/s" | "m³/s" => RunOffUnit::CubicMetrePerSecond,
            _ => return Err(ConfigurationError::UnknownRunOffUnit(s.to_string())),
        };
        Ok(unit)
    }
}
