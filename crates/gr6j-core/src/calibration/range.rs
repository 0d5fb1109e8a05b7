//! Sampling ranges of the calibrated parameters.

use serde::{Deserialize, Serialize};

use crate::catchment::check_area;
use crate::error::ConfigurationError;
use crate::gr6j::constants::{Bounds, N_PARAMS, PARAM_BOUNDS, PARAM_NAMES};
use crate::gr6j::StoreLevels;

/// Closed interval a parameter is sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
}

impl ParameterRange {
    /// Resolve optional bounds against the physical bounds of `name`. A
    /// missing bound takes the physical one.
    pub fn resolve(
        name: &'static str,
        bounds: Bounds,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Self, ConfigurationError> {
        let min = min.unwrap_or(bounds.min);
        let max = max.unwrap_or(bounds.max);
        if !(min <= max) {
            return Err(ConfigurationError::InvertedRange { name, min, max });
        }
        if !bounds.contains(min) || !bounds.contains(max) {
            return Err(ConfigurationError::RangeOutsideBounds {
                name,
                min,
                max,
                lower: bounds.min,
                upper: bounds.max,
            });
        }
        Ok(Self { min, max })
    }

    /// The full physical range.
    pub fn full(bounds: Bounds) -> Self {
        Self {
            min: bounds.min,
            max: bounds.max,
        }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawRange {
    min: Option<f64>,
    max: Option<f64>,
}

/// Area and parameter ranges of one hydrological unit to calibrate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCatchmentRanges")]
pub struct CatchmentRanges {
    pub area: f64,
    pub x1: ParameterRange,
    pub x2: ParameterRange,
    pub x3: ParameterRange,
    pub x4: ParameterRange,
    pub x5: ParameterRange,
    pub x6: ParameterRange,
    pub store_levels: StoreLevels,
}

#[derive(Deserialize)]
struct RawCatchmentRanges {
    area: f64,
    #[serde(default)]
    x1: RawRange,
    #[serde(default)]
    x2: RawRange,
    #[serde(default)]
    x3: RawRange,
    #[serde(default)]
    x4: RawRange,
    #[serde(default)]
    x5: RawRange,
    #[serde(default)]
    x6: RawRange,
    #[serde(default)]
    store_levels: StoreLevels,
}

impl TryFrom<RawCatchmentRanges> for CatchmentRanges {
    type Error = ConfigurationError;

    fn try_from(raw: RawCatchmentRanges) -> Result<Self, Self::Error> {
        let mut ranges = Self::new(raw.area)?.with_store_levels(raw.store_levels);
        for (name, r) in PARAM_NAMES
            .iter()
            .zip([raw.x1, raw.x2, raw.x3, raw.x4, raw.x5, raw.x6])
        {
            ranges = ranges.with_range(name, r.min, r.max)?;
        }
        Ok(ranges)
    }
}

impl CatchmentRanges {
    /// A unit sampled over the full physical range of every parameter.
    pub fn new(area: f64) -> Result<Self, ConfigurationError> {
        check_area(0, area)?;
        let [x1, x2, x3, x4, x5, x6] = PARAM_BOUNDS.map(ParameterRange::full);
        Ok(Self {
            area,
            x1,
            x2,
            x3,
            x4,
            x5,
            x6,
            store_levels: StoreLevels::default(),
        })
    }

    /// Restrict the range of the parameter called `name`.
    pub fn with_range(
        mut self,
        name: &str,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Self, ConfigurationError> {
        let index = PARAM_NAMES
            .iter()
            .position(|n| *n == name)
            .ok_or_else(|| ConfigurationError::UnknownParameter(name.to_string()))?;
        let range = ParameterRange::resolve(PARAM_NAMES[index], PARAM_BOUNDS[index], min, max)?;
        match index {
            0 => self.x1 = range,
            1 => self.x2 = range,
            2 => self.x3 = range,
            3 => self.x4 = range,
            4 => self.x5 = range,
            _ => self.x6 = range,
        }
        Ok(self)
    }

    pub fn with_store_levels(mut self, store_levels: StoreLevels) -> Self {
        self.store_levels = store_levels;
        self
    }

    /// Ranges in parameter order.
    pub fn ranges(&self) -> [ParameterRange; N_PARAMS] {
        [self.x1, self.x2, self.x3, self.x4, self.x5, self.x6]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gr6j::constants::{X1_BOUNDS, X4_BOUNDS};

    #[test]
    fn missing_bounds_take_physical_ones() {
        let r = ParameterRange::resolve("x1", X1_BOUNDS, None, Some(500.0)).unwrap();
        assert_eq!(r, ParameterRange { min: 0.01, max: 500.0 });
        let r = ParameterRange::resolve("x4", X4_BOUNDS, Some(2.0), None).unwrap();
        assert_eq!(r, ParameterRange { min: 2.0, max: 10.0 });
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_eq!(
            ParameterRange::resolve("x4", X4_BOUNDS, Some(5.0), Some(2.0)).unwrap_err(),
            ConfigurationError::InvertedRange {
                name: "x4",
                min: 5.0,
                max: 2.0
            }
        );
    }

    #[test]
    fn range_outside_bounds_is_rejected() {
        assert!(matches!(
            ParameterRange::resolve("x1", X1_BOUNDS, Some(0.0), Some(100.0)),
            Err(ConfigurationError::RangeOutsideBounds { name: "x1", .. })
        ));
        assert!(ParameterRange::resolve("x1", X1_BOUNDS, Some(f64::NAN), None).is_err());
    }

    #[test]
    fn degenerate_range_is_allowed() {
        let r = ParameterRange::resolve("x4", X4_BOUNDS, Some(2.0), Some(2.0)).unwrap();
        assert_eq!(r.width(), 0.0);
    }

    #[test]
    fn catchment_ranges_builder() {
        let c = CatchmentRanges::new(10.0)
            .unwrap()
            .with_range("x2", Some(-1.0), Some(1.0))
            .unwrap();
        assert_eq!(c.x2, ParameterRange { min: -1.0, max: 1.0 });
        assert_eq!(c.x6, ParameterRange { min: 0.01, max: 20.0 });
        assert_eq!(c.ranges()[1], c.x2);

        assert_eq!(
            c.with_range("x9", None, None).unwrap_err(),
            ConfigurationError::UnknownParameter("x9".to_string())
        );
        assert!(CatchmentRanges::new(-1.0).is_err());
    }

    #[test]
    fn deserialize_resolves_and_validates() {
        let c: CatchmentRanges =
            serde_json::from_str(r#"{"area": 4.0, "x1": {"max": 300.0}, "x4": {"min": 1.0, "max": 3.0}}"#)
                .unwrap();
        assert_eq!(c.x1, ParameterRange { min: 0.01, max: 300.0 });
        assert_eq!(c.x4, ParameterRange { min: 1.0, max: 3.0 });
        assert_eq!(c.x3, ParameterRange::full(crate::gr6j::constants::X3_BOUNDS));

        assert!(serde_json::from_str::<CatchmentRanges>(r#"{"area": 4.0, "x5": {"min": 3.0, "max": -3.0}}"#).is_err());
    }

    #[test]
    fn serialized_ranges_deserialize_back() {
        let c = CatchmentRanges::new(3.0)
            .unwrap()
            .with_range("x3", Some(5.0), Some(50.0))
            .unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(serde_json::from_str::<CatchmentRanges>(&json).unwrap(), c);
    }
}
