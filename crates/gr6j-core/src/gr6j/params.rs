/// GR6J calibrated parameters.
///
/// Six parameters that define model behaviour:
/// - `x1`: Production store capacity [mm]
/// - `x2`: Intercatchment exchange coefficient [mm/day]
/// - `x3`: Routing store capacity [mm]
/// - `x4`: Unit hydrograph time base [days]
/// - `x5`: Intercatchment exchange threshold [-]
/// - `x6`: Exponential store time constant [mm]
///
/// Values are checked against [`PARAM_BOUNDS`] on every construction path,
/// deserialisation included, so a `Parameters` in hand is always valid. The
/// fields are read through accessors for that reason.
///
/// Bounds are inclusive, x4 included: its lower bound 0.5 gives a one-day
/// UH1 and a one-day UH2.
use serde::{Deserialize, Serialize};

use super::constants::{N_PARAMS, PARAM_BOUNDS, PARAM_NAMES};
use crate::error::ConfigurationError;
use crate::traits::ModelParams;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameters")]
pub struct Parameters {
    pub(crate) x1: f64,
    pub(crate) x2: f64,
    pub(crate) x3: f64,
    pub(crate) x4: f64,
    pub(crate) x5: f64,
    pub(crate) x6: f64,
}

#[derive(Deserialize)]
struct RawParameters {
    x1: f64,
    x2: f64,
    x3: f64,
    x4: f64,
    x5: f64,
    x6: f64,
}

impl TryFrom<RawParameters> for Parameters {
    type Error = ConfigurationError;

    fn try_from(raw: RawParameters) -> Result<Self, Self::Error> {
        Self::new(raw.x1, raw.x2, raw.x3, raw.x4, raw.x5, raw.x6)
    }
}

impl Parameters {
    /// Create validated parameters.
    ///
    /// Every bound is inclusive, so `x4 = 0.5` is accepted.
    pub fn new(
        x1: f64,
        x2: f64,
        x3: f64,
        x4: f64,
        x5: f64,
        x6: f64,
    ) -> Result<Self, ConfigurationError> {
        let values = [x1, x2, x3, x4, x5, x6];
        for ((name, bounds), value) in PARAM_NAMES.iter().zip(PARAM_BOUNDS.iter()).zip(values) {
            // NaN fails `contains` as well.
            if !bounds.contains(value) {
                return Err(ConfigurationError::ParameterOutOfBounds {
                    name: *name,
                    value,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }
        Ok(Self {
            x1,
            x2,
            x3,
            x4,
            x5,
            x6,
        })
    }

    pub fn x1(&self) -> f64 {
        self.x1
    }

    pub fn x2(&self) -> f64 {
        self.x2
    }

    pub fn x3(&self) -> f64 {
        self.x3
    }

    pub fn x4(&self) -> f64 {
        self.x4
    }

    pub fn x5(&self) -> f64 {
        self.x5
    }

    pub fn x6(&self) -> f64 {
        self.x6
    }
}

impl ModelParams for Parameters {
    const N_PARAMS: usize = N_PARAMS;
    const PARAM_NAMES: &'static [&'static str] = PARAM_NAMES;

    fn from_array(arr: &[f64]) -> Result<Self, ConfigurationError> {
        if arr.len() != Self::N_PARAMS {
            return Err(ConfigurationError::ParameterCount {
                expected: Self::N_PARAMS,
                actual: arr.len(),
            });
        }
        Self::new(arr[0], arr[1], arr[2], arr[3], arr[4], arr[5])
    }

    fn to_array(&self) -> Vec<f64> {
        vec![self.x1, self.x2, self.x3, self.x4, self.x5, self.x6]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_parameters() {
        let p = Parameters::new(350.0, 0.0, 90.0, 1.7, 0.0, 5.0).unwrap();
        assert_eq!(p.x1, 350.0);
        assert_eq!(p.x2, 0.0);
        assert_eq!(p.x3, 90.0);
        assert_eq!(p.x4, 1.7);
        assert_eq!(p.x5, 0.0);
        assert_eq!(p.x6, 5.0);
    }

    #[test]
    fn accessors_return_validated_values() {
        let p: Parameters = serde_json::from_str(
            r#"{"x1": 350.0, "x2": -1.0, "x3": 90.0, "x4": 1.7, "x5": 0.2, "x6": 5.0}"#,
        )
        .unwrap();
        assert_eq!(
            [p.x1(), p.x2(), p.x3(), p.x4(), p.x5(), p.x6()],
            [350.0, -1.0, 90.0, 1.7, 0.2, 5.0]
        );
    }

    #[test]
    fn x4_lower_bound_is_inclusive() {
        assert_eq!(Parameters::new(350.0, 0.0, 90.0, 0.5, 0.0, 5.0).unwrap().x4(), 0.5);
        assert!(Parameters::new(350.0, 0.0, 90.0, 0.4999, 0.0, 5.0).is_err());
    }

    #[test]
    fn boundary_values_are_valid() {
        assert!(Parameters::new(0.01, -5.0, 0.01, 0.5, -4.0, 0.01).is_ok());
        assert!(Parameters::new(2500.0, 5.0, 1000.0, 10.0, 4.0, 20.0).is_ok());
    }

    #[test]
    fn zero_x1_is_rejected() {
        let err = Parameters::new(0.0, 0.0, 90.0, 1.7, 0.0, 5.0).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::ParameterOutOfBounds {
                name: "x1",
                value: 0.0,
                min: 0.01,
                max: 2500.0,
            }
        );
    }

    #[test]
    fn nan_is_rejected() {
        assert!(Parameters::new(350.0, 0.0, 90.0, f64::NAN, 0.0, 5.0).is_err());
    }

    #[test]
    fn x6_above_bound_is_rejected() {
        let err = Parameters::new(350.0, 0.0, 90.0, 1.7, 0.0, 20.5).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::ParameterOutOfBounds { name: "x6", .. }
        ));
    }

    #[test]
    fn from_array_valid() {
        let p =
            <Parameters as ModelParams>::from_array(&[350.0, 0.0, 90.0, 1.7, 0.0, 5.0]).unwrap();
        assert_eq!(p.x1, 350.0);
        assert_eq!(p.x6, 5.0);
    }

    #[test]
    fn from_array_wrong_length() {
        assert_eq!(
            <Parameters as ModelParams>::from_array(&[350.0]).unwrap_err(),
            ConfigurationError::ParameterCount {
                expected: 6,
                actual: 1
            }
        );
    }

    #[test]
    fn get_by_name() {
        let p = Parameters::new(350.0, -1.0, 90.0, 1.7, 0.5, 5.0).unwrap();
        assert_eq!(p.get("x2"), Some(-1.0));
        assert_eq!(p.get("x5"), Some(0.5));
        assert_eq!(p.get("x7"), None);
    }

    #[test]
    fn deserialize_validates() {
        let ok: Parameters = serde_json::from_str(
            r#"{"x1": 31.0, "x2": 3.47, "x3": 32.0, "x4": 2.1, "x5": 0.55, "x6": 5.3}"#,
        )
        .unwrap();
        assert_eq!(ok.x4, 2.1);

        let bad = serde_json::from_str::<Parameters>(
            r#"{"x1": 3000.0, "x2": 3.47, "x3": 32.0, "x4": 2.1, "x5": 0.55, "x6": 5.3}"#,
        );
        assert!(bad.unwrap_err().to_string().contains("x1 = 3000"));
    }
}
