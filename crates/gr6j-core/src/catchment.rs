//! Hydrological units and their area-weighted aggregation.
//!
//! A catchment is split into one or more units, each with its own area and
//! parameters. Units are simulated independently over the same forcing and
//! their run-off depths are combined as `Σ(area·q) / Σ(area)`.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::forcing::Forcing;
use crate::gr6j::{self, FluxesTimeseries, Parameters, StoreLevels};

/// One hydrological unit of a catchment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCatchmentUnit")]
pub struct CatchmentUnit {
    /// Area [km²], strictly positive.
    pub(crate) area: f64,
    pub(crate) parameters: Parameters,
    pub(crate) store_levels: StoreLevels,
}

#[derive(Deserialize)]
struct RawCatchmentUnit {
    area: f64,
    parameters: Parameters,
    #[serde(default)]
    store_levels: StoreLevels,
}

impl TryFrom<RawCatchmentUnit> for CatchmentUnit {
    type Error = ConfigurationError;

    fn try_from(raw: RawCatchmentUnit) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.area, raw.parameters)?.with_store_levels(raw.store_levels))
    }
}

impl CatchmentUnit {
    /// A unit with the default initial store levels.
    pub fn new(area: f64, parameters: Parameters) -> Result<Self, ConfigurationError> {
        check_area(0, area)?;
        Ok(Self {
            area,
            parameters,
            store_levels: StoreLevels::default(),
        })
    }

    pub fn with_store_levels(mut self, store_levels: StoreLevels) -> Self {
        self.store_levels = store_levels;
        self
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn store_levels(&self) -> &StoreLevels {
        &self.store_levels
    }
}

pub(crate) fn check_area(unit: usize, area: f64) -> Result<(), ConfigurationError> {
    if area.is_finite() && area > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositiveArea { unit, area })
    }
}

/// Check a unit list: non-empty, every area positive (reported with its
/// index).
pub fn validate_units(units: &[CatchmentUnit]) -> Result<(), ConfigurationError> {
    if units.is_empty() {
        return Err(ConfigurationError::NoHydrologicalUnits);
    }
    units
        .iter()
        .enumerate()
        .try_for_each(|(i, u)| check_area(i, u.area))
}

pub fn total_area(units: &[CatchmentUnit]) -> f64 {
    units.iter().map(|u| u.area).sum()
}

/// Simulated fluxes of one unit over the reported period.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOutputs {
    pub area: f64,
    pub parameters: Parameters,
    pub fluxes: FluxesTimeseries,
}

/// Result of simulating every unit of a catchment.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchmentOutputs {
    pub units: Vec<UnitOutputs>,
    /// Area-weighted run-off depth [mm/day].
    pub run_off: Vec<f64>,
}

/// Simulate every unit over `forcing`, drop the first `warm_up_len` steps and
/// aggregate the run-off.
pub fn run_units(
    units: &[CatchmentUnit],
    forcing: &[Forcing],
    warm_up_len: usize,
) -> CatchmentOutputs {
    let outputs: Vec<UnitOutputs> = units
        .iter()
        .enumerate()
        .map(|(i, unit)| {
            debug!("Simulating hydrological unit #{i} ({} km²)", unit.area);
            let mut fluxes = gr6j::run(&unit.parameters, &unit.store_levels, forcing);
            fluxes.drain_front(warm_up_len);
            UnitOutputs {
                area: unit.area,
                parameters: unit.parameters,
                fluxes,
            }
        })
        .collect();

    let run_off = area_weighted(
        outputs
            .iter()
            .map(|u| (u.area, u.fluxes.run_off.as_slice())),
        forcing.len().saturating_sub(warm_up_len),
    );
    CatchmentOutputs {
        units: outputs,
        run_off,
    }
}

/// Area-weighted mean of several series of length `len`.
pub fn area_weighted<'a>(series: impl IntoIterator<Item = (f64, &'a [f64])>, len: usize) -> Vec<f64> {
    let mut sum = vec![0.0; len];
    let mut area_sum = 0.0;
    for (area, values) in series {
        area_sum += area;
        for (acc, q) in sum.iter_mut().zip(values) {
            *acc += area * q;
        }
    }
    if area_sum > 0.0 {
        for acc in sum.iter_mut() {
            *acc /= area_sum;
        }
    }
    sum
}
