/// GR6J model state variables.
///
/// Mutable state that evolves during a simulation:
/// - `production_store`: S, soil moisture store level [mm], in `[0, x1]`
/// - `routing_store`: R, routing store level [mm], in `[0, x3]`
/// - `exponential_store`: Exp, slow drainage store, can be negative [mm]
/// - `uh1`, `uh2`: convolution buffers of the two unit hydrographs
///
/// A `State` is built fresh for every run and owned by it.
use serde::{Deserialize, Serialize};

use super::constants::{
    DEFAULT_EXPONENTIAL_STORE, DEFAULT_PRODUCTION_STORE_FRACTION, DEFAULT_ROUTING_STORE_FRACTION,
};
use super::params::Parameters;
use super::run::Context;
use super::unit_hydrographs::UhBuffer;
use crate::error::ConfigurationError;

/// Initial store levels of a hydrological unit.
///
/// The production and routing levels are fractions of x1 and x3; the
/// exponential store level is in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStoreLevels")]
pub struct StoreLevels {
    pub production_store: f64,
    pub routing_store: f64,
    pub exponential_store: f64,
}

#[derive(Deserialize)]
struct RawStoreLevels {
    #[serde(default = "default_production")]
    production_store: f64,
    #[serde(default = "default_routing")]
    routing_store: f64,
    #[serde(default)]
    exponential_store: f64,
}

fn default_production() -> f64 {
    DEFAULT_PRODUCTION_STORE_FRACTION
}

fn default_routing() -> f64 {
    DEFAULT_ROUTING_STORE_FRACTION
}

impl TryFrom<RawStoreLevels> for StoreLevels {
    type Error = ConfigurationError;

    fn try_from(raw: RawStoreLevels) -> Result<Self, Self::Error> {
        Self::new(raw.production_store, raw.routing_store, raw.exponential_store)
    }
}

impl StoreLevels {
    pub fn new(
        production_store: f64,
        routing_store: f64,
        exponential_store: f64,
    ) -> Result<Self, ConfigurationError> {
        for (store, value) in [
            ("production store", production_store),
            ("routing store", routing_store),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::InvalidStoreFraction { store, value });
            }
        }
        if !exponential_store.is_finite() {
            return Err(ConfigurationError::InvalidStoreFraction {
                store: "exponential store",
                value: exponential_store,
            });
        }
        Ok(Self {
            production_store,
            routing_store,
            exponential_store,
        })
    }
}

impl Default for StoreLevels {
    fn default() -> Self {
        Self {
            production_store: DEFAULT_PRODUCTION_STORE_FRACTION,
            routing_store: DEFAULT_ROUTING_STORE_FRACTION,
            exponential_store: DEFAULT_EXPONENTIAL_STORE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub production_store: f64,
    pub routing_store: f64,
    pub exponential_store: f64,
    pub uh1: UhBuffer,
    pub uh2: UhBuffer,
}

impl State {
    /// Initial state from store levels, with empty unit hydrograph buffers
    /// sized for the run's ordinates.
    pub fn new(params: &Parameters, levels: &StoreLevels, context: &Context) -> Self {
        Self {
            production_store: levels.production_store * params.x1,
            routing_store: levels.routing_store * params.x3,
            exponential_store: levels.exponential_store,
            uh1: UhBuffer::new(context.uh1_ordinates.len()),
            uh2: UhBuffer::new(context.uh2_ordinates.len()),
        }
    }

    /// Initial state with the default levels: S at 30% of x1, R at 50% of x3,
    /// Exp at zero.
    pub fn initialize(params: &Parameters, context: &Context) -> Self {
        Self::new(params, &StoreLevels::default(), context)
    }
}
