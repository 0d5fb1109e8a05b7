/// GR6J numerical constants and parameter bounds.
///
/// Structural constants follow airGR; parameter bounds are the physical
/// limits accepted when building a [`super::params::Parameters`].

// -- Routing split fractions --

/// Fraction of effective rainfall routed through UH1 (slow branch).
pub const B: f64 = 0.9;

/// Fraction of UH1 output sent to the exponential store.
pub const C: f64 = 0.4;

// -- Unit hydrograph parameters --

/// S-curve exponent.
pub const D: f64 = 2.5;

/// Maximum UH1 length in days. UH2 is at most 2*NH days.
pub const NH: usize = 20;

// -- Percolation constant --

/// (9/4)^4, so that `(S/x1)^4 / PERC_CONSTANT == (S/(2.25*x1))^4`.
pub const PERC_CONSTANT: f64 = 25.62890625;

// -- Numerical safeguards --

/// Maximum argument for tanh in the production store.
pub const MAX_TANH_ARG: f64 = 13.0;

/// Clipping bound for the scaled exponential store level.
pub const MAX_EXP_ARG: f64 = 33.0;

/// Threshold switching the exponential store outflow equation.
pub const EXP_BRANCH_THRESHOLD: f64 = 7.0;

// -- Default initial store levels --

/// Initial production store level as a fraction of x1.
pub const DEFAULT_PRODUCTION_STORE_FRACTION: f64 = 0.3;

/// Initial routing store level as a fraction of x3.
pub const DEFAULT_ROUTING_STORE_FRACTION: f64 = 0.5;

/// Initial exponential store level [mm].
pub const DEFAULT_EXPONENTIAL_STORE: f64 = 0.0;

// -- Parameter contract --

pub const N_PARAMS: usize = 6;

/// Parameter names in order.
pub const PARAM_NAMES: &[&str] = &["x1", "x2", "x3", "x4", "x5", "x6"];

/// Inclusive physical bounds of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Production store capacity [mm].
pub const X1_BOUNDS: Bounds = Bounds {
    min: 0.01,
    max: 2500.0,
};

/// Intercatchment exchange coefficient [mm/day].
pub const X2_BOUNDS: Bounds = Bounds {
    min: -5.0,
    max: 5.0,
};

/// Routing store capacity [mm].
pub const X3_BOUNDS: Bounds = Bounds {
    min: 0.01,
    max: 1000.0,
};

/// Unit hydrograph time base [days]. 0.5 is a valid value: both unit
/// hydrographs then hold a single ordinate of 1.
pub const X4_BOUNDS: Bounds = Bounds {
    min: 0.5,
    max: 10.0,
};

/// Intercatchment exchange threshold [-].
pub const X5_BOUNDS: Bounds = Bounds {
    min: -4.0,
    max: 4.0,
};

/// Exponential store time constant [mm].
pub const X6_BOUNDS: Bounds = Bounds {
    min: 0.01,
    max: 20.0,
};

/// Bounds in parameter order.
pub const PARAM_BOUNDS: [Bounds; N_PARAMS] = [
    X1_BOUNDS, X2_BOUNDS, X3_BOUNDS, X4_BOUNDS, X5_BOUNDS, X6_BOUNDS,
];
