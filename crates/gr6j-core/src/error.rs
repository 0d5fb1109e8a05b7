//! Error taxonomy for model construction, input data and scoring.
//!
//! All three families are raised before (or, for metrics, right after) any
//! simulation step runs. Nothing here is retried.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Invalid parameters, ranges, periods or output settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("{name} = {value} is out of bounds [{min}, {max}]")]
    ParameterOutOfBounds {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("expected {expected} parameters, got {actual}")]
    ParameterCount { expected: usize, actual: usize },
    #[error("unknown parameter '{0}', expected one of x1 to x6")]
    UnknownParameter(String),
    #[error("the lower bound ({min}) for {name} must not be larger than its upper bound ({max})")]
    InvertedRange { name: &'static str, min: f64, max: f64 },
    #[error("the range [{min}, {max}] for {name} is outside the physical bounds [{lower}, {upper}]")]
    RangeOutsideBounds {
        name: &'static str,
        min: f64,
        max: f64,
        lower: f64,
        upper: f64,
    },
    #[error("the period end date {end} must be after the start date {start}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },
    #[error("the {what} {date} is outside the time axis ({first} to {last})")]
    DateOutsideTimeAxis {
        what: &'static str,
        date: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },
    #[error("the warm-up period must end on {expected}, the day before the run start, not {actual}")]
    DetachedWarmUp { expected: NaiveDate, actual: NaiveDate },
    #[error("the area of hydrological unit #{unit} must be positive, got {area}")]
    NonPositiveArea { unit: usize, area: f64 },
    #[error("the {store} initial level {value} must be a fraction between 0 and 1")]
    InvalidStoreFraction { store: &'static str, value: f64 },
    #[error("at least one hydrological unit is required")]
    NoHydrologicalUnits,
    #[error("the sample size must be at least 1")]
    EmptySample,
    #[error("the destination folder {} does not exist or is not a directory", .0.display())]
    DestinationNotFound(PathBuf),
    #[error("the destination folder {} is not writable", .0.display())]
    DestinationNotWritable(PathBuf),
    #[error("unknown run-off unit '{0}'")]
    UnknownRunOffUnit(String),
}

/// Inconsistent or malformed input series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("the time vector is empty")]
    EmptySeries,
    #[error("the time and {series} vectors must have the same length ({expected} != {actual})")]
    MismatchedLength {
        series: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("the time vector must be strictly increasing (index {index})")]
    NonIncreasingTime { index: usize },
    #[error("the time vector must have continuous daily dates (gap at index {index})")]
    NotContinuous { index: usize },
    #[error("the {series} series contains NaN values at indices {indices:?}")]
    NanValues {
        series: &'static str,
        indices: Vec<usize>,
    },
}

/// A score that cannot be computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("the observed series has zero variance; the Nash-Sutcliffe efficiency is undefined")]
    ZeroVariance,
    #[error("observed has {observed} values and simulated has {simulated} values")]
    LengthMismatch { observed: usize, simulated: usize },
    #[error("cannot score an empty series")]
    Empty,
}

/// Any failure surfaced by the model or calibration entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Gr6jError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Metric(#[from] MetricError),
    #[error("the calibration batch was cancelled")]
    Cancelled,
}

pub type Result<T, E = Gr6jError> = std::result::Result<T, E>;
