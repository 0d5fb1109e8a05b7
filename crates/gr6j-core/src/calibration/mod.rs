//! Latin-hypercube calibration ranked by Nash-Sutcliffe efficiency.
//!
//! A batch draws `sample_size` parameter sets per unit, simulates each one
//! over warm-up plus calibration period and scores the converted run-off
//! against the observations. Samples run in parallel on the rayon pool and
//! results are kept in sample order.

mod evaluator;
pub mod range;
pub mod sampler;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Local, NaiveDate};
use log::{info, warn};
use rayon::prelude::*;

use crate::catchment::check_area;
use crate::error::{ConfigurationError, Gr6jError, Result};
use crate::forcing::TimeSeries;
use crate::gr6j::Parameters;
use crate::metrics::{check_observed_variance, Metrics};
use crate::model::{check_destination, reported_observed};
use crate::period::{ModelPeriod, SimulationWindow};
use crate::runoff::RunOffUnit;
use crate::traits::ModelParams;

use evaluator::{Evaluation, Evaluator};
pub use range::{CatchmentRanges, ParameterRange};

pub const DEFAULT_SAMPLE_SIZE: usize = 200;

/// Everything needed to run a calibration batch.
#[derive(Debug, Clone)]
pub struct CalibrationInputs {
    pub time: Vec<NaiveDate>,
    pub precipitation: Vec<f64>,
    pub evapotranspiration: Vec<f64>,
    /// Ranges of each hydrological unit.
    pub units: Vec<CatchmentRanges>,
    /// Observed run-off on the same time axis, in `run_off_unit`.
    pub observed_run_off: Vec<f64>,
    pub calibration_period: ModelPeriod,
    /// Defaults to the year before the calibration start when `None`.
    pub warmup_period: Option<ModelPeriod>,
    pub sample_size: usize,
    /// Drawn from entropy (and reported in the result) when `None`.
    pub seed: Option<u64>,
    pub run_off_unit: RunOffUnit,
    pub destination: Option<PathBuf>,
    /// Keep the simulated run-off of every sample in the result.
    pub keep_run_off: bool,
}

/// A validated calibration batch.
#[derive(Debug, Clone)]
pub struct Calibration {
    series: TimeSeries,
    units: Vec<CatchmentRanges>,
    window: SimulationWindow,
    observed: Vec<f64>,
    denominator: f64,
    sample_size: usize,
    seed: Option<u64>,
    run_off_unit: RunOffUnit,
    destination: Option<PathBuf>,
    keep_run_off: bool,
}

impl Calibration {
    pub fn new(inputs: CalibrationInputs) -> Result<Self> {
        let series = TimeSeries::new(
            inputs.time,
            inputs.precipitation,
            inputs.evapotranspiration,
        )?;
        if inputs.units.is_empty() {
            return Err(ConfigurationError::NoHydrologicalUnits.into());
        }
        for (i, unit) in inputs.units.iter().enumerate() {
            check_area(i, unit.area)?;
        }
        if inputs.sample_size == 0 {
            return Err(ConfigurationError::EmptySample.into());
        }
        let window = SimulationWindow::resolve(
            &series,
            inputs.calibration_period,
            inputs.warmup_period,
        )?;
        let observed = reported_observed(&series, &window, inputs.observed_run_off)?;
        let denominator = check_observed_variance(&observed)?;
        if let Some(dest) = &inputs.destination {
            check_destination(dest)?;
        }

        Ok(Self {
            series,
            units: inputs.units,
            window,
            observed,
            denominator,
            sample_size: inputs.sample_size,
            seed: inputs.seed,
            run_off_unit: inputs.run_off_unit,
            destination: inputs.destination,
            keep_run_off: inputs.keep_run_off,
        })
    }

    pub fn run(&self) -> Result<CalibrationResult> {
        self.run_with_cancel(&AtomicBool::new(false))
    }

    /// Run the batch, giving up with [`Gr6jError::Cancelled`] once `cancel`
    /// is set. No partial result is returned.
    pub fn run_with_cancel(&self, cancel: &AtomicBool) -> Result<CalibrationResult> {
        let seed = self.seed.unwrap_or_else(|| {
            let seed = rand::random::<u64>();
            warn!("No seed given for the calibration; using {seed}");
            seed
        });
        let samples = sampler::sample_units(&self.units, self.sample_size, seed)?;
        info!(
            "Calibrating {} hydrological unit(s) with {} samples over {}",
            self.units.len(),
            self.sample_size,
            self.window.run
        );

        let evaluator = Evaluator {
            units: &self.units,
            forcing: self.window.forcing(&self.series),
            warm_up_len: self.window.warm_up_len(),
            observed: &self.observed,
            denominator: self.denominator,
            run_off_unit: self.run_off_unit,
            total_area: self.units.iter().map(|u| u.area).sum(),
        };

        let evaluations: Option<Vec<Evaluation>> = samples
            .par_iter()
            .enumerate()
            .map(|(i, parameters)| {
                if cancel.load(Ordering::Relaxed) {
                    None
                } else {
                    Some(evaluator.evaluate(i, parameters))
                }
            })
            .collect();
        let evaluations = match evaluations {
            Some(e) if !cancel.load(Ordering::Relaxed) => e,
            _ => {
                warn!("Calibration cancelled");
                return Err(Gr6jError::Cancelled);
            }
        };

        let mut scores = Vec::with_capacity(evaluations.len());
        let mut metrics = Vec::with_capacity(evaluations.len());
        let mut failures = Vec::new();
        let mut run_off = self.keep_run_off.then(|| Vec::with_capacity(evaluations.len()));
        for (sample, e) in evaluations.into_iter().enumerate() {
            scores.push(e.score);
            metrics.push(e.metrics);
            if let Some(reason) = e.failure {
                failures.push(SampleFailure { sample, reason });
            }
            if let Some(r) = run_off.as_mut() {
                r.push(e.run_off);
            }
        }

        let result = CalibrationResult {
            seed,
            samples,
            scores,
            metrics,
            failures,
            run_off,
            time: self.window.dates(&self.series).to_vec(),
            observed: self.observed.clone(),
            run_off_unit: self.run_off_unit,
            export_dir: self
                .destination
                .as_ref()
                .map(|d| d.join(Local::now().format("%Y%m%d_%H%M").to_string())),
        };
        if let Some(best) = result.best() {
            info!(
                "Best sample #{} with NSE = {:.4}",
                best.sample, best.nash_sutcliffe
            );
        }
        if !result.failures.is_empty() {
            warn!("{} sample(s) failed", result.failures.len());
        }
        Ok(result)
    }
}

/// A sample whose simulation could not be scored.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFailure {
    pub sample: usize,
    pub reason: String,
}

/// The highest-scoring sample of a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestSample<'a> {
    pub sample: usize,
    pub nash_sutcliffe: f64,
    /// One set per hydrological unit.
    pub parameters: &'a [Parameters],
}

/// Outcome of a calibration batch, in sample order.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationResult {
    seed: u64,
    samples: Vec<Vec<Parameters>>,
    scores: Vec<f64>,
    metrics: Vec<Option<Metrics>>,
    failures: Vec<SampleFailure>,
    run_off: Option<Vec<Vec<f64>>>,
    time: Vec<NaiveDate>,
    observed: Vec<f64>,
    run_off_unit: RunOffUnit,
    export_dir: Option<PathBuf>,
}

impl CalibrationResult {
    /// Seed that reproduces this batch.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// NSE of every sample; `f64::NEG_INFINITY` for failed samples.
    pub fn nash_sutcliffe(&self) -> &[f64] {
        &self.scores
    }

    /// All scores of one sample; `None` for failed or out-of-range samples.
    pub fn metrics(&self, sample: usize) -> Option<&Metrics> {
        self.metrics.get(sample)?.as_ref()
    }

    /// One entry per sample, `None` where the sample failed.
    pub fn all_metrics(&self) -> &[Option<Metrics>] {
        &self.metrics
    }

    /// Values of parameter `name` of unit `unit`, one per sample.
    pub fn parameter_values(&self, unit: usize, name: &str) -> Option<Vec<f64>> {
        self.samples
            .iter()
            .map(|s| s.get(unit).and_then(|p| p.get(name)))
            .collect()
    }

    /// Parameter sets of one sample, one per unit.
    pub fn sample_parameters(&self, sample: usize) -> Option<&[Parameters]> {
        self.samples.get(sample).map(Vec::as_slice)
    }

    pub fn failures(&self) -> &[SampleFailure] {
        &self.failures
    }

    pub fn best(&self) -> Option<BestSample<'_>> {
        self.scores
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_finite())
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(sample, &nash_sutcliffe)| BestSample {
                sample,
                nash_sutcliffe,
                parameters: &self.samples[sample],
            })
    }

    /// Simulated run-off of one sample, when the batch kept it.
    pub fn run_off(&self, sample: usize) -> Option<&[f64]> {
        self.run_off.as_ref()?.get(sample).map(Vec::as_slice)
    }

    /// Dates of the calibration period.
    pub fn time(&self) -> &[NaiveDate] {
        &self.time
    }

    pub fn observed(&self) -> &[f64] {
        &self.observed
    }

    pub fn run_off_unit(&self) -> RunOffUnit {
        self.run_off_unit
    }

    /// Timestamped sub-folder of the destination for this batch (not created).
    pub fn export_dir(&self) -> Option<&PathBuf> {
        self.export_dir.as_ref()
    }
}
