//! Direct model runs with fixed parameters.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use log::info;

use crate::catchment::{run_units, total_area, validate_units, CatchmentOutputs, CatchmentUnit};
use crate::error::{ConfigurationError, DataError, Result};
use crate::forcing::{check_series, TimeSeries};
use crate::metrics::Metrics;
use crate::period::{ModelPeriod, SimulationWindow};
use crate::runoff::RunOffUnit;

/// Everything needed to run the model once.
#[derive(Debug, Clone)]
pub struct ModelInputs {
    pub time: Vec<NaiveDate>,
    /// Total precipitation [mm/day].
    pub precipitation: Vec<f64>,
    /// Potential evapotranspiration [mm/day].
    pub evapotranspiration: Vec<f64>,
    /// One unit for a lumped catchment, several for a split one.
    pub units: Vec<CatchmentUnit>,
    pub run_period: ModelPeriod,
    /// Defaults to the year before `run_period.start` when `None`.
    pub warmup_period: Option<ModelPeriod>,
    /// Observed run-off on the same time axis, in `run_off_unit`. Only used
    /// to score the simulation.
    pub observed_run_off: Option<Vec<f64>>,
    pub run_off_unit: RunOffUnit,
    /// Existing folder a results exporter may write into.
    pub destination: Option<PathBuf>,
}

/// A validated model, ready to run.
#[derive(Debug, Clone)]
pub struct Model {
    series: TimeSeries,
    units: Vec<CatchmentUnit>,
    window: SimulationWindow,
    observed: Option<Vec<f64>>,
    run_off_unit: RunOffUnit,
    destination: Option<PathBuf>,
}

/// Outputs of a direct run, restricted to the run period.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutputs {
    pub time: Vec<NaiveDate>,
    /// Catchment run-off in `run_off_unit`.
    pub run_off: Vec<f64>,
    pub run_off_unit: RunOffUnit,
    /// Per-unit fluxes and the area-weighted depth.
    pub catchment: CatchmentOutputs,
    /// Present when observed run-off was supplied.
    pub metrics: Option<Metrics>,
    /// Timestamped sub-folder of the destination for this run (not created).
    pub export_dir: Option<PathBuf>,
}

impl Model {
    pub fn new(inputs: ModelInputs) -> Result<Self> {
        let series = TimeSeries::new(
            inputs.time,
            inputs.precipitation,
            inputs.evapotranspiration,
        )?;
        validate_units(&inputs.units)?;
        let window = SimulationWindow::resolve(&series, inputs.run_period, inputs.warmup_period)?;
        let observed = inputs
            .observed_run_off
            .map(|q| reported_observed(&series, &window, q))
            .transpose()?;
        if let Some(dest) = &inputs.destination {
            check_destination(dest)?;
        }

        Ok(Self {
            series,
            units: inputs.units,
            window,
            observed,
            run_off_unit: inputs.run_off_unit,
            destination: inputs.destination,
        })
    }

    pub fn window(&self) -> &SimulationWindow {
        &self.window
    }

    pub fn run(&self) -> Result<ModelOutputs> {
        info!(
            "Running GR6J with {} hydrological unit(s) over {}",
            self.units.len(),
            self.window.run
        );
        let catchment = run_units(
            &self.units,
            self.window.forcing(&self.series),
            self.window.warm_up_len(),
        );

        let mut run_off = catchment.run_off.clone();
        self.run_off_unit
            .convert_series(&mut run_off, total_area(&self.units));

        let metrics = self
            .observed
            .as_deref()
            .map(|obs| Metrics::compute(obs, &run_off))
            .transpose()?;
        if let Some(m) = &metrics {
            info!("Nash-Sutcliffe efficiency: {:.4}", m.nash_sutcliffe);
        }

        let export_dir = self
            .destination
            .as_ref()
            .map(|d| d.join(Local::now().format("%Y%m%d_%H%M").to_string()));

        Ok(ModelOutputs {
            time: self.window.dates(&self.series).to_vec(),
            run_off,
            run_off_unit: self.run_off_unit,
            catchment,
            metrics,
            export_dir,
        })
    }
}

/// Cut the observed series to the reported period and reject NaN in it.
pub(crate) fn reported_observed(
    series: &TimeSeries,
    window: &SimulationWindow,
    observed: Vec<f64>,
) -> Result<Vec<f64>, DataError> {
    if observed.len() != series.len() {
        return Err(DataError::MismatchedLength {
            series: "observed run-off",
            expected: series.len(),
            actual: observed.len(),
        });
    }
    let reported = observed[window.reported()].to_vec();
    check_series("observed run-off", reported.len(), &reported)?;
    Ok(reported)
}

/// The destination must be an existing directory we can create files in.
pub(crate) fn check_destination(dest: &Path) -> Result<(), ConfigurationError> {
    let metadata = match fs::metadata(dest) {
        Ok(m) if m.is_dir() => m,
        _ => return Err(ConfigurationError::DestinationNotFound(dest.to_path_buf())),
    };
    let not_writable = || ConfigurationError::DestinationNotWritable(dest.to_path_buf());
    if metadata.permissions().readonly() {
        return Err(not_writable());
    }
    let marker = dest.join(format!(".gr6j-write-check-{}", std::process::id()));
    fs::File::create(&marker).map_err(|_| not_writable())?;
    fs::remove_file(&marker).map_err(|_| not_writable())?;
    Ok(())
}
