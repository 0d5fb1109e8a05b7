use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::{PyIndexError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use gr6j_core::calibration::DEFAULT_SAMPLE_SIZE;
use gr6j_core::traits::ModelParams;
use gr6j_core::{Calibration, CalibrationInputs, CalibrationResult, CatchmentRanges, ModelPeriod, RunOffUnit};

use crate::convert::{checked_slice, contiguous_slice, IntoPyResult};

type RangeOverrides = BTreeMap<String, (Option<f64>, Option<f64>)>;

/// Scores and parameter sets of a finished calibration batch.
#[pyclass(frozen, name = "CalibrationResult")]
pub struct PyCalibrationResult {
    inner: CalibrationResult,
}

#[pymethods]
impl PyCalibrationResult {
    #[getter]
    fn seed(&self) -> u64 {
        self.inner.seed()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    /// NSE per sample, in sample order. Failed samples score `-inf`.
    #[getter]
    fn nash_sutcliffe<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        PyArray1::from_slice(py, self.inner.nash_sutcliffe())
    }

    /// Sampled values of one parameter of one unit, in sample order.
    fn parameter_values<'py>(
        &self,
        py: Python<'py>,
        unit: usize,
        name: &str,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        self.inner
            .parameter_values(unit, name)
            .map(|values| PyArray1::from_vec(py, values))
            .ok_or_else(|| PyValueError::new_err(format!("no parameter '{name}' for unit {unit}")))
    }

    /// Parameter arrays of every unit for one sample.
    fn sample_parameters<'py>(&self, py: Python<'py>, sample: usize) -> PyResult<Vec<Bound<'py, PyArray1<f64>>>> {
        let params = self
            .inner
            .sample_parameters(sample)
            .ok_or_else(|| PyIndexError::new_err(format!("sample {sample} out of range")))?;
        Ok(params
            .iter()
            .map(|p| PyArray1::from_vec(py, p.to_array()))
            .collect())
    }

    /// Best-scoring sample as a dict, or `None` when every sample failed.
    fn best<'py>(&self, py: Python<'py>) -> PyResult<Option<Bound<'py, PyDict>>> {
        let Some(best) = self.inner.best() else {
            return Ok(None);
        };
        let dict = PyDict::new(py);
        dict.set_item("sample", best.sample)?;
        dict.set_item("nash_sutcliffe", best.nash_sutcliffe)?;
        let params: Vec<_> = best
            .parameters
            .iter()
            .map(|p| PyArray1::from_vec(py, p.to_array()))
            .collect();
        dict.set_item("parameters", params)?;
        if let Some(m) = self.inner.metrics(best.sample) {
            dict.set_item(
                "metrics",
                fields_to_dict!(py, m, nash_sutcliffe, log_nash_sutcliffe, kling_gupta, rmse, volume_error),
            )?;
        }
        Ok(Some(dict))
    }

    /// All scores of one sample as a dict, or `None` when the sample failed.
    fn metrics<'py>(&self, py: Python<'py>, sample: usize) -> PyResult<Option<Bound<'py, PyDict>>> {
        if sample >= self.inner.len() {
            return Err(PyIndexError::new_err(format!("sample {sample} out of range")));
        }
        let Some(m) = self.inner.metrics(sample) else {
            return Ok(None);
        };
        Ok(Some(fields_to_dict!(
            py,
            m,
            nash_sutcliffe,
            log_nash_sutcliffe,
            kling_gupta,
            rmse,
            volume_error
        )))
    }

    /// KGE per sample, in sample order. Failed samples are `nan`.
    #[getter]
    fn kling_gupta<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        let values = self
            .inner
            .all_metrics()
            .iter()
            .map(|m| m.map_or(f64::NAN, |m| m.kling_gupta))
            .collect();
        PyArray1::from_vec(py, values)
    }

    /// `(sample, reason)` for every failed sample.
    #[getter]
    fn failures(&self) -> Vec<(usize, String)> {
        self.inner
            .failures()
            .iter()
            .map(|f| (f.sample, f.reason.clone()))
            .collect()
    }

    /// Simulated run-off of one sample, when the batch kept it.
    fn run_off<'py>(&self, py: Python<'py>, sample: usize) -> Option<Bound<'py, PyArray1<f64>>> {
        self.inner
            .run_off(sample)
            .map(|q| PyArray1::from_slice(py, q))
    }

    #[getter]
    fn time(&self) -> Vec<NaiveDate> {
        self.inner.time().to_vec()
    }

    #[getter]
    fn observed<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        PyArray1::from_slice(py, self.inner.observed())
    }

    #[getter]
    fn run_off_unit(&self) -> &'static str {
        self.inner.run_off_unit().label()
    }

    #[getter]
    fn export_dir(&self) -> Option<PathBuf> {
        self.inner.export_dir().cloned()
    }
}

fn catchment_ranges(area: f64, overrides: Option<RangeOverrides>) -> PyResult<CatchmentRanges> {
    let mut ranges = CatchmentRanges::new(area).py_err()?;
    for (name, (min, max)) in overrides.unwrap_or_default() {
        ranges = ranges.with_range(&name, min, max).py_err()?;
    }
    Ok(ranges)
}

/// Latin-hypercube calibration of a multi-unit catchment.
///
/// `units` is a list of `(area_km2, ranges)` pairs where `ranges` maps
/// parameter names to `(min, max)`; `None` bounds keep the physical ones.
#[pyfunction]
#[pyo3(signature = (
    time, precipitation, evapotranspiration, observed, units, calibration_period,
    warmup_period=None, sample_size=DEFAULT_SAMPLE_SIZE, seed=None,
    run_off_unit="no_conversion", destination=None, keep_run_off=false,
))]
#[allow(clippy::too_many_arguments)]
fn calibrate<'py>(
    py: Python<'py>,
    time: Vec<NaiveDate>,
    precipitation: PyReadonlyArray1<'py, f64>,
    evapotranspiration: PyReadonlyArray1<'py, f64>,
    observed: PyReadonlyArray1<'py, f64>,
    units: Vec<(f64, Option<RangeOverrides>)>,
    calibration_period: (NaiveDate, NaiveDate),
    warmup_period: Option<(NaiveDate, NaiveDate)>,
    sample_size: usize,
    seed: Option<u64>,
    run_off_unit: &str,
    destination: Option<PathBuf>,
    keep_run_off: bool,
) -> PyResult<PyCalibrationResult> {
    let precipitation = contiguous_slice(&precipitation)?;
    let evapotranspiration = checked_slice(&evapotranspiration, precipitation.len(), "evapotranspiration")?;
    let units = units
        .into_iter()
        .map(|(area, overrides)| catchment_ranges(area, overrides))
        .collect::<PyResult<Vec<_>>>()?;
    let warmup_period = warmup_period
        .map(|(start, end)| ModelPeriod::new(start, end))
        .transpose()
        .py_err()?;

    let calibration = Calibration::new(CalibrationInputs {
        time,
        precipitation: precipitation.to_vec(),
        evapotranspiration: evapotranspiration.to_vec(),
        units,
        observed_run_off: contiguous_slice(&observed)?.to_vec(),
        calibration_period: ModelPeriod::new(calibration_period.0, calibration_period.1).py_err()?,
        warmup_period,
        sample_size,
        seed,
        run_off_unit: run_off_unit.parse::<RunOffUnit>().py_err()?,
        destination,
        keep_run_off,
    })
    .py_err()?;

    let inner = py.allow_threads(|| calibration.run()).py_err()?;
    Ok(PyCalibrationResult { inner })
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new(parent.py(), "calibration")?;
    m.add_function(wrap_pyfunction!(calibrate, &m)?)?;
    m.add_class::<PyCalibrationResult>()?;
    parent.add_submodule(&m)?;
    Ok(())
}
