use std::path::PathBuf;

use chrono::NaiveDate;
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use gr6j_core::forcing::Forcing;
use gr6j_core::gr6j::constants::NH;
use gr6j_core::gr6j::unit_hydrographs::compute_uh_ordinates;
use gr6j_core::gr6j::{run, StoreLevels};
use gr6j_core::{CatchmentUnit, Model, ModelInputs, ModelPeriod, RunOffUnit};

use crate::convert::{checked_slice, contiguous_slice, parameters, IntoPyResult};

define_timeseries_result! {
    /// GR6J run results with typed numpy array attributes.
    pub struct GR6JResult from gr6j_core::gr6j::FluxesTimeseries {
        precip, pet, net_rainfall, storage_infiltration, actual_et,
        percolation, effective_rainfall, q9, q1, exchange,
        actual_exchange_routing, actual_exchange_direct, actual_exchange_total,
        qr, qrexp, qd, production_store, routing_store, exponential_store,
        run_off,
    }
}

fn levels_from(levels: Option<(f64, f64, f64)>) -> PyResult<StoreLevels> {
    match levels {
        Some((production, routing, exponential)) => {
            StoreLevels::new(production, routing, exponential).py_err()
        }
        None => Ok(StoreLevels::default()),
    }
}

/// Run one GR6J unit over raw forcing arrays, in mm/day.
#[pyfunction]
#[pyo3(signature = (params, precip, pet, store_levels=None))]
fn gr6j_run<'py>(
    py: Python<'py>,
    params: PyReadonlyArray1<'py, f64>,
    precip: PyReadonlyArray1<'py, f64>,
    pet: PyReadonlyArray1<'py, f64>,
    store_levels: Option<(f64, f64, f64)>,
) -> PyResult<GR6JResult> {
    let p = parameters(&params)?;
    let levels = levels_from(store_levels)?;
    let precip_slice = contiguous_slice(&precip)?;
    let pet_slice = checked_slice(&pet, precip_slice.len(), "pet")?;

    let forcing: Vec<Forcing> = precip_slice
        .iter()
        .zip(pet_slice)
        .map(|(&precip, &pet)| Forcing { precip, pet })
        .collect();

    let result = py.allow_threads(|| run(&p, &levels, &forcing));
    Ok(GR6JResult::from_timeseries(py, result))
}

/// UH1 and UH2 ordinates for `x4`, zero-padded to `NH` and `2 * NH`.
#[pyfunction]
fn gr6j_compute_uh_ordinates<'py>(
    py: Python<'py>,
    x4: f64,
) -> (Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>) {
    let (uh1, uh2) = compute_uh_ordinates(x4);
    let mut uh1 = uh1.to_vec();
    let mut uh2 = uh2.to_vec();
    uh1.resize(NH, 0.0);
    uh2.resize(2 * NH, 0.0);
    (PyArray1::from_vec(py, uh1), PyArray1::from_vec(py, uh2))
}

/// Run a multi-unit catchment between two dates.
///
/// `units` is a list of `(area_km2, params)` pairs. Returns a dict with the
/// reported `time` axis, aggregated `run_off`, per-unit `units` results,
/// `metrics` when `observed` is given, and `export_dir`.
#[pyfunction]
#[pyo3(signature = (
    time, precipitation, evapotranspiration, units, run_period,
    warmup_period=None, observed=None, run_off_unit="no_conversion", destination=None,
))]
#[allow(clippy::too_many_arguments)]
fn run_model<'py>(
    py: Python<'py>,
    time: Vec<NaiveDate>,
    precipitation: PyReadonlyArray1<'py, f64>,
    evapotranspiration: PyReadonlyArray1<'py, f64>,
    units: Vec<(f64, PyReadonlyArray1<'py, f64>)>,
    run_period: (NaiveDate, NaiveDate),
    warmup_period: Option<(NaiveDate, NaiveDate)>,
    observed: Option<PyReadonlyArray1<'py, f64>>,
    run_off_unit: &str,
    destination: Option<PathBuf>,
) -> PyResult<Bound<'py, PyDict>> {
    let units = units
        .iter()
        .map(|(area, params)| CatchmentUnit::new(*area, parameters(params)?).py_err())
        .collect::<PyResult<Vec<_>>>()?;
    let warmup_period = warmup_period
        .map(|(start, end)| ModelPeriod::new(start, end))
        .transpose()
        .py_err()?;
    let observed_run_off = match &observed {
        Some(obs) => Some(contiguous_slice(obs)?.to_vec()),
        None => None,
    };

    let model = Model::new(ModelInputs {
        time,
        precipitation: contiguous_slice(&precipitation)?.to_vec(),
        evapotranspiration: contiguous_slice(&evapotranspiration)?.to_vec(),
        units,
        run_period: ModelPeriod::new(run_period.0, run_period.1).py_err()?,
        warmup_period,
        observed_run_off,
        run_off_unit: run_off_unit.parse::<RunOffUnit>().py_err()?,
        destination,
    })
    .py_err()?;
    let outputs = py.allow_threads(|| model.run()).py_err()?;

    let dict = PyDict::new(py);
    dict.set_item("time", outputs.time)?;
    dict.set_item("run_off", PyArray1::from_vec(py, outputs.run_off))?;
    dict.set_item("run_off_unit", outputs.run_off_unit.label())?;
    let unit_results = outputs
        .catchment
        .units
        .into_iter()
        .map(|unit| Py::new(py, GR6JResult::from_timeseries(py, unit.fluxes)))
        .collect::<PyResult<Vec<_>>>()?;
    dict.set_item("units", unit_results)?;
    match outputs.metrics {
        Some(m) => dict.set_item(
            "metrics",
            fields_to_dict!(py, m, nash_sutcliffe, log_nash_sutcliffe, kling_gupta, rmse, volume_error),
        )?,
        None => dict.set_item("metrics", py.None())?,
    }
    dict.set_item("export_dir", outputs.export_dir)?;
    Ok(dict)
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new(parent.py(), "gr6j")?;
    m.add_function(wrap_pyfunction!(gr6j_run, &m)?)?;
    m.add_function(wrap_pyfunction!(gr6j_compute_uh_ordinates, &m)?)?;
    m.add_function(wrap_pyfunction!(run_model, &m)?)?;
    m.add_class::<GR6JResult>()?;
    parent.add_submodule(&m)?;
    Ok(())
}
