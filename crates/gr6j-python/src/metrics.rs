use numpy::PyReadonlyArray1;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use gr6j_core::metrics::{self, KgeVariant};

use crate::convert::{contiguous_slice, IntoPyResult};

#[pyfunction]
fn nse(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    metrics::nse(contiguous_slice(&observed)?, contiguous_slice(&simulated)?).py_err()
}

#[pyfunction]
fn log_nse(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    metrics::log_nse(contiguous_slice(&observed)?, contiguous_slice(&simulated)?).py_err()
}

#[pyfunction]
#[pyo3(signature = (observed, simulated, variant="2009"))]
fn kge(
    observed: PyReadonlyArray1<'_, f64>,
    simulated: PyReadonlyArray1<'_, f64>,
    variant: &str,
) -> PyResult<f64> {
    let variant = match variant {
        "2009" => KgeVariant::Y2009,
        "2012" => KgeVariant::Y2012,
        other => {
            return Err(PyValueError::new_err(format!(
                "unknown KGE variant '{other}', expected '2009' or '2012'"
            )))
        }
    };
    metrics::kge(contiguous_slice(&observed)?, contiguous_slice(&simulated)?, variant).py_err()
}

#[pyfunction]
fn rmse(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    metrics::rmse(contiguous_slice(&observed)?, contiguous_slice(&simulated)?).py_err()
}

#[pyfunction]
fn volume_error(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    metrics::volume_error(contiguous_slice(&observed)?, contiguous_slice(&simulated)?).py_err()
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new(parent.py(), "metrics")?;
    m.add_function(wrap_pyfunction!(nse, &m)?)?;
    m.add_function(wrap_pyfunction!(log_nse, &m)?)?;
    m.add_function(wrap_pyfunction!(kge, &m)?)?;
    m.add_function(wrap_pyfunction!(rmse, &m)?)?;
    m.add_function(wrap_pyfunction!(volume_error, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}
