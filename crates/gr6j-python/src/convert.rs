use numpy::PyReadonlyArray1;
use pyo3::exceptions::{PyArithmeticError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use gr6j_core::gr6j::Parameters;
use gr6j_core::traits::ModelParams;
use gr6j_core::Gr6jError;

/// Validate that a numpy array is C-contiguous and return its slice.
pub fn contiguous_slice<'py>(arr: &'py PyReadonlyArray1<'py, f64>) -> PyResult<&'py [f64]> {
    arr.as_slice()
        .map_err(|_| PyValueError::new_err("array must be C-contiguous"))
}

/// Validate length + contiguity of a numpy array.
pub fn checked_slice<'py>(
    arr: &'py PyReadonlyArray1<'py, f64>,
    expected_len: usize,
    name: &str,
) -> PyResult<&'py [f64]> {
    let slice = contiguous_slice(arr)?;
    if slice.len() != expected_len {
        return Err(PyValueError::new_err(format!(
            "{} must have {} elements, got {}",
            name,
            expected_len,
            slice.len()
        )));
    }
    Ok(slice)
}

/// Validated GR6J parameters from a 6-element array.
pub fn parameters(arr: &PyReadonlyArray1<'_, f64>) -> PyResult<Parameters> {
    let slice = contiguous_slice(arr)?;
    Parameters::from_array(slice).map_err(|e| to_py_err(e.into()))
}

/// Map core errors onto Python exceptions.
///
/// Configuration and data problems raise `ValueError`, scoring problems
/// `ArithmeticError` and cancellation `RuntimeError`.
pub fn to_py_err(err: Gr6jError) -> PyErr {
    match err {
        Gr6jError::Configuration(_) | Gr6jError::Data(_) => PyValueError::new_err(err.to_string()),
        Gr6jError::Metric(_) => PyArithmeticError::new_err(err.to_string()),
        Gr6jError::Cancelled => PyRuntimeError::new_err(err.to_string()),
    }
}

/// `?`-friendly conversion of core results.
pub trait IntoPyResult<T> {
    fn py_err(self) -> PyResult<T>;
}

impl<T, E: Into<Gr6jError>> IntoPyResult<T> for Result<T, E> {
    fn py_err(self) -> PyResult<T> {
        self.map_err(|e| to_py_err(e.into()))
    }
}
