/// Generate a frozen `#[pyclass]` struct where each field is a `Py<PyArray1<f64>>`.
///
/// Also generates a `from_timeseries()` method that moves the vectors of a
/// core timeseries struct into numpy arrays.
macro_rules! define_timeseries_result {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident from $core_type:ty {
            $($field:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[pyo3::pyclass(frozen)]
        $vis struct $name {
            $(
                #[pyo3(get)]
                pub $field: Py<numpy::PyArray1<f64>>,
            )+
        }

        impl $name {
            pub fn from_timeseries(py: pyo3::Python<'_>, ts: $core_type) -> Self {
                Self {
                    $(
                        $field: numpy::PyArray1::from_vec(py, ts.$field).unbind(),
                    )+
                }
            }
        }
    };
}

/// Copy named `f64` fields of a struct into a `PyDict`.
macro_rules! fields_to_dict {
    ($py:expr, $value:expr, $($field:ident),+ $(,)?) => {{
        let dict = pyo3::types::PyDict::new($py);
        $(
            dict.set_item(stringify!($field), $value.$field)?;
        )+
        dict
    }};
}
