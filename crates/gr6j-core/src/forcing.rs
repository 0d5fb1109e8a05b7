//! Daily forcing data.
//!
//! `TimeSeries` is the validated input of every run: a daily time axis with
//! precipitation and potential evapotranspiration. `Forcing` is one day of it
//! as seen by the model step.

use chrono::NaiveDate;

use crate::error::DataError;

/// One day of forcing [mm/day].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forcing {
    pub precip: f64,
    pub pet: f64,
}

/// Validated daily forcing series.
///
/// Invariants, checked at construction: all vectors have the same non-zero
/// length, dates are strictly increasing and one day apart, and no value is
/// NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    time: Vec<NaiveDate>,
    forcing: Vec<Forcing>,
}

impl TimeSeries {
    pub fn new(
        time: Vec<NaiveDate>,
        precipitation: Vec<f64>,
        evapotranspiration: Vec<f64>,
    ) -> Result<Self, DataError> {
        check_time_axis(&time)?;
        check_series("precipitation", time.len(), &precipitation)?;
        check_series("evapotranspiration", time.len(), &evapotranspiration)?;

        let forcing = precipitation
            .into_iter()
            .zip(evapotranspiration)
            .map(|(precip, pet)| Forcing { precip, pet })
            .collect();
        Ok(Self { time, forcing })
    }

    pub fn time(&self) -> &[NaiveDate] {
        &self.time
    }

    pub fn forcing(&self) -> &[Forcing] {
        &self.forcing
    }

    pub fn first_date(&self) -> NaiveDate {
        self.time[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.time[self.time.len() - 1]
    }

    /// Position of `date` on the axis, if covered.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if date < self.first_date() || date > self.last_date() {
            return None;
        }
        usize::try_from((date - self.first_date()).num_days()).ok()
    }

    /// Number of timesteps.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Always `false` for a constructed series.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Check that `time` is non-empty, strictly increasing and daily-contiguous.
pub(crate) fn check_time_axis(time: &[NaiveDate]) -> Result<(), DataError> {
    if time.is_empty() {
        return Err(DataError::EmptySeries);
    }
    for (index, pair) in time.windows(2).enumerate() {
        let gap = (pair[1] - pair[0]).num_days();
        if gap <= 0 {
            return Err(DataError::NonIncreasingTime { index: index + 1 });
        }
        if gap != 1 {
            return Err(DataError::NotContinuous { index: index + 1 });
        }
    }
    Ok(())
}

/// Check that `values` matches the axis length and holds no NaN.
pub(crate) fn check_series(
    series: &'static str,
    expected: usize,
    values: &[f64],
) -> Result<(), DataError> {
    if values.len() != expected {
        return Err(DataError::MismatchedLength {
            series,
            expected,
            actual: values.len(),
        });
    }
    let indices: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_nan())
        .map(|(i, _)| i)
        .collect();
    if !indices.is_empty() {
        return Err(DataError::NanValues { series, indices });
    }
    Ok(())
}
