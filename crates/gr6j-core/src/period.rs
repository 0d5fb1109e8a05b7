//! Run and warm-up periods.

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{Months, NaiveDate};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::forcing::{Forcing, TimeSeries};

/// A closed date range, `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawModelPeriod")]
pub struct ModelPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Deserialize)]
struct RawModelPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawModelPeriod> for ModelPeriod {
    type Error = ConfigurationError;

    fn try_from(raw: RawModelPeriod) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl ModelPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigurationError> {
        if start >= end {
            return Err(ConfigurationError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Number of days, both ends included.
    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for ModelPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Where a simulation starts and which part of it is reported.
///
/// Indices refer to the time axis of the `TimeSeries` the window was
/// resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationWindow {
    pub run: ModelPeriod,
    /// First and last day of the warm-up, if any. May be a single day.
    pub warm_up: Option<(NaiveDate, NaiveDate)>,
    start_index: usize,
    run_index: usize,
    end_index: usize,
}

impl SimulationWindow {
    /// Validate `run` and the optional explicit warm-up against the time axis
    /// of `series`.
    ///
    /// Without an explicit warm-up, the year preceding the run start is used
    /// (365 or 366 days), clipped to the first date of the axis.
    pub fn resolve(
        series: &TimeSeries,
        run: ModelPeriod,
        warm_up: Option<ModelPeriod>,
    ) -> Result<Self, ConfigurationError> {
        let run_index = on_axis(series, "run period start", run.start)?;
        let end_index = on_axis(series, "run period end", run.end)?;
        let first = series.first_date();

        let warm_up = match warm_up {
            Some(period) => {
                let expected = run.start.pred_opt().unwrap_or(run.start);
                if period.end != expected {
                    return Err(ConfigurationError::DetachedWarmUp {
                        expected,
                        actual: period.end,
                    });
                }
                on_axis(series, "warm-up start", period.start)?;
                Some((period.start, period.end))
            }
            None if run.start == first => {
                warn!("The input data is too short to define a warm-up period");
                None
            }
            None => {
                // one calendar year ending the day before the run
                let end = run.start.pred_opt().unwrap_or(first);
                let year_before = end
                    .checked_sub_months(Months::new(12))
                    .and_then(|d| d.succ_opt())
                    .unwrap_or(first);
                let start = if year_before < first {
                    warn!(
                        "The input data is too short to define a one-year warm-up period. \
                         The warm-up starts on {first}, the first date of the time axis"
                    );
                    first
                } else {
                    year_before
                };
                Some((start, end))
            }
        };

        let start_index = match warm_up {
            Some((start, end)) => {
                info!("Model warm-up period set to {start} to {end}");
                on_axis(series, "warm-up start", start)?
            }
            None => run_index,
        };
        info!("Model run period set to {run}");

        Ok(Self {
            run,
            warm_up,
            start_index,
            run_index,
            end_index,
        })
    }

    /// Axis indices simulated, warm-up included.
    pub fn simulated(&self) -> RangeInclusive<usize> {
        self.start_index..=self.end_index
    }

    /// Axis indices reported.
    pub fn reported(&self) -> RangeInclusive<usize> {
        self.run_index..=self.end_index
    }

    /// Number of simulated steps before the run start.
    pub fn warm_up_len(&self) -> usize {
        self.run_index - self.start_index
    }

    /// Number of reported steps.
    pub fn run_len(&self) -> usize {
        self.end_index - self.run_index + 1
    }

    /// Forcing to simulate, warm-up included.
    pub fn forcing<'a>(&self, series: &'a TimeSeries) -> &'a [Forcing] {
        &series.forcing()[self.simulated()]
    }

    /// Dates of the reported steps.
    pub fn dates<'a>(&self, series: &'a TimeSeries) -> &'a [NaiveDate] {
        &series.time()[self.reported()]
    }
}

fn on_axis(
    series: &TimeSeries,
    what: &'static str,
    date: NaiveDate,
) -> Result<usize, ConfigurationError> {
    series
        .index_of(date)
        .ok_or_else(|| ConfigurationError::DateOutsideTimeAxis {
            what,
            date,
            first: series.first_date(),
            last: series.last_date(),
        })
}
