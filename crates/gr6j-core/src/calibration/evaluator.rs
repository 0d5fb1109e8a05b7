//! Scoring of a single calibration sample.

use log::debug;

use crate::catchment::{run_units, CatchmentUnit};
use crate::forcing::Forcing;
use crate::gr6j::Parameters;
use crate::metrics::{nse_with_denominator, Metrics};
use crate::runoff::RunOffUnit;

use super::range::CatchmentRanges;

/// Outcome of one sample.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Evaluation {
    pub score: f64,
    /// `None` for failed samples.
    pub metrics: Option<Metrics>,
    pub run_off: Vec<f64>,
    pub failure: Option<String>,
}

/// Inputs shared, read-only, by every sample of a batch.
pub(crate) struct Evaluator<'a> {
    pub units: &'a [CatchmentRanges],
    pub forcing: &'a [Forcing],
    pub warm_up_len: usize,
    pub observed: &'a [f64],
    /// `Σ(obs - mean(obs))²`, non-zero.
    pub denominator: f64,
    pub run_off_unit: RunOffUnit,
    pub total_area: f64,
}

impl Evaluator<'_> {
    pub fn evaluate(&self, sample: usize, parameters: &[Parameters]) -> Evaluation {
        let units: Vec<CatchmentUnit> = self
            .units
            .iter()
            .zip(parameters)
            .map(|(r, p)| CatchmentUnit {
                area: r.area,
                parameters: *p,
                store_levels: r.store_levels,
            })
            .collect();

        let mut run_off = run_units(&units, self.forcing, self.warm_up_len).run_off;
        self.run_off_unit
            .convert_series(&mut run_off, self.total_area);

        let scored = score(self.observed, self.denominator, &run_off).and_then(|nse| {
            Metrics::with_nash_sutcliffe(self.observed, &run_off, nse).map_err(|e| e.to_string())
        });
        match scored {
            Ok(metrics) => {
                debug!(
                    "Sample #{sample}: NSE = {:.4}, KGE = {:.4}",
                    metrics.nash_sutcliffe, metrics.kling_gupta
                );
                Evaluation {
                    score: metrics.nash_sutcliffe,
                    metrics: Some(metrics),
                    run_off,
                    failure: None,
                }
            }
            Err(reason) => {
                debug!("Sample #{sample} failed: {reason}");
                Evaluation {
                    score: f64::NEG_INFINITY,
                    metrics: None,
                    run_off,
                    failure: Some(reason),
                }
            }
        }
    }
}

/// NSE of `simulated`, or the reason it cannot be trusted.
pub(crate) fn score(observed: &[f64], denominator: f64, simulated: &[f64]) -> Result<f64, String> {
    if let Some(step) = simulated.iter().position(|q| !q.is_finite()) {
        return Err(format!(
            "non-finite simulated run-off ({}) at step {step}",
            simulated[step]
        ));
    }
    let nse = nse_with_denominator(observed, simulated, denominator);
    if nse.is_finite() {
        Ok(nse)
    } else {
        Err(format!("non-finite Nash-Sutcliffe efficiency ({nse})"))
    }
}
