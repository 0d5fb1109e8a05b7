//! Goodness-of-fit metrics.
//!
//! All metrics take observed and simulated slices of equal length. The
//! Nash-Sutcliffe efficiency is the calibration objective; the others are
//! reported alongside it, for direct runs and for every calibration sample.

use serde::{Deserialize, Serialize};

use crate::error::MetricError;

fn check_pair(observed: &[f64], simulated: &[f64]) -> Result<(), MetricError> {
    if observed.len() != simulated.len() {
        return Err(MetricError::LengthMismatch {
            observed: observed.len(),
            simulated: simulated.len(),
        });
    }
    if observed.is_empty() {
        return Err(MetricError::Empty);
    }
    Ok(())
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sum of squared deviations from the mean.
pub(crate) fn sum_sq_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum()
}

/// Fail when the observed series cannot be scored by NSE.
pub fn check_observed_variance(observed: &[f64]) -> Result<f64, MetricError> {
    if observed.is_empty() {
        return Err(MetricError::Empty);
    }
    // A constant series may leave rounding residue around its mean.
    let first = observed[0];
    if observed.iter().all(|&o| o == first) {
        return Err(MetricError::ZeroVariance);
    }
    let denominator = sum_sq_dev(observed);
    if denominator <= f64::EPSILON * observed.len() as f64 * mean(observed).powi(2) {
        return Err(MetricError::ZeroVariance);
    }
    Ok(denominator)
}

/// Nash-Sutcliffe Efficiency. Range: (-inf, 1], 1 = perfect.
///
/// `NSE = 1 - Σ(obs - sim)² / Σ(obs - mean(obs))²`
pub fn nse(observed: &[f64], simulated: &[f64]) -> Result<f64, MetricError> {
    check_pair(observed, simulated)?;
    let denominator = check_observed_variance(observed)?;
    Ok(nse_with_denominator(observed, simulated, denominator))
}

/// NSE with a precomputed `Σ(obs - mean(obs))²`, for scoring many
/// simulations against the same observations.
pub(crate) fn nse_with_denominator(observed: &[f64], simulated: &[f64], denominator: f64) -> f64 {
    let numerator: f64 = observed
        .iter()
        .zip(simulated)
        .map(|(o, s)| (o - s).powi(2))
        .sum();
    1.0 - numerator / denominator
}

/// NSE on log-transformed flows, emphasising low flows.
///
/// Steps where either value is not strictly positive are skipped.
pub fn log_nse(observed: &[f64], simulated: &[f64]) -> Result<f64, MetricError> {
    check_pair(observed, simulated)?;
    let (log_obs, log_sim): (Vec<f64>, Vec<f64>) = observed
        .iter()
        .zip(simulated)
        .filter(|(o, s)| **o > 0.0 && **s > 0.0)
        .map(|(o, s)| (o.ln(), s.ln()))
        .unzip();
    nse(&log_obs, &log_sim)
}

/// Which variability ratio the Kling-Gupta efficiency uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KgeVariant {
    /// Ratio of standard deviations (Gupta et al., 2009).
    Y2009,
    /// Ratio of coefficients of variation (Kling et al., 2012).
    Y2012,
}

/// Fractional ranks, 1-based. Tied values share the mean of their ranks.
fn rank(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|v| {
            let below = values.iter().filter(|o| *o < v).count() as f64;
            let tied = values.iter().filter(|o| *o == v).count() as f64;
            1.0 + below + (tied - 1.0) * 0.5
        })
        .collect()
}

/// Spearman rank correlation `1 - 6Σd² / (n(n² - 1))`.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<f64, MetricError> {
    check_pair(x, y)?;
    let n = x.len() as f64;
    if n < 2.0 {
        return Ok(0.0);
    }
    let d2: f64 = rank(x)
        .iter()
        .zip(rank(y))
        .map(|(a, b)| (a - b).powi(2))
        .sum();
    Ok(1.0 - 6.0 * d2 / (n * (n * n - 1.0)))
}

/// Non-parametric Kling-Gupta Efficiency. Range: (-inf, 1], 1 = perfect.
///
/// The correlation term is Spearman's rank correlation; variability uses
/// population standard deviations.
pub fn kge(observed: &[f64], simulated: &[f64], variant: KgeVariant) -> Result<f64, MetricError> {
    check_pair(observed, simulated)?;
    let n = observed.len() as f64;
    let mean_o = mean(observed);
    let mean_s = mean(simulated);
    let std_o = (sum_sq_dev(observed) / n).sqrt();
    let std_s = (sum_sq_dev(simulated) / n).sqrt();

    let r = if std_o == 0.0 || std_s == 0.0 {
        0.0
    } else {
        spearman(observed, simulated)?
    };
    let beta = if mean_o == 0.0 { 0.0 } else { mean_s / mean_o };
    let alpha = match variant {
        KgeVariant::Y2009 if std_o != 0.0 => std_s / std_o,
        KgeVariant::Y2012 if std_o != 0.0 && mean_s != 0.0 => {
            (std_s / mean_s) / (std_o / mean_o)
        }
        _ => 0.0,
    };

    Ok(1.0 - ((r - 1.0).powi(2) + (alpha - 1.0).powi(2) + (beta - 1.0).powi(2)).sqrt())
}

/// Root Mean Square Error. Range: [0, inf), 0 = perfect.
pub fn rmse(observed: &[f64], simulated: &[f64]) -> Result<f64, MetricError> {
    check_pair(observed, simulated)?;
    let mse = observed
        .iter()
        .zip(simulated)
        .map(|(o, s)| (o - s).powi(2))
        .sum::<f64>()
        / observed.len() as f64;
    Ok(mse.sqrt())
}

/// Relative volume error `(Σsim - Σobs) / Σobs`. Optimal = 0, positive =
/// overestimation. Infinite when the observed volume is zero.
pub fn volume_error(observed: &[f64], simulated: &[f64]) -> Result<f64, MetricError> {
    check_pair(observed, simulated)?;
    let sum_obs: f64 = observed.iter().sum();
    if sum_obs == 0.0 {
        return Ok(f64::INFINITY);
    }
    let sum_sim: f64 = simulated.iter().sum();
    Ok((sum_sim - sum_obs) / sum_obs)
}

/// Skill scores of one simulation against observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub nash_sutcliffe: f64,
    /// `None` when fewer than two positive flow pairs vary.
    pub log_nash_sutcliffe: Option<f64>,
    pub kling_gupta: f64,
    pub rmse: f64,
    pub volume_error: f64,
}

impl Metrics {
    pub fn compute(observed: &[f64], simulated: &[f64]) -> Result<Self, MetricError> {
        let nash_sutcliffe = nse(observed, simulated)?;
        Self::with_nash_sutcliffe(observed, simulated, nash_sutcliffe)
    }

    /// Fill in the remaining scores around an NSE already computed.
    pub(crate) fn with_nash_sutcliffe(
        observed: &[f64],
        simulated: &[f64],
        nash_sutcliffe: f64,
    ) -> Result<Self, MetricError> {
        Ok(Self {
            nash_sutcliffe,
            log_nash_sutcliffe: log_nse(observed, simulated).ok(),
            kling_gupta: kge(observed, simulated, KgeVariant::Y2009)?,
            rmse: rmse(observed, simulated)?,
            volume_error: volume_error(observed, simulated)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // --- NSE ---

    #[test]
    fn nse_perfect_match() {
        let obs = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(nse(&obs, &obs).unwrap(), 1.0);
    }

    #[test]
    fn nse_mean_simulation_gives_zero() {
        let obs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sim = [3.0; 5];
        assert_relative_eq!(nse(&obs, &sim).unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn nse_constant_observed_is_an_error() {
        let obs = [5.0; 5];
        let sim = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(nse(&obs, &sim).unwrap_err(), MetricError::ZeroVariance);
    }

    #[test]
    fn nse_unrepresentable_constant_is_an_error() {
        // 0.1 leaves a tiny residue around its computed mean
        let obs = [0.1; 3];
        assert_eq!(check_observed_variance(&obs).unwrap_err(), MetricError::ZeroVariance);
        assert_eq!(nse(&obs, &[0.2; 3]).unwrap_err(), MetricError::ZeroVariance);
        assert!(check_observed_variance(&[0.1, 0.1, 0.1000001]).is_ok());
    }

    #[test]
    fn nse_length_mismatch_is_an_error() {
        assert_eq!(
            nse(&[1.0, 2.0], &[1.0]).unwrap_err(),
            MetricError::LengthMismatch {
                observed: 2,
                simulated: 1
            }
        );
        assert_eq!(nse(&[], &[]).unwrap_err(), MetricError::Empty);
    }

    #[test]
    fn nse_known_value() {
        // num = 0.01+0.04+0.04+0.01+0.01 = 0.11, den = 10
        let obs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sim = [1.1, 2.2, 2.8, 4.1, 4.9];
        assert_relative_eq!(nse(&obs, &sim).unwrap(), 0.989, epsilon = 1e-10);
    }

    #[test]
    fn nse_poor_simulation_negative() {
        let obs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sim = [5.0, 4.0, 3.0, 2.0, 1.0];
        assert!(nse(&obs, &sim).unwrap() < 0.0);
    }

    // --- Log NSE ---

    #[test]
    fn log_nse_perfect_match_skips_zeros() {
        let obs = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(log_nse(&obs, &obs).unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn log_nse_weights_low_flows() {
        let obs = [0.1, 0.2, 10.0, 20.0];
        let low_miss = [0.2, 0.4, 10.0, 20.0];
        let high_miss = [0.1, 0.2, 11.0, 22.0];
        assert!(log_nse(&obs, &low_miss).unwrap() < log_nse(&obs, &high_miss).unwrap());
    }

    // --- KGE ---

    const A: [f64; 6] = [1250.0, 0.3, 500.0, 5.2, 2.0, 10.0];
    const B: [f64; 6] = [150.0, 0.03, 200.0, 5.2, 20.0, 15.0];

    #[test]
    fn ranks_average_ties() {
        assert_eq!(rank(&[3.0, 1.0, 3.0, 2.0]), vec![3.5, 1.0, 3.5, 2.0]);
        let x = [106.0, 100.0, 86.0, 101.0, 99.0, 103.0, 97.0, 113.0, 112.0, 110.0];
        assert_eq!(rank(&x), vec![7.0, 4.0, 1.0, 5.0, 3.0, 6.0, 2.0, 10.0, 9.0, 8.0]);
    }

    #[test]
    fn spearman_known_values() {
        let x = [106.0, 100.0, 86.0, 101.0, 99.0, 103.0, 97.0, 113.0, 112.0, 110.0];
        let y = [7.0, 27.0, 2.0, 50.0, 28.0, 29.0, 20.0, 12.0, 6.0, 17.0];
        assert_relative_eq!(spearman(&x, &y).unwrap(), -0.17575757575757578, epsilon = 1e-12);
        assert_relative_eq!(spearman(&A, &B).unwrap(), 0.7714285714285715, epsilon = 1e-12);
    }

    #[test]
    fn kge_known_values() {
        assert_relative_eq!(
            kge(&A, &B, KgeVariant::Y2009).unwrap(),
            -0.16047005836641337,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            kge(&A, &B, KgeVariant::Y2012).unwrap(),
            0.15721037908744573,
            epsilon = 1e-12
        );
    }

    #[test]
    fn kge_perfect_match() {
        let obs = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(kge(&obs, &obs, KgeVariant::Y2009).unwrap(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(kge(&obs, &obs, KgeVariant::Y2012).unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn kge_bias_only() {
        // Shifted series: r = 1, alpha = 1, beta = 4/3
        let obs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sim = [2.0, 3.0, 4.0, 5.0, 6.0];
        assert_relative_eq!(
            kge(&obs, &sim, KgeVariant::Y2009).unwrap(),
            1.0 - 1.0 / 3.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn kge_variability_reduces_score() {
        let obs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sim = [2.0, 2.5, 3.0, 3.5, 4.0];
        assert!(kge(&obs, &sim, KgeVariant::Y2009).unwrap() < 1.0);
    }

    #[test]
    fn kge_zero_variance_observed_is_finite() {
        let obs = [3.0; 5];
        let sim = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(kge(&obs, &sim, KgeVariant::Y2009).unwrap().is_finite());
    }

    // --- RMSE ---

    #[test]
    fn rmse_values() {
        let obs = [1.0, 2.0, 3.0];
        assert_eq!(rmse(&obs, &obs).unwrap(), 0.0);
        assert_relative_eq!(
            rmse(&obs, &[1.0, 2.0, 4.0]).unwrap(),
            (1.0_f64 / 3.0).sqrt(),
            epsilon = 1e-10
        );
    }

    // --- Volume error ---

    #[test]
    fn volume_error_values() {
        let obs = [10.0, 20.0, 30.0];
        assert_relative_eq!(
            volume_error(&obs, &[12.0, 22.0, 32.0]).unwrap(),
            0.1,
            epsilon = 1e-12
        );
        assert_eq!(
            volume_error(&[0.0; 3], &[1.0, 2.0, 3.0]).unwrap(),
            f64::INFINITY
        );
    }

    // --- Bundle ---

    #[test]
    fn metrics_bundle() {
        let obs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let m = Metrics::compute(&obs, &obs).unwrap();
        assert_eq!(m.nash_sutcliffe, 1.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.volume_error, 0.0);
        assert!(m.log_nash_sutcliffe.is_some());

        assert!(Metrics::compute(&[2.0; 5], &obs).is_err());
    }
}
