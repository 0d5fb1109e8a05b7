//! Latin-hypercube sampling of the parameter space.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::range::{CatchmentRanges, ParameterRange};
use crate::error::ConfigurationError;
use crate::gr6j::Parameters;
use crate::traits::ModelParams;

/// Draw `n` points from the hypercube spanned by `ranges`.
///
/// Each dimension is cut into `n` equal strata; every stratum receives
/// exactly one uniform draw and the strata are shuffled independently per
/// dimension. Returns `n` points of `ranges.len()` coordinates.
pub fn latin_hypercube<R: Rng>(ranges: &[ParameterRange], n: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let mut points = vec![Vec::with_capacity(ranges.len()); n];
    let mut strata: Vec<usize> = (0..n).collect();

    for range in ranges {
        strata.shuffle(rng);
        for (point, &stratum) in points.iter_mut().zip(&strata) {
            let u: f64 = rng.random();
            let value = range.min + range.width() * (stratum as f64 + u) / n as f64;
            // Rounding must not push a draw past the range.
            point.push(value.clamp(range.min, range.max));
        }
    }
    points
}

/// Parameter sets for every unit, `n` samples, reproducible from `seed`.
///
/// Returns `samples[sample][unit]`. Units are sampled one after the other
/// from the same generator.
pub fn sample_units(
    units: &[CatchmentRanges],
    n: usize,
    seed: u64,
) -> Result<Vec<Vec<Parameters>>, ConfigurationError> {
    if n == 0 {
        return Err(ConfigurationError::EmptySample);
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut samples: Vec<Vec<Parameters>> = vec![Vec::with_capacity(units.len()); n];

    for unit in units {
        let points = latin_hypercube(&unit.ranges(), n, &mut rng);
        for (sample, point) in samples.iter_mut().zip(points) {
            sample.push(Parameters::from_array(&point)?);
        }
    }
    Ok(samples)
}
