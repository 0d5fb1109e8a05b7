/// GR6J core benchmarks: single-unit simulation and calibration batches.
///
/// Uses std::time::Instant for timing, a seeded ChaCha generator for data and
/// std::hint::black_box to prevent dead-code elimination. Set `RUST_LOG` to
/// see the library logs.
use std::error::Error;
use std::hint::black_box;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use gr6j_core::forcing::Forcing;
use gr6j_core::gr6j::{self, Parameters, StoreLevels};
use gr6j_core::{Calibration, CalibrationInputs, CatchmentRanges, Gr6jError, ModelPeriod, RunOffUnit};

const REPEATS: usize = 7;

fn make_forcing(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let precip = (0..n)
        .map(|_| {
            // dry two days out of three
            if rng.random::<f64>() < 0.66 {
                0.0
            } else {
                rng.random::<f64>() * 25.0
            }
        })
        .collect();
    let pet = (0..n).map(|_| 0.5 + rng.random::<f64>() * 4.5).collect();
    (precip, pet)
}

/// Run a closure `REPEATS` times, return the median duration.
fn median_time<F: FnMut()>(mut f: F) -> Duration {
    let mut times: Vec<Duration> = (0..REPEATS)
        .map(|_| {
            let start = Instant::now();
            f();
            start.elapsed()
        })
        .collect();
    times.sort();
    times[REPEATS / 2]
}

fn bench_run(sizes: &[usize]) -> Result<Vec<(String, Duration)>, Box<dyn Error>> {
    let params = Parameters::new(350.0, 0.0, 90.0, 1.7, 0.0, 5.0)?;
    let levels = StoreLevels::default();
    let mut results = Vec::new();

    for &n in sizes {
        let (precip, pet) = make_forcing(n, 42);
        let forcing: Vec<Forcing> = precip
            .into_iter()
            .zip(pet)
            .map(|(precip, pet)| Forcing { precip, pet })
            .collect();

        // Warmup
        black_box(gr6j::run(&params, &levels, &forcing));

        let dur = median_time(|| {
            black_box(gr6j::run(&params, &levels, &forcing));
        });
        results.push((format!("run n={n}"), dur));
    }
    Ok(results)
}

fn bench_calibration(samples: &[usize]) -> Result<Vec<(String, Duration)>, Box<dyn Error>> {
    let n = 3 * 365;
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).ok_or("invalid start date")?;
    let time: Vec<NaiveDate> = start.iter_days().take(n).collect();
    let (precipitation, evapotranspiration) = make_forcing(n, 7);
    let observed: Vec<f64> = precipitation.iter().map(|p| 0.3 * p + 0.1).collect();
    let period = ModelPeriod::new(time[366], time[n - 1])?;
    let mut results = Vec::new();

    for &sample_size in samples {
        let calibration = Calibration::new(CalibrationInputs {
            time: time.clone(),
            precipitation: precipitation.clone(),
            evapotranspiration: evapotranspiration.clone(),
            units: vec![CatchmentRanges::new(100.0)?, CatchmentRanges::new(40.0)?],
            observed_run_off: observed.clone(),
            calibration_period: period,
            warmup_period: None,
            sample_size,
            seed: Some(42),
            run_off_unit: RunOffUnit::NoConversion,
            destination: None,
            keep_run_off: false,
        })?;

        let mut outcome: Result<(), Gr6jError> = Ok(());
        let dur = median_time(|| {
            if let Err(e) = calibration.run().map(black_box) {
                outcome = Err(e);
            }
        });
        outcome?;
        results.push((format!("calibrate s={sample_size}"), dur));
    }
    Ok(results)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    println!("GR6J Core Benchmarks");
    println!("============================================================");
    println!("{:<24} {:>12}", "Case", "Median (ms)");
    println!("--------------------------------------------");

    let mut all_results = bench_run(&[3650, 36500])?;
    all_results.extend(bench_calibration(&[50, 200])?);

    for (case, dur) in &all_results {
        let ms = dur.as_secs_f64() * 1000.0;
        println!("{:<24} {:>12.2}", case, ms);
    }

    println!("============================================================");
    Ok(())
}
