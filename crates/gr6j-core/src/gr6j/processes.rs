//! GR6J process equations.
//!
//! Pure functions, one per model component. They take store levels and
//! parameters by value and return the updated level with the fluxes it
//! produced. None of them can fail for parameters inside their bounds.

use super::constants::{EXP_BRANCH_THRESHOLD, MAX_EXP_ARG, MAX_TANH_ARG, PERC_CONSTANT};

/// Result of the production store update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Production {
    pub store: f64,
    pub actual_et: f64,
    /// Pn, zero when evapotranspiration dominates.
    pub net_rainfall: f64,
    /// Ps, the part of Pn that enters the store.
    pub storage_infiltration: f64,
    /// Pr before percolation.
    pub effective_rainfall: f64,
}

/// Update the production store with one day of precipitation and PET.
///
/// The returned level is clamped to `[0, x1]`.
pub fn production_store_update(precip: f64, pet: f64, store: f64, x1: f64) -> Production {
    let ratio = store / x1;

    let mut out = if precip < pet {
        let net_evap = pet - precip;
        let ws = (net_evap / x1).min(MAX_TANH_ARG).tanh();
        let evap_from_store = store * (2.0 - ratio) * ws / (1.0 + (1.0 - ratio) * ws);

        Production {
            store: store - evap_from_store,
            actual_et: evap_from_store + precip,
            net_rainfall: 0.0,
            storage_infiltration: 0.0,
            effective_rainfall: 0.0,
        }
    } else {
        let net_rainfall = precip - pet;
        let ws = (net_rainfall / x1).min(MAX_TANH_ARG).tanh();
        let infiltration = x1 * (1.0 - ratio * ratio) * ws / (1.0 + ratio * ws);

        Production {
            store: store + infiltration,
            actual_et: pet,
            net_rainfall,
            storage_infiltration: infiltration,
            effective_rainfall: net_rainfall - infiltration,
        }
    };

    out.store = out.store.clamp(0.0, x1);
    out
}

/// Percolation from the production store.
///
/// `Perc = S * (1 - (1 + (S/(2.25*x1))^4)^(-1/4))`
///
/// Returns (new_store, percolation).
pub fn percolation(store: f64, x1: f64) -> (f64, f64) {
    let store = store.max(0.0);
    let ratio_4 = (store / x1).powi(4);
    let perc = store * (1.0 - (1.0 + ratio_4 / PERC_CONSTANT).powf(-0.25));
    (store - perc, perc)
}

/// Potential intercatchment exchange `F = x2 * (R/x3 - x5)`.
///
/// Positive values import water, negative values export it.
pub fn groundwater_exchange(routing_store: f64, x2: f64, x3: f64, x5: f64) -> f64 {
    x2 * (routing_store / x3 - x5)
}

/// Result of the routing store update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Routing {
    pub store: f64,
    pub outflow: f64,
    pub actual_exchange: f64,
}

/// Add `inflow` (the routing share of Q9) and the exchange to the routing
/// store, then drain it with `Qr = R * (1 - (1 + (R/x3)^4)^(-1/4))`.
///
/// When the exchange would empty the store below zero only the available
/// water is exchanged.
pub fn routing_store_update(store: f64, inflow: f64, exchange: f64, x3: f64) -> Routing {
    let filled = store + inflow + exchange;
    let (actual_exchange, level) = if filled >= 0.0 {
        (exchange, filled)
    } else {
        (-(store + inflow), 0.0)
    };

    let outflow = if level > 0.0 {
        level * (1.0 - (1.0 + (level / x3).powi(4)).powf(-0.25))
    } else {
        0.0
    };

    Routing {
        store: (level - outflow).clamp(0.0, x3),
        outflow,
        actual_exchange,
    }
}

/// Add `inflow` (the exponential share of Q9) and the exchange to the
/// exponential store and compute its outflow.
///
/// The store may go negative. The outflow is a softplus of `Exp/x6`, with
/// asymptotic branches beyond +/-7 and the argument clipped to +/-33.
///
/// Returns (new_store, outflow).
pub fn exponential_store_update(store: f64, inflow: f64, exchange: f64, x6: f64) -> (f64, f64) {
    let level = store + inflow + exchange;
    let ar = (level / x6).clamp(-MAX_EXP_ARG, MAX_EXP_ARG);

    let outflow = if ar > EXP_BRANCH_THRESHOLD {
        level + x6 / ar.exp()
    } else if ar < -EXP_BRANCH_THRESHOLD {
        x6 * ar.exp()
    } else {
        x6 * (ar.exp() + 1.0).ln()
    };

    (level - outflow, outflow)
}

/// Direct branch outflow `Qd = max(Q1 + F, 0)`.
///
/// Returns (outflow, actual_exchange).
pub fn direct_branch(q1: f64, exchange: f64) -> (f64, f64) {
    let combined = q1 + exchange;
    if combined >= 0.0 {
        (combined, exchange)
    } else {
        (0.0, -q1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -- Production store --

    #[test]
    fn rainfall_dominant_fills_store() {
        let p = production_store_update(10.0, 3.0, 105.0, 350.0);
        assert!(p.store > 105.0);
        assert_relative_eq!(p.net_rainfall, 7.0);
        assert_relative_eq!(p.actual_et, 3.0);
        assert_relative_eq!(
            p.storage_infiltration + p.effective_rainfall,
            p.net_rainfall,
            epsilon = 1e-12
        );
        assert_relative_eq!(p.store - 105.0, p.storage_infiltration, epsilon = 1e-12);
    }

    #[test]
    fn evap_dominant_empties_store() {
        let p = production_store_update(2.0, 5.0, 105.0, 350.0);
        assert!(p.store < 105.0);
        assert_eq!(p.net_rainfall, 0.0);
        assert_eq!(p.effective_rainfall, 0.0);
        // AE = Es + P
        assert_relative_eq!(p.actual_et, 105.0 - p.store + 2.0, epsilon = 1e-12);
    }

    #[test]
    fn known_infiltration_value() {
        // S = 0, x1 = 100, Pn = 10: Ps = 100 * tanh(0.1)
        let p = production_store_update(10.0, 0.0, 0.0, 100.0);
        assert_relative_eq!(p.storage_infiltration, 100.0 * 0.1_f64.tanh(), epsilon = 1e-12);
    }

    #[test]
    fn zero_inputs_no_change() {
        let p = production_store_update(0.0, 0.0, 105.0, 350.0);
        assert_relative_eq!(p.store, 105.0);
        assert_eq!(p.actual_et, 0.0);
        assert_eq!(p.net_rainfall, 0.0);
        assert_eq!(p.effective_rainfall, 0.0);
    }

    #[test]
    fn store_stays_within_capacity() {
        for store in [0.0, 50.0, 349.0, 350.0] {
            for (precip, pet) in [(500.0, 0.0), (0.0, 500.0), (80.0, 2.0)] {
                let p = production_store_update(precip, pet, store, 350.0);
                assert!((0.0..=350.0).contains(&p.store));
            }
        }
    }

    // -- Percolation --

    #[test]
    fn percolation_conserves_water() {
        let (new_store, perc) = percolation(105.0, 350.0);
        assert!(perc > 0.0);
        assert_relative_eq!(new_store + perc, 105.0, epsilon = 1e-12);
    }

    #[test]
    fn percolation_known_value() {
        // S = 2.25 * x1 -> Perc = S * (1 - 2^(-1/4))
        let (_, perc) = percolation(225.0, 100.0);
        assert_relative_eq!(perc, 225.0 * (1.0 - 2.0_f64.powf(-0.25)), epsilon = 1e-10);
    }

    #[test]
    fn percolation_of_empty_store_is_zero() {
        assert_eq!(percolation(0.0, 350.0), (0.0, 0.0));
        assert_eq!(percolation(-10.0, 350.0), (0.0, 0.0));
    }

    // -- Exchange --

    #[test]
    fn exchange_sign_follows_threshold() {
        assert_eq!(groundwater_exchange(45.0, 0.0, 90.0, 0.0), 0.0);
        assert_relative_eq!(groundwater_exchange(45.0, 1.0, 90.0, 0.0), 0.5);
        assert_relative_eq!(groundwater_exchange(45.0, 1.0, 90.0, 1.0), -0.5);
    }

    // -- Routing store --

    #[test]
    fn routing_store_drains() {
        let r = routing_store_update(45.0, 5.0, 0.0, 90.0);
        assert!(r.outflow > 0.0);
        assert_relative_eq!(r.store + r.outflow, 50.0, epsilon = 1e-12);
        assert_eq!(r.actual_exchange, 0.0);
    }

    #[test]
    fn routing_store_exchange_limited_to_available_water() {
        let r = routing_store_update(5.0, 1.0, -100.0, 90.0);
        assert_eq!(r.store, 0.0);
        assert_eq!(r.outflow, 0.0);
        assert_relative_eq!(r.actual_exchange, -6.0);
    }

    #[test]
    fn routing_store_known_outflow() {
        // R = x3 after inflow -> Qr = x3 * (1 - 2^(-1/4))
        let r = routing_store_update(80.0, 10.0, 0.0, 90.0);
        assert_relative_eq!(r.outflow, 90.0 * (1.0 - 2.0_f64.powf(-0.25)), epsilon = 1e-10);
    }

    // -- Exponential store --

    #[test]
    fn exponential_store_softplus_branch() {
        let (new_store, qrexp) = exponential_store_update(0.0, 5.0, 0.0, 5.0);
        // AR = 1
        assert_relative_eq!(qrexp, 5.0 * (1.0_f64.exp() + 1.0).ln(), epsilon = 1e-12);
        assert_relative_eq!(new_store, 5.0 - qrexp, epsilon = 1e-12);
    }

    #[test]
    fn exponential_store_large_positive_branch() {
        let (new_store, qrexp) = exponential_store_update(100.0, 5.0, 0.0, 5.0);
        // AR = 21 > 7
        assert_relative_eq!(qrexp, 105.0 + 5.0 / 21.0_f64.exp(), epsilon = 1e-12);
        assert!(new_store.is_finite());
    }

    #[test]
    fn exponential_store_large_negative_branch() {
        let (new_store, qrexp) = exponential_store_update(-100.0, 5.0, 0.0, 5.0);
        // AR = -19 < -7
        assert_relative_eq!(qrexp, 5.0 * (-19.0_f64).exp(), epsilon = 1e-20);
        assert!(qrexp >= 0.0);
        assert!(new_store < -94.0);
    }

    #[test]
    fn exponential_store_argument_is_clipped() {
        let (_, qrexp) = exponential_store_update(-1.0e6, 0.0, 0.0, 1.0);
        assert_relative_eq!(qrexp, (-33.0_f64).exp());
    }

    // -- Direct branch --

    #[test]
    fn direct_branch_cases() {
        assert_eq!(direct_branch(5.0, 1.0), (6.0, 1.0));
        assert_eq!(direct_branch(5.0, 0.0), (5.0, 0.0));
        assert_eq!(direct_branch(3.0, -5.0), (0.0, -3.0));
    }
}
