/// GR6J model orchestration.
///
/// - `step()`: advance a state by one day and return that day's fluxes
/// - `run()`: simulate a forcing series from given initial store levels
/// - `GR6J`: the `HydrologicalModel` implementation tying both together
use super::constants::{B, C};
use super::fluxes::{Fluxes, FluxesTimeseries};
use super::params::Parameters;
use super::processes;
use super::state::{State, StoreLevels};
use super::unit_hydrographs::{compute_uh_ordinates, Ordinates};
use crate::forcing::Forcing;
use crate::traits::HydrologicalModel;

/// Run-constant data derived from the parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub uh1_ordinates: Ordinates,
    pub uh2_ordinates: Ordinates,
}

impl Context {
    pub fn new(params: &Parameters) -> Self {
        let (uh1_ordinates, uh2_ordinates) = compute_uh_ordinates(params.x4);
        Self {
            uh1_ordinates,
            uh2_ordinates,
        }
    }
}

/// Execute one timestep, updating `state` in place.
pub fn step(state: &mut State, params: &Parameters, forcing: &Forcing, context: &Context) -> Fluxes {
    let Forcing { precip, pet } = *forcing;

    // Production store, then percolation
    let production =
        processes::production_store_update(precip, pet, state.production_store, params.x1);
    let (production_store, percolation) = processes::percolation(production.store, params.x1);
    let effective_rainfall = production.effective_rainfall + percolation;

    // Unit hydrographs
    let q9 = state
        .uh1
        .convolve(&context.uh1_ordinates, B * effective_rainfall);
    let q1 = state
        .uh2
        .convolve(&context.uh2_ordinates, (1.0 - B) * effective_rainfall);

    // Exchange is driven by the routing level at the start of the step
    let exchange =
        processes::groundwater_exchange(state.routing_store, params.x2, params.x3, params.x5);

    let routing =
        processes::routing_store_update(state.routing_store, (1.0 - C) * q9, exchange, params.x3);
    let (exponential_store, qrexp) =
        processes::exponential_store_update(state.exponential_store, C * q9, exchange, params.x6);
    let (qd, actual_exchange_direct) = processes::direct_branch(q1, exchange);

    let run_off = (routing.outflow + qrexp + qd).max(0.0);

    state.production_store = production_store;
    state.routing_store = routing.store;
    state.exponential_store = exponential_store;

    Fluxes {
        precip,
        pet,
        net_rainfall: production.net_rainfall,
        storage_infiltration: production.storage_infiltration,
        actual_et: production.actual_et,
        percolation,
        effective_rainfall,
        q9,
        q1,
        exchange,
        actual_exchange_routing: routing.actual_exchange,
        actual_exchange_direct,
        actual_exchange_total: routing.actual_exchange + actual_exchange_direct + exchange,
        qr: routing.outflow,
        qrexp,
        qd,
        production_store,
        routing_store: routing.store,
        exponential_store,
        run_off,
    }
}

/// Simulate `forcing` starting from `levels`.
///
/// The UH ordinates are computed once; the state is private to the call.
pub fn run(params: &Parameters, levels: &StoreLevels, forcing: &[Forcing]) -> FluxesTimeseries {
    let context = GR6J::prepare(params);
    let state = State::new(params, levels, &context);
    run_from(params, state, forcing, &context)
}

fn run_from(
    params: &Parameters,
    mut state: State,
    forcing: &[Forcing],
    context: &Context,
) -> FluxesTimeseries {
    let mut outputs = FluxesTimeseries::with_capacity(forcing.len());
    for f in forcing {
        outputs.push(&step(&mut state, params, f, context));
    }
    outputs
}

/// GR6J as a [`HydrologicalModel`].
pub struct GR6J;

impl HydrologicalModel for GR6J {
    type Params = Parameters;
    type State = State;
    type Forcing = Forcing;
    type Fluxes = Fluxes;
    type FluxesTimeseries = FluxesTimeseries;
    type Context = Context;

    fn prepare(params: &Parameters) -> Context {
        Context::new(params)
    }

    fn initialize_state(params: &Parameters, context: &Context) -> State {
        State::initialize(params, context)
    }

    fn step(state: &mut State, params: &Parameters, forcing: &Forcing, context: &Context) -> Fluxes {
        step(state, params, forcing, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_params() -> Parameters {
        Parameters::new(350.0, 0.0, 90.0, 1.7, 0.0, 5.0).unwrap()
    }

    fn forcing(precip: &[f64], pet: &[f64]) -> Vec<Forcing> {
        precip
            .iter()
            .zip(pet)
            .map(|(&precip, &pet)| Forcing { precip, pet })
            .collect()
    }

    // -- step() --

    #[test]
    fn step_returns_finite_values() {
        let p = test_params();
        let ctx = Context::new(&p);
        let mut s = State::initialize(&p, &ctx);
        let f = step(&mut s, &p, &Forcing { precip: 10.0, pet: 3.0 }, &ctx);

        assert!(s.production_store.is_finite());
        assert!(s.routing_store.is_finite());
        assert!(s.exponential_store.is_finite());
        assert!(f.run_off.is_finite());
        assert_eq!(f.production_store, s.production_store);
        assert_eq!(f.routing_store, s.routing_store);
    }

    #[test]
    fn step_non_negative_run_off_under_heavy_pet() {
        let p = test_params();
        let ctx = Context::new(&p);
        let mut s = State::initialize(&p, &ctx);
        let f = step(&mut s, &p, &Forcing { precip: 0.0, pet: 100.0 }, &ctx);
        assert!(f.run_off >= 0.0);
        assert!(f.actual_et >= 0.0);
    }

    #[test]
    fn uh_output_includes_current_input() {
        // x4 = 0.5 gives single-ordinate hydrographs: all routed water
        // leaves on the day it is produced.
        let p = Parameters::new(350.0, 0.0, 90.0, 0.5, 0.0, 5.0).unwrap();
        let ctx = Context::new(&p);
        let mut s = State::initialize(&p, &ctx);
        let f = step(&mut s, &p, &Forcing { precip: 50.0, pet: 0.0 }, &ctx);
        assert!(f.effective_rainfall > 0.0);
        assert_relative_eq!(f.q9, B * f.effective_rainfall, epsilon = 1e-12);
        assert_relative_eq!(f.q1, (1.0 - B) * f.effective_rainfall, epsilon = 1e-12);
    }

    #[test]
    fn total_exchange_adds_up() {
        let p = Parameters::new(350.0, -2.0, 90.0, 1.7, 0.3, 5.0).unwrap();
        let ctx = Context::new(&p);
        let mut s = State::initialize(&p, &ctx);
        let f = step(&mut s, &p, &Forcing { precip: 12.0, pet: 1.0 }, &ctx);
        assert_relative_eq!(
            f.actual_exchange_total,
            f.actual_exchange_routing + f.actual_exchange_direct + f.exchange,
            epsilon = 1e-12
        );
        // F = x2 * (0.5 - x5)
        assert_relative_eq!(f.exchange, -2.0 * (0.5 - 0.3), epsilon = 1e-12);
    }

    // -- run() --

    #[test]
    fn run_output_length_matches_input() {
        let p = test_params();
        let f = forcing(&[10.0, 5.0, 0.0, 15.0, 2.0], &[3.0, 4.0, 5.0, 2.0, 3.5]);
        let result = run(&p, &StoreLevels::default(), &f);
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn run_matches_trait_default() {
        let p = test_params();
        let f = forcing(&[10.0, 0.0, 5.0, 30.0, 0.0, 1.0], &[3.0, 4.0, 5.0, 2.0, 3.5, 4.0]);
        let direct = run(&p, &StoreLevels::default(), &f);
        let via_trait = GR6J::run(&p, &f, None);
        assert_eq!(direct, via_trait);
    }

    #[test]
    fn run_custom_initial_levels() {
        let p = test_params();
        let f = forcing(&[10.0; 5], &[3.0; 5]);
        let default_result = run(&p, &StoreLevels::default(), &f);
        let custom = StoreLevels::new(0.6, 0.7, 10.0).unwrap();
        let custom_result = run(&p, &custom, &f);
        assert_ne!(default_result.run_off[0], custom_result.run_off[0]);
    }

    #[test]
    fn run_keeps_stores_within_capacity() {
        let p = Parameters::new(120.0, 3.0, 40.0, 3.2, -1.0, 2.0).unwrap();
        let precip = [10.0, 0.0, 85.0, 0.0, 120.0, 0.0, 0.0, 0.0, 15.0, 3.0, 60.0, 0.0];
        let pet = [3.0, 4.0, 5.0, 6.0, 2.0, 5.0, 4.0, 3.0, 2.0, 4.0, 1.0, 7.0];
        let result = run(&p, &StoreLevels::default(), &forcing(&precip, &pet));

        for t in 0..result.len() {
            assert!(result.run_off[t] >= 0.0, "negative run-off at t={t}");
            assert!((0.0..=p.x1).contains(&result.production_store[t]));
            assert!((0.0..=p.x3).contains(&result.routing_store[t]));
            assert!(result.exponential_store[t].is_finite());
        }
    }
}
