use crate::error::ConfigurationError;

/// Core trait for a lumped daily model.
///
/// Implementors supply the pieces (context, initial state, one step); the
/// default `run` drives them over a forcing series.
pub trait HydrologicalModel {
    type Params;
    type State: Clone;
    type Forcing: Copy;
    type Fluxes;
    type FluxesTimeseries: FluxesTimeseriesOps<Self::Fluxes>;
    /// Precomputed context derived from params, constant for a given run.
    type Context;

    /// Precompute any run-constant data from parameters (e.g., UH ordinates).
    fn prepare(params: &Self::Params) -> Self::Context;

    /// Create the default initial state.
    fn initialize_state(params: &Self::Params, context: &Self::Context) -> Self::State;

    /// Execute one timestep, advancing `state` in place.
    fn step(
        state: &mut Self::State,
        params: &Self::Params,
        forcing: &Self::Forcing,
        context: &Self::Context,
    ) -> Self::Fluxes;

    /// Run the model over a forcing timeseries.
    ///
    /// The state is private to this call: it is either the default one or a
    /// clone of `initial_state`.
    fn run(
        params: &Self::Params,
        forcing: &[Self::Forcing],
        initial_state: Option<&Self::State>,
    ) -> Self::FluxesTimeseries {
        let context = Self::prepare(params);
        let mut state = match initial_state {
            Some(s) => s.clone(),
            None => Self::initialize_state(params, &context),
        };

        let mut outputs = Self::FluxesTimeseries::with_capacity(forcing.len());
        for f in forcing {
            let fluxes = Self::step(&mut state, params, f, &context);
            outputs.push(&fluxes);
        }

        outputs
    }
}

/// Operations required on the timeseries collection type.
///
/// Implemented by the `Fluxes` derive.
pub trait FluxesTimeseriesOps<F> {
    fn with_capacity(n: usize) -> Self;
    fn push(&mut self, f: &F);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
}

/// A fixed-size, validated parameter vector.
pub trait ModelParams: Sized + Copy {
    const N_PARAMS: usize;
    const PARAM_NAMES: &'static [&'static str];

    /// Build from values in `PARAM_NAMES` order, validating each one.
    fn from_array(arr: &[f64]) -> Result<Self, ConfigurationError>;

    fn to_array(&self) -> Vec<f64>;

    /// Look a value up by name.
    fn get(&self, name: &str) -> Option<f64> {
        Self::PARAM_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.to_array()[i])
    }
}
