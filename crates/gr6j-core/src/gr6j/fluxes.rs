//! GR6J flux outputs.
//!
//! `Fluxes` holds a single timestep; the derived `FluxesTimeseries` holds a
//! whole simulation, one vector per field.

use gr6j_macros::Fluxes;

use crate::traits::FluxesTimeseriesOps;

/// Single-timestep fluxes, returned by `step()`. All values in mm/day, store
/// levels in mm at the end of the step.
#[derive(Debug, Clone, Copy, PartialEq, Fluxes)]
pub struct Fluxes {
    pub precip: f64,
    pub pet: f64,
    pub net_rainfall: f64,
    pub storage_infiltration: f64,
    pub actual_et: f64,
    pub percolation: f64,
    /// Pr after percolation, split between the two unit hydrographs.
    pub effective_rainfall: f64,
    /// UH1 output.
    pub q9: f64,
    /// UH2 output.
    pub q1: f64,
    /// Potential intercatchment exchange F.
    pub exchange: f64,
    pub actual_exchange_routing: f64,
    pub actual_exchange_direct: f64,
    pub actual_exchange_total: f64,
    pub qr: f64,
    pub qrexp: f64,
    pub qd: f64,
    pub production_store: f64,
    pub routing_store: f64,
    pub exponential_store: f64,
    pub run_off: f64,
}

impl FluxesTimeseriesOps<Fluxes> for FluxesTimeseries {
    fn with_capacity(n: usize) -> Self {
        FluxesTimeseries::with_capacity(n)
    }

    fn push(&mut self, f: &Fluxes) {
        FluxesTimeseries::push(self, f)
    }

    fn len(&self) -> usize {
        FluxesTimeseries::len(self)
    }

    fn is_empty(&self) -> bool {
        FluxesTimeseries::is_empty(self)
    }
}
