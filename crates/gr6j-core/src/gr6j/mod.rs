/// GR6J, Génie Rural à 6 paramètres Journalier.
///
/// A lumped conceptual daily rainfall-runoff model with 6 parameters,
/// 3 stores and unit hydrograph routing.
pub mod constants;
pub mod fluxes;
pub mod params;
pub mod processes;
pub mod run;
pub mod state;
pub mod unit_hydrographs;

pub use fluxes::{Fluxes, FluxesTimeseries};
pub use params::Parameters;
pub use run::{run, step, Context, GR6J};
pub use state::{State, StoreLevels};
