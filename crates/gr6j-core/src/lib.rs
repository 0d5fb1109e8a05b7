/// gr6j-core: the GR6J daily rainfall-runoff model with Latin-hypercube
/// calibration.
///
/// Direct runs go through [`model::Model`], calibration batches through
/// [`calibration::Calibration`]. The library logs through the `log` facade
/// and installs no logger.
pub mod calibration;
pub mod catchment;
pub mod error;
pub mod forcing;
pub mod gr6j;
pub mod metrics;
pub mod model;
pub mod period;
pub mod runoff;
pub mod traits;

pub use calibration::{Calibration, CalibrationInputs, CalibrationResult, CatchmentRanges};
pub use catchment::CatchmentUnit;
pub use error::{ConfigurationError, DataError, Gr6jError, MetricError};
pub use gr6j::{Parameters, StoreLevels};
pub use model::{Model, ModelInputs, ModelOutputs};
pub use period::ModelPeriod;
pub use runoff::RunOffUnit;
