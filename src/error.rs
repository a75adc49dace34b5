//! Error type shared by the sampler, the model adapters and the statistics helpers.

use thiserror::Error;

/// Everything that can go wrong before or after a sampling run.
///
/// The sampling loop itself never fails; configuration and model problems are
/// reported synchronously when the sampler is built or a run is started.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SamplerError {
    #[error("iterations must be positive")]
    InvalidIterations,
    #[error("initial state {value} has target density {density}; it must be finite and positive")]
    InvalidInitialState { value: f64, density: f64 },
    #[error("proposal step size must be finite and positive, got {0}")]
    InvalidStepSize(f64),
    #[error("invalid model: {0}")]
    InvalidModel(String),
    #[error("sample is empty")]
    EmptySample,
    #[error("statistics error: {0}")]
    Statistics(String),
}
