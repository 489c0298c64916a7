use thiserror::Error;

use ncs_shared::{
    ConfigurationError, EstimatorError, ModeError, NetworkType, RouterError, Tick, TimeStep,
};

/// Errors that can occur when a timestamp is converted into a time step
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTimestampError {
    /// Timestamp does not fall on a sampling instant
    #[error("Timestamp {timestamp} is not a multiple of the sampling interval of {sampling_interval_ticks} ticks")]
    NotAligned {
        timestamp: Tick,
        sampling_interval_ticks: Tick,
    },

    /// Timestamp does not advance past the last processed cycle
    #[error("Time step {time_step} does not advance past the last processed time step {last_time_step}")]
    NotMonotonic {
        time_step: TimeStep,
        last_time_step: TimeStep,
    },
}

/// Sequence generation needs the previous mode, but neither the network nor
/// the estimator supplied it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No previous mode available at time step {time_step}: {network_type:?} network provides no true mode feedback and the filter produced no mode estimate")]
pub struct MissingModeError {
    pub time_step: TimeStep,
    pub network_type: NetworkType,
}

/// Everything a control loop cycle can fail with
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoopError {
    /// Routing or protocol error
    #[error("Router error: {0}")]
    Router(#[from] RouterError),

    /// Timestamp error
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(#[from] InvalidTimestampError),

    /// Estimator error
    #[error("Estimator error: {0}")]
    Estimator(#[from] EstimatorError),

    /// Missing mode error
    #[error("Missing mode: {0}")]
    MissingMode(#[from] MissingModeError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Mode error
    #[error("Mode error: {0}")]
    Mode(#[from] ModeError),
}
