use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{InstanceId, NetworkType, Tick, Vector};

pub const EVENT_THRESHOLD_KEY: &str = "eventThreshold";
pub const SEQUENCE_LENGTH_KEY: &str = "sequenceLength";
pub const DELAY_DISTRIBUTION_KEY: &str = "delayDistribution";

const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Errors raised when a control loop is assembled or reconfigured wrongly
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A collaborator was never provided
    #[error("Control loop is missing its {component}. Provide it before the first step")]
    MissingComponent { component: &'static str },

    /// Sequence length must be positive
    #[error("Sequence length must be at least 1")]
    ZeroSequenceLength,

    /// Sampling interval must be positive
    #[error("Sampling interval must be at least 1 tick")]
    ZeroSamplingInterval,

    /// A vector-valued setting was left empty
    #[error("Configuration field {field} must not be empty")]
    EmptyVector { field: &'static str },

    /// Override value is outside of its admissible range
    #[error("Parameter override {key} is invalid: {reason}")]
    InvalidOverride { key: &'static str, reason: String },

    /// Override value has the wrong type for its key
    #[error("Parameter override {key} expects a {expected} value")]
    OverrideType {
        key: &'static str,
        expected: &'static str,
    },

    /// Control law produced a sequence that does not fit the loop
    #[error("Control sequence of {found_length} inputs of dimension {found_dimension} does not match the configured {expected_length} inputs of dimension {expected_dimension}")]
    SequenceShape {
        expected_length: usize,
        found_length: usize,
        expected_dimension: usize,
        found_dimension: usize,
    },

    /// No instance registered under the id
    #[error("No control loop instance registered as {instance:?}")]
    UnknownInstance { instance: InstanceId },

    /// Instance id already taken
    #[error("A control loop instance is already registered as {instance:?}")]
    DuplicateInstance { instance: InstanceId },
}

/// Contains Config properties which will be used by one control loop
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoopConfig {
    /// Number of inputs in every control sequence, N
    pub sequence_length: usize,
    /// Ticks per sampling interval, used to turn timestamps into time steps
    pub sampling_interval_ticks: Tick,
    /// Determines whether the controller learns the true previous mode
    pub network_type: NetworkType,
    /// Input applied while no buffered sequence is available
    pub default_input: Vector,
    /// True plant state at initialization
    pub initial_state: Vector,
    /// Number of cycles to preallocate statistics for
    pub horizon: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            sequence_length: 3,
            sampling_interval_ticks: 1,
            network_type: NetworkType::TcpLike,
            default_input: vec![0.0],
            initial_state: vec![0.0],
            horizon: 0,
        }
    }
}

impl LoopConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.sequence_length == 0 {
            return Err(ConfigurationError::ZeroSequenceLength);
        }
        if self.sampling_interval_ticks == 0 {
            return Err(ConfigurationError::ZeroSamplingInterval);
        }
        if self.default_input.is_empty() {
            return Err(ConfigurationError::EmptyVector {
                field: "default_input",
            });
        }
        if self.initial_state.is_empty() {
            return Err(ConfigurationError::EmptyVector {
                field: "initial_state",
            });
        }
        Ok(())
    }
}

/// Loosely typed value of a parameter override given as a key/value pair
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Scalar(f64),
    Integer(u64),
    Vector(Vec<f64>),
}

/// Sparse per-cycle parameter changes.
///
/// Only the recognized keys exist; unknown keys are ignored when parsing.
/// Whether a recognized key has an effect depends on the collaborators of
/// the loop, an unsupported one is a no-op.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParamOverrides {
    /// Deviation threshold of event-triggered sensors and controllers
    pub event_threshold: Option<f64>,
    /// New control sequence length N
    pub sequence_length: Option<usize>,
    /// Probabilities of the control packet delays
    pub delay_distribution: Option<Vec<f64>>,
}

impl ParamOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_threshold(mut self, event_threshold: f64) -> Self {
        self.event_threshold = Some(event_threshold);
        self
    }

    pub fn with_sequence_length(mut self, sequence_length: usize) -> Self {
        self.sequence_length = Some(sequence_length);
        self
    }

    pub fn with_delay_distribution(mut self, delay_distribution: Vec<f64>) -> Self {
        self.delay_distribution = Some(delay_distribution);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.event_threshold.is_none()
            && self.sequence_length.is_none()
            && self.delay_distribution.is_none()
    }

    /// Builds overrides from key/value pairs, skipping unknown keys
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (&'a str, ParamValue)>,
    {
        let mut overrides = Self::new();
        for (key, value) in pairs {
            match key {
                EVENT_THRESHOLD_KEY => {
                    overrides.event_threshold = Some(match value {
                        ParamValue::Scalar(threshold) => threshold,
                        ParamValue::Integer(threshold) => threshold as f64,
                        ParamValue::Vector(_) => {
                            return Err(ConfigurationError::OverrideType {
                                key: EVENT_THRESHOLD_KEY,
                                expected: "scalar",
                            })
                        }
                    });
                }
                SEQUENCE_LENGTH_KEY => {
                    let ParamValue::Integer(length) = value else {
                        return Err(ConfigurationError::OverrideType {
                            key: SEQUENCE_LENGTH_KEY,
                            expected: "integer",
                        });
                    };
                    overrides.sequence_length = Some(length as usize);
                }
                DELAY_DISTRIBUTION_KEY => {
                    let ParamValue::Vector(distribution) = value else {
                        return Err(ConfigurationError::OverrideType {
                            key: DELAY_DISTRIBUTION_KEY,
                            expected: "vector",
                        });
                    };
                    overrides.delay_distribution = Some(distribution);
                }
                unknown => {
                    info!("Ignoring unknown parameter override {:?}", unknown);
                }
            }
        }
        overrides.validate()?;
        Ok(overrides)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(threshold) = self.event_threshold {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(ConfigurationError::InvalidOverride {
                    key: EVENT_THRESHOLD_KEY,
                    reason: format!("{} is not a non-negative scalar", threshold),
                });
            }
        }
        if self.sequence_length == Some(0) {
            return Err(ConfigurationError::InvalidOverride {
                key: SEQUENCE_LENGTH_KEY,
                reason: "sequence length must be positive".to_string(),
            });
        }
        if let Some(distribution) = &self.delay_distribution {
            if distribution
                .iter()
                .any(|probability| !probability.is_finite() || *probability < 0.0)
            {
                return Err(ConfigurationError::InvalidOverride {
                    key: DELAY_DISTRIBUTION_KEY,
                    reason: "probabilities must be non-negative".to_string(),
                });
            }
            let total: f64 = distribution.iter().sum();
            if total > 1.0 + PROBABILITY_TOLERANCE {
                return Err(ConfigurationError::InvalidOverride {
                    key: DELAY_DISTRIBUTION_KEY,
                    reason: format!("probabilities sum to {}, more than 1", total),
                });
            }
        }
        Ok(())
    }
}
