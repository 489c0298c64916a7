//! # NCS Shared
//! Messages, routing, sequence buffering and collaborator interfaces shared
//! by the sensor, controller and actuator of a networked control loop.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod collaborators;
mod config;
mod messages;
mod mode;
mod sequence_buffer;
mod types;

pub use collaborators::{
    control_law::ControlLaw,
    error::EstimatorError,
    filter::{DelayedMeasurement, DelayedModeObservation, Filter, UpdateCounts},
    plant::Plant,
    sensor::Sensor,
};
pub use config::{
    ConfigurationError, LoopConfig, ParamOverrides, ParamValue, DELAY_DISTRIBUTION_KEY,
    EVENT_THRESHOLD_KEY, SEQUENCE_LENGTH_KEY,
};
pub use messages::{
    error::{ProtocolError, RouterError, RoutingError},
    message::{ControlSequence, Message, Payload},
    router::{MessageRouter, RoutedMessages},
};
pub use mode::{Mode, ModeError};
pub use sequence_buffer::{AcceptOutcome, ModeInputs, SequenceBuffer, SequenceSlot};
pub use types::{norm, InstanceId, NetworkType, Role, Tick, TimeStep, Vector};
