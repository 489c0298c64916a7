use thiserror::Error;

use crate::types::{Role, TimeStep};

/// Errors raised when a message travels along a route the loop does not have
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// Source/destination pair is not one of the legal routes
    #[error("Illegal route {source_role:?} -> {destination_role:?}. Legal routes are Sensor -> Controller, Controller -> Actuator and Actuator -> Controller")]
    IllegalRoute { source_role: Role, destination_role: Role },

    /// Message claims to originate after the current time step
    #[error("Message {source_role:?} -> {destination_role:?} originated at time step {origin_time_step}, after the current time step {current_time_step}. This indicates a bug in the producer")]
    NegativeDelay {
        source_role: Role,
        destination_role: Role,
        origin_time_step: TimeStep,
        current_time_step: TimeStep,
    },
}

/// Errors raised when a message on a legal route is malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Actuator -> Controller traffic must be an acknowledgement
    #[error("Actuator -> Controller message originating at time step {origin_time_step} is not flagged as an acknowledgement")]
    UnflaggedAcknowledgement { origin_time_step: TimeStep },

    /// Only Actuator -> Controller traffic may be flagged as an acknowledgement
    #[error("Message {source_role:?} -> {destination_role:?} is flagged as an acknowledgement, but only the actuator acknowledges")]
    UnexpectedAcknowledgementFlag { source_role: Role, destination_role: Role },

    /// Payload does not match what the route carries
    #[error("Message {source_role:?} -> {destination_role:?} carries a {found} payload, expected a {expected} payload")]
    PayloadMismatch {
        source_role: Role,
        destination_role: Role,
        expected: &'static str,
        found: &'static str,
    },

    /// Acknowledgement references a sequence newer than the acknowledgement itself
    #[error("Acknowledgement sent at time step {origin_time_step} echoes sequence time step {acknowledged_time_step}, which lies in its future")]
    AcknowledgementFromFuture {
        origin_time_step: TimeStep,
        acknowledged_time_step: TimeStep,
    },
}

/// General routing-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Routing error
    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
