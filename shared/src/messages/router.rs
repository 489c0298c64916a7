use std::mem;

use log::debug;

use crate::{
    messages::{
        error::{ProtocolError, RouterError, RoutingError},
        message::{Message, Payload},
    },
    types::{Role, TimeStep},
};

/// Messages of one cycle, grouped by consumer, each stamped with its delay.
/// Within a group, delivery order is preserved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoutedMessages {
    /// Sensor -> Controller
    pub measurements: Vec<Message>,
    /// Controller -> Actuator
    pub control_sequences: Vec<Message>,
    /// Actuator -> Controller
    pub acknowledgements: Vec<Message>,
}

impl RoutedMessages {
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
            && self.control_sequences.is_empty()
            && self.acknowledgements.is_empty()
    }

    pub fn measurement_delays(&self) -> Vec<TimeStep> {
        delays_of(&self.measurements)
    }

    pub fn control_sequence_delays(&self) -> Vec<TimeStep> {
        delays_of(&self.control_sequences)
    }

    pub fn acknowledgement_delays(&self) -> Vec<TimeStep> {
        delays_of(&self.acknowledgements)
    }
}

fn delays_of(messages: &[Message]) -> Vec<TimeStep> {
    messages.iter().filter_map(Message::delay).collect()
}

/// Classifies and validates the inbound messages of a control loop instance
#[derive(Debug, Default)]
pub struct MessageRouter {
    dropped_sensor_messages: usize,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self {
            dropped_sensor_messages: 0,
        }
    }

    /// Number of Sensor-addressed messages dropped since creation
    pub fn dropped_sensor_messages(&self) -> usize {
        self.dropped_sensor_messages
    }

    /// Consumes the inbound queue, leaving it empty, and groups its messages
    /// for the controller and the actuator.
    ///
    /// Messages addressed to the sensor are accepted and dropped. The first
    /// illegal or malformed message aborts routing.
    pub fn route(
        &mut self,
        inbound: &mut Vec<Message>,
        current_time_step: TimeStep,
    ) -> Result<RoutedMessages, RouterError> {
        let mut routed = RoutedMessages::default();

        for mut message in mem::take(inbound) {
            let source_role = message.source();
            let destination_role = message.destination();

            if destination_role == Role::Sensor {
                debug!(
                    "Dropping {} from {:?} addressed to the sensor",
                    message.payload().kind_name(),
                    source_role
                );
                self.dropped_sensor_messages += 1;
                continue;
            }

            match (source_role, destination_role) {
                (Role::Sensor, Role::Controller) => {
                    Self::check_not_flagged(&message)?;
                    Self::check_payload(&message, "measurement")?;
                }
                (Role::Controller, Role::Actuator) => {
                    Self::check_not_flagged(&message)?;
                    Self::check_payload(&message, "control sequence")?;
                }
                (Role::Actuator, Role::Controller) => {
                    if !message.is_acknowledgement() {
                        return Err(ProtocolError::UnflaggedAcknowledgement {
                            origin_time_step: message.origin_time_step(),
                        }
                        .into());
                    }
                    Self::check_payload(&message, "acknowledgement")?;
                    if let Payload::Acknowledgement(acknowledged_time_step) = message.payload() {
                        if *acknowledged_time_step > message.origin_time_step() {
                            return Err(ProtocolError::AcknowledgementFromFuture {
                                origin_time_step: message.origin_time_step(),
                                acknowledged_time_step: *acknowledged_time_step,
                            }
                            .into());
                        }
                    }
                }
                _ => {
                    return Err(RoutingError::IllegalRoute {
                        source_role,
                        destination_role,
                    }
                    .into());
                }
            }

            let origin_time_step = message.origin_time_step();
            if origin_time_step > current_time_step {
                return Err(RoutingError::NegativeDelay {
                    source_role,
                    destination_role,
                    origin_time_step,
                    current_time_step,
                }
                .into());
            }
            message.set_delay(current_time_step - origin_time_step);

            match destination_role {
                Role::Actuator => routed.control_sequences.push(message),
                _ if message.is_acknowledgement() => routed.acknowledgements.push(message),
                _ => routed.measurements.push(message),
            }
        }

        Ok(routed)
    }

    fn check_not_flagged(message: &Message) -> Result<(), ProtocolError> {
        if message.is_acknowledgement() {
            return Err(ProtocolError::UnexpectedAcknowledgementFlag {
                source_role: message.source(),
                destination_role: message.destination(),
            });
        }
        Ok(())
    }

    fn check_payload(message: &Message, expected: &'static str) -> Result<(), ProtocolError> {
        let found = message.payload().kind_name();
        if found != expected {
            return Err(ProtocolError::PayloadMismatch {
                source_role: message.source(),
                destination_role: message.destination(),
                expected,
                found,
            });
        }
        Ok(())
    }
}
