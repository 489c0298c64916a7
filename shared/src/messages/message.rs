use crate::types::{Role, TimeStep, Vector};

/// A time-ordered list of inputs computed at one time step, to be applied
/// at the following steps while no newer sequence is available
#[derive(Clone, Debug, PartialEq)]
pub struct ControlSequence {
    inputs: Vec<Vector>,
}

impl ControlSequence {
    pub fn new(inputs: Vec<Vector>) -> Self {
        Self { inputs }
    }

    /// Builds a sequence that repeats one input `length` times
    pub fn constant(input: &[f64], length: usize) -> Self {
        Self {
            inputs: vec![input.to_vec(); length],
        }
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Input at the 1-based `position` within the sequence
    pub fn input(&self, position: usize) -> Option<&Vector> {
        position.checked_sub(1).and_then(|index| self.inputs.get(index))
    }

    pub fn inputs(&self) -> &[Vector] {
        &self.inputs
    }
}

/// What a Message carries
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Measurement(Vector),
    ControlSequence(ControlSequence),
    /// Echo of the origin time step of the acknowledged control sequence
    Acknowledgement(TimeStep),
}

impl Payload {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Payload::Measurement(_) => "measurement",
            Payload::ControlSequence(_) => "control sequence",
            Payload::Acknowledgement(_) => "acknowledgement",
        }
    }
}

/// An addressed, timestamped unit exchanged between the participants of a
/// control loop. The delay is unknown until the Router stamps it in the
/// cycle the message is delivered.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    source: Role,
    destination: Role,
    origin_time_step: TimeStep,
    payload: Payload,
    is_acknowledgement: bool,
    delay: Option<TimeStep>,
}

impl Message {
    pub fn new(
        source: Role,
        destination: Role,
        origin_time_step: TimeStep,
        payload: Payload,
        is_acknowledgement: bool,
    ) -> Self {
        Self {
            source,
            destination,
            origin_time_step,
            payload,
            is_acknowledgement,
            delay: None,
        }
    }

    pub fn measurement(origin_time_step: TimeStep, measurement: Vector) -> Self {
        Self::new(
            Role::Sensor,
            Role::Controller,
            origin_time_step,
            Payload::Measurement(measurement),
            false,
        )
    }

    pub fn control_sequence(origin_time_step: TimeStep, sequence: ControlSequence) -> Self {
        Self::new(
            Role::Controller,
            Role::Actuator,
            origin_time_step,
            Payload::ControlSequence(sequence),
            false,
        )
    }

    /// Acknowledgement sent by the actuator at `origin_time_step` for the
    /// sequence that originated at `acknowledged_time_step`
    pub fn acknowledgement(origin_time_step: TimeStep, acknowledged_time_step: TimeStep) -> Self {
        Self::new(
            Role::Actuator,
            Role::Controller,
            origin_time_step,
            Payload::Acknowledgement(acknowledged_time_step),
            true,
        )
    }

    pub fn source(&self) -> Role {
        self.source
    }

    pub fn destination(&self) -> Role {
        self.destination
    }

    pub fn origin_time_step(&self) -> TimeStep {
        self.origin_time_step
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    pub fn is_acknowledgement(&self) -> bool {
        self.is_acknowledgement
    }

    /// Delay stamped by the Router, `None` before routing
    pub fn delay(&self) -> Option<TimeStep> {
        self.delay
    }

    pub(crate) fn set_delay(&mut self, delay: TimeStep) {
        self.delay = Some(delay);
    }

    pub fn measurement_value(&self) -> Option<&Vector> {
        match &self.payload {
            Payload::Measurement(value) => Some(value),
            _ => None,
        }
    }

    pub fn control_sequence_value(&self) -> Option<&ControlSequence> {
        match &self.payload {
            Payload::ControlSequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    pub fn acknowledged_time_step(&self) -> Option<TimeStep> {
        match &self.payload {
            Payload::Acknowledgement(time_step) => Some(*time_step),
            _ => None,
        }
    }
}
