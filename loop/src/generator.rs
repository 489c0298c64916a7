use log::debug;

use ncs_shared::{
    ConfigurationError, ControlLaw, ControlSequence, Mode, NetworkType, TimeStep, Vector,
};

use crate::error::{LoopError, MissingModeError};

/// Wraps the control law and checks what it produces
pub struct SequenceGenerator {
    control_law: Box<dyn ControlLaw>,
    network_type: NetworkType,
    sequence_length: usize,
    input_dimension: usize,
}

impl SequenceGenerator {
    pub fn new(
        control_law: Box<dyn ControlLaw>,
        network_type: NetworkType,
        sequence_length: usize,
        input_dimension: usize,
    ) -> Self {
        Self {
            control_law,
            network_type,
            sequence_length,
            input_dimension,
        }
    }

    pub fn control_law(&self) -> &dyn ControlLaw {
        self.control_law.as_ref()
    }

    /// Picks the true previous mode where the network feeds it back, the
    /// estimated one otherwise
    pub fn resolve_previous_mode(
        &self,
        true_mode: Mode,
        estimated_mode: Option<Mode>,
        time_step: TimeStep,
    ) -> Result<Mode, MissingModeError> {
        if self.network_type.provides_true_mode_feedback() {
            return Ok(true_mode);
        }
        estimated_mode.ok_or(MissingModeError {
            time_step,
            network_type: self.network_type,
        })
    }

    /// Computes the sequence to send at `time_step`. `Ok(None)` means the
    /// control law decided that nothing needs to be sent.
    pub fn generate(
        &mut self,
        estimate: &[f64],
        previous_mode: Mode,
        time_step: TimeStep,
    ) -> Result<Option<ControlSequence>, LoopError> {
        let Some(sequence) = self
            .control_law
            .compute_sequence(estimate, previous_mode, time_step)
        else {
            debug!("Control law has nothing to send at time step {}", time_step);
            return Ok(None);
        };

        let found_dimension = sequence
            .inputs()
            .iter()
            .map(Vector::len)
            .find(|dimension| *dimension != self.input_dimension)
            .unwrap_or(self.input_dimension);
        if sequence.len() != self.sequence_length || found_dimension != self.input_dimension {
            return Err(ConfigurationError::SequenceShape {
                expected_length: self.sequence_length,
                found_length: sequence.len(),
                expected_dimension: self.input_dimension,
                found_dimension,
            }
            .into());
        }

        Ok(Some(sequence))
    }

    pub fn set_event_threshold(&mut self, threshold: f64) -> bool {
        self.control_law.set_event_threshold(threshold)
    }

    /// Returns whether the control law took the new length
    pub fn change_sequence_length(&mut self, sequence_length: usize) -> bool {
        if !self.control_law.change_sequence_length(sequence_length) {
            return false;
        }
        self.sequence_length = sequence_length;
        true
    }

    pub fn change_delay_distribution(&mut self, delay_distribution: &[f64]) -> bool {
        self.control_law.change_delay_distribution(delay_distribution)
    }
}
