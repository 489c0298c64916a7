use ncs_shared::{LoopConfig, Mode, SequenceBuffer, TimeStep, Vector};

use crate::statistics::LoopStatistics;

/// Mutable data of one control loop carried from cycle to cycle
#[derive(Clone, Debug)]
pub struct LoopState {
    pub(crate) true_state: Vector,
    pub(crate) plant_mode: Mode,
    pub(crate) actuator_buffer: SequenceBuffer,
    pub(crate) controller_history: SequenceBuffer,
    pub(crate) statistics: LoopStatistics,
    pub(crate) last_time_step: Option<TimeStep>,
}

impl LoopState {
    pub(crate) fn new(config: &LoopConfig) -> Self {
        Self {
            true_state: config.initial_state.clone(),
            plant_mode: Mode::sentinel(config.sequence_length),
            actuator_buffer: SequenceBuffer::new(
                config.sequence_length,
                config.default_input.clone(),
            ),
            controller_history: SequenceBuffer::new(
                config.sequence_length,
                config.default_input.clone(),
            ),
            statistics: LoopStatistics::with_horizon(config.horizon),
            last_time_step: None,
        }
    }

    /// True plant state after the last completed cycle
    pub fn true_state(&self) -> &Vector {
        &self.true_state
    }

    /// Mode applied in the last completed cycle
    pub fn plant_mode(&self) -> Mode {
        self.plant_mode
    }

    pub fn actuator_buffer(&self) -> &SequenceBuffer {
        &self.actuator_buffer
    }

    /// Sequences the controller sent, by age
    pub fn controller_history(&self) -> &SequenceBuffer {
        &self.controller_history
    }

    pub fn statistics(&self) -> &LoopStatistics {
        &self.statistics
    }

    pub fn last_time_step(&self) -> Option<TimeStep> {
        self.last_time_step
    }
}
