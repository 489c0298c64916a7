use crate::{
    collaborators::error::EstimatorError,
    mode::Mode,
    sequence_buffer::ModeInputs,
    types::{TimeStep, Vector},
};

/// A measurement together with the number of cycles it spent in transit
#[derive(Clone, Debug, PartialEq)]
pub struct DelayedMeasurement {
    pub value: Vector,
    pub delay: TimeStep,
}

/// The mode the plant was in `delay` cycles ago, as revealed by an
/// acknowledgement
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelayedModeObservation {
    pub mode: Mode,
    pub delay: TimeStep,
}

/// How many of the measurements handed to the last update were used
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateCounts {
    pub used: usize,
    pub discarded: usize,
}

/// A state estimator whose numeric update equations are opaque to the loop.
///
/// Every call advances the belief by one time step. `mode_inputs` lists the
/// input the actuator applied during the previous step for each mode the
/// plant might have been in.
pub trait Filter: Send {
    /// Advances the belief without correction
    fn predict(&mut self, mode_inputs: &ModeInputs) -> Result<(), EstimatorError>;

    /// Advances the belief and corrects it with delayed measurements and,
    /// for filters that support them, delayed mode observations
    fn step(
        &mut self,
        mode_inputs: &ModeInputs,
        measurements: &[DelayedMeasurement],
        mode_observations: &[DelayedModeObservation],
    ) -> Result<(), EstimatorError>;

    /// Point estimate of the current plant state
    fn state(&self) -> Vector;

    /// Used/discarded split of the last update, if the filter rejects
    /// measurements on its own
    fn last_update_counts(&self) -> Option<UpdateCounts> {
        None
    }

    /// Whether [`Filter::step`] makes use of mode observations
    fn supports_mode_observations(&self) -> bool {
        false
    }

    /// Estimate of the mode the plant was in during the previous step
    fn previous_mode_estimate(&self) -> Option<Mode> {
        None
    }
}
