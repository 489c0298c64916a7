use crate::{
    messages::message::ControlSequence,
    mode::Mode,
    types::{TimeStep, Vector},
};

/// Computes control sequences. The optimization behind it is opaque to the
/// loop.
pub trait ControlLaw: Send {
    /// Computes the sequence to transmit at `time_step`, or `None` when
    /// nothing should be sent
    fn compute_sequence(
        &mut self,
        estimate: &[f64],
        previous_mode: Mode,
        time_step: TimeStep,
    ) -> Option<ControlSequence>;

    /// Deviation of `state` from the reference at `time_step`
    fn control_error(&self, state: &[f64], time_step: TimeStep) -> Vector;

    /// Cost incurred by applying `input` in `state` at `time_step`
    fn stage_cost(&self, state: &[f64], input: &[f64], time_step: TimeStep) -> f64;

    /// Returns false if this control law is not event-triggered
    fn set_event_threshold(&mut self, _threshold: f64) -> bool {
        false
    }

    /// Returns false if the sequence length cannot change at runtime
    fn change_sequence_length(&mut self, _sequence_length: usize) -> bool {
        false
    }

    /// Returns false if the control law does not use a delay distribution
    fn change_delay_distribution(&mut self, _delay_distribution: &[f64]) -> bool {
        false
    }
}
