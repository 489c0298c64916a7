use crate::types::Vector;

/// The physical system under control. Its numerical integration is opaque
/// to the loop.
pub trait Plant: Send {
    /// Sets the input applied during the next call to [`Plant::simulate`]
    fn set_input(&mut self, input: &[f64]);

    /// Advances `state` by one sampling interval
    fn simulate(&mut self, state: &[f64]) -> Vector;

    /// Whether `state` lies within the admissible region
    fn is_valid_state(&self, state: &[f64]) -> bool {
        state.iter().all(|value| value.is_finite())
    }
}
