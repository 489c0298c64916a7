use std::sync::{Arc, Mutex};

use ncs_shared::{norm, ControlLaw, ControlSequence, Mode, TimeStep, Vector};

/// Shared record of the previous modes a control law was conditioned on
#[derive(Clone, Debug, Default)]
pub struct ModeLog {
    modes: Arc<Mutex<Vec<(TimeStep, Mode)>>>,
}

impl ModeLog {
    pub fn modes(&self) -> Vec<(TimeStep, Mode)> {
        self.modes
            .lock()
            .map(|modes| modes.clone())
            .unwrap_or_default()
    }

    fn push(&self, time_step: TimeStep, mode: Mode) {
        if let Ok(mut modes) = self.modes.lock() {
            modes.push((time_step, mode));
        }
    }
}

/// State feedback u = -K (x - r), repeated over the whole sequence
pub struct ConstantGainLaw {
    gain: Vec<Vector>,
    reference: Vector,
    sequence_length: usize,
    resizable: bool,
    mode_log: ModeLog,
}

impl ConstantGainLaw {
    pub fn new(gain: Vec<Vector>, reference: Vector, sequence_length: usize) -> Self {
        Self {
            gain,
            reference,
            sequence_length,
            resizable: false,
            mode_log: ModeLog::default(),
        }
    }

    pub fn scalar(gain: f64, sequence_length: usize) -> Self {
        Self::new(vec![vec![gain]], vec![0.0], sequence_length)
    }

    /// Allows the sequence length to change at runtime
    pub fn resizable(mut self) -> Self {
        self.resizable = true;
        self
    }

    pub fn mode_log(&self) -> ModeLog {
        self.mode_log.clone()
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    fn error(&self, state: &[f64]) -> Vector {
        state
            .iter()
            .zip(&self.reference)
            .map(|(x, r)| x - r)
            .collect()
    }

    fn input(&self, state: &[f64]) -> Vector {
        let error = self.error(state);
        self.gain
            .iter()
            .map(|row| -row.iter().zip(&error).map(|(k, e)| k * e).sum::<f64>())
            .collect()
    }
}

impl ControlLaw for ConstantGainLaw {
    fn compute_sequence(
        &mut self,
        estimate: &[f64],
        previous_mode: Mode,
        time_step: TimeStep,
    ) -> Option<ControlSequence> {
        self.mode_log.push(time_step, previous_mode);
        Some(ControlSequence::constant(
            &self.input(estimate),
            self.sequence_length,
        ))
    }

    fn control_error(&self, state: &[f64], _time_step: TimeStep) -> Vector {
        self.error(state)
    }

    fn stage_cost(&self, state: &[f64], input: &[f64], _time_step: TimeStep) -> f64 {
        let error = norm(&self.error(state));
        let effort = norm(input);
        error * error + effort * effort
    }

    fn change_sequence_length(&mut self, sequence_length: usize) -> bool {
        if self.resizable {
            self.sequence_length = sequence_length;
        }
        self.resizable
    }
}

/// [`ConstantGainLaw`] that only transmits when the estimate moved at least
/// `threshold` away from the one the last sequence was computed for
pub struct EventTriggeredLaw {
    inner: ConstantGainLaw,
    threshold: f64,
    last_basis: Option<Vector>,
    delay_distribution: Option<Vec<f64>>,
}

impl EventTriggeredLaw {
    pub fn new(inner: ConstantGainLaw, threshold: f64) -> Self {
        Self {
            inner,
            threshold,
            last_basis: None,
            delay_distribution: None,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn mode_log(&self) -> ModeLog {
        self.inner.mode_log()
    }

    pub fn delay_distribution(&self) -> Option<&[f64]> {
        self.delay_distribution.as_deref()
    }
}

impl ControlLaw for EventTriggeredLaw {
    fn compute_sequence(
        &mut self,
        estimate: &[f64],
        previous_mode: Mode,
        time_step: TimeStep,
    ) -> Option<ControlSequence> {
        if let Some(basis) = &self.last_basis {
            let difference: Vector = estimate.iter().zip(basis).map(|(x, y)| x - y).collect();
            if norm(&difference) < self.threshold {
                self.inner.mode_log.push(time_step, previous_mode);
                return None;
            }
        }
        self.last_basis = Some(estimate.to_vec());
        self.inner
            .compute_sequence(estimate, previous_mode, time_step)
    }

    fn control_error(&self, state: &[f64], time_step: TimeStep) -> Vector {
        self.inner.control_error(state, time_step)
    }

    fn stage_cost(&self, state: &[f64], input: &[f64], time_step: TimeStep) -> f64 {
        self.inner.stage_cost(state, input, time_step)
    }

    fn set_event_threshold(&mut self, threshold: f64) -> bool {
        self.threshold = threshold;
        true
    }

    fn change_sequence_length(&mut self, sequence_length: usize) -> bool {
        self.inner.change_sequence_length(sequence_length)
    }

    fn change_delay_distribution(&mut self, delay_distribution: &[f64]) -> bool {
        self.delay_distribution = Some(delay_distribution.to_vec());
        true
    }
}
