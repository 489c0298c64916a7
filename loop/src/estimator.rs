use log::{debug, warn};

use ncs_shared::{
    DelayedMeasurement, DelayedModeObservation, EstimatorError, Filter, Message, Mode,
    ModeInputs, NetworkType, SequenceBuffer, TimeStep, Vector,
};

/// Outcome of one estimator cycle
#[derive(Clone, Debug, PartialEq)]
pub struct EstimatorUpdate {
    pub estimate: Vector,
    pub num_used: usize,
    pub num_discarded: usize,
    /// Filter's estimate of the mode during the previous step
    pub previous_mode: Option<Mode>,
}

/// Mode observed through an acknowledgement: `ack_delay` is how long the
/// acknowledgement travelled, `time_since_sent` how long ago the sequence it
/// echoes was sent. The difference recovers the cycles between sending the
/// sequence and applying it.
///
/// Returns `None` if the acknowledgement claims to be older than the
/// sequence it acknowledges.
pub fn observed_mode(ack_delay: TimeStep, time_since_sent: TimeStep) -> Option<usize> {
    time_since_sent
        .checked_sub(ack_delay)
        .map(|elapsed| elapsed as usize + 1)
}

/// Feeds an external filter with whatever this cycle delivered
pub struct EstimatorAdapter {
    filter: Box<dyn Filter>,
    network_type: NetworkType,
    sequence_length: usize,
    default_input: Vector,
    // inputs the actuator may have applied during the step being predicted
    staged_inputs: ModeInputs,
}

impl EstimatorAdapter {
    pub fn new(
        filter: Box<dyn Filter>,
        network_type: NetworkType,
        sequence_length: usize,
        default_input: Vector,
    ) -> Self {
        let staged_inputs = ModeInputs::uniform(&default_input, sequence_length);
        Self {
            filter,
            network_type,
            sequence_length,
            default_input,
            staged_inputs,
        }
    }

    pub fn filter(&self) -> &dyn Filter {
        self.filter.as_ref()
    }

    pub fn estimate(&self) -> Vector {
        self.filter.state()
    }

    pub fn staged_inputs(&self) -> &ModeInputs {
        &self.staged_inputs
    }

    /// Mode observations are only derived when the controller cannot see the
    /// true mode and the filter knows what to do with them
    pub fn uses_mode_observations(&self) -> bool {
        !self.network_type.provides_true_mode_feedback() && self.filter.supports_mode_observations()
    }

    pub fn set_sequence_length(&mut self, sequence_length: usize) {
        self.sequence_length = sequence_length;
        self.staged_inputs = ModeInputs::uniform(&self.default_input, sequence_length);
    }

    /// Advances the filter by one step.
    ///
    /// With measurements or mode observations the filter corrects its
    /// belief in one batched call, otherwise it only predicts. Afterwards the
    /// inputs of the current step are staged from `history`, the controller's
    /// record of sent sequences, for the next prediction.
    pub fn update(
        &mut self,
        measurements: &[Message],
        acknowledgements: &[Message],
        history: &SequenceBuffer,
        current_time_step: TimeStep,
    ) -> Result<EstimatorUpdate, EstimatorError> {
        let delayed_measurements: Vec<DelayedMeasurement> = measurements
            .iter()
            .filter_map(|message| {
                message.measurement_value().map(|value| DelayedMeasurement {
                    value: value.clone(),
                    delay: delay_of(message, current_time_step),
                })
            })
            .collect();

        let mode_observations = if self.uses_mode_observations() {
            self.mode_observations(acknowledgements, current_time_step)
        } else {
            Vec::new()
        };

        let (num_used, num_discarded) =
            if delayed_measurements.is_empty() && mode_observations.is_empty() {
                debug!(
                    "No measurements at time step {}, predicting only",
                    current_time_step
                );
                self.filter.predict(&self.staged_inputs)?;
                (0, 0)
            } else {
                self.filter.step(
                    &self.staged_inputs,
                    &delayed_measurements,
                    &mode_observations,
                )?;
                match self.filter.last_update_counts() {
                    Some(counts) => (counts.used, counts.discarded),
                    None => (delayed_measurements.len(), 0),
                }
            };

        self.staged_inputs = history.mode_inputs();

        Ok(EstimatorUpdate {
            estimate: self.filter.state(),
            num_used,
            num_discarded,
            previous_mode: self.filter.previous_mode_estimate(),
        })
    }

    fn mode_observations(
        &self,
        acknowledgements: &[Message],
        current_time_step: TimeStep,
    ) -> Vec<DelayedModeObservation> {
        let mut observations = Vec::with_capacity(acknowledgements.len());
        for acknowledgement in acknowledgements {
            let Some(acknowledged_time_step) = acknowledgement.acknowledged_time_step() else {
                continue;
            };
            let ack_delay = delay_of(acknowledgement, current_time_step);
            let time_since_sent = current_time_step.saturating_sub(acknowledged_time_step);
            let mode = observed_mode(ack_delay, time_since_sent)
                .and_then(|age| Mode::saturating_from_age(age, self.sequence_length).ok());
            match mode {
                Some(mode) => observations.push(DelayedModeObservation {
                    mode,
                    delay: ack_delay,
                }),
                None => warn!(
                    "Skipping acknowledgement of time step {} received after {} steps, it yields no valid mode",
                    acknowledged_time_step, ack_delay
                ),
            }
        }
        observations
    }
}

fn delay_of(message: &Message, current_time_step: TimeStep) -> TimeStep {
    message
        .delay()
        .unwrap_or_else(|| current_time_step.saturating_sub(message.origin_time_step()))
}
