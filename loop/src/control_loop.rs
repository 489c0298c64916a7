use log::info;

use ncs_shared::{
    norm, ConfigurationError, ControlLaw, Filter, LoopConfig, Message, MessageRouter, Mode,
    ParamOverrides, Plant, Sensor, Tick, TimeStep,
};

use crate::{
    error::{InvalidTimestampError, LoopError},
    estimator::EstimatorAdapter,
    generator::SequenceGenerator,
    loop_state::LoopState,
    statistics::{CycleStatistics, LoopStatistics},
};

/// Stage of the per-cycle state machine. A loop rests in `Idle` between
/// cycles; after a failed cycle it stays in the stage that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CyclePhase {
    Idle,
    Routing,
    Estimating,
    SequenceResolution,
    PlantAdvance,
    SequenceGeneration,
    Reporting,
}

/// Result of one completed cycle
#[derive(Clone, Debug, PartialEq)]
pub struct CycleOutput {
    /// Acknowledgement, measurement and control sequence, in this order,
    /// each only if sent
    pub messages: Vec<Message>,
    /// Norm of the actual control error
    pub quality_of_control: f64,
    pub statistics: CycleStatistics,
}

/// Assembles a [`ControlLoop`] from its configuration and collaborators
pub struct ControlLoopBuilder {
    config: LoopConfig,
    plant: Option<Box<dyn Plant>>,
    sensor: Option<Box<dyn Sensor>>,
    filter: Option<Box<dyn Filter>>,
    control_law: Option<Box<dyn ControlLaw>>,
}

impl ControlLoopBuilder {
    pub fn new(config: LoopConfig) -> Self {
        Self {
            config,
            plant: None,
            sensor: None,
            filter: None,
            control_law: None,
        }
    }

    pub fn plant<P: Plant + 'static>(mut self, plant: P) -> Self {
        self.plant = Some(Box::new(plant));
        self
    }

    pub fn sensor<S: Sensor + 'static>(mut self, sensor: S) -> Self {
        self.sensor = Some(Box::new(sensor));
        self
    }

    pub fn filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn control_law<C: ControlLaw + 'static>(mut self, control_law: C) -> Self {
        self.control_law = Some(Box::new(control_law));
        self
    }

    pub fn build(self) -> Result<ControlLoop, ConfigurationError> {
        self.config.validate()?;
        let plant = self
            .plant
            .ok_or(ConfigurationError::MissingComponent { component: "plant" })?;
        let sensor = self
            .sensor
            .ok_or(ConfigurationError::MissingComponent { component: "sensor" })?;
        let filter = self
            .filter
            .ok_or(ConfigurationError::MissingComponent { component: "filter" })?;
        let control_law = self.control_law.ok_or(ConfigurationError::MissingComponent {
            component: "control law",
        })?;

        let config = self.config;
        let estimator = EstimatorAdapter::new(
            filter,
            config.network_type,
            config.sequence_length,
            config.default_input.clone(),
        );
        let generator = SequenceGenerator::new(
            control_law,
            config.network_type,
            config.sequence_length,
            config.default_input.len(),
        );
        let state = LoopState::new(&config);

        Ok(ControlLoop {
            config,
            router: MessageRouter::new(),
            plant,
            sensor,
            estimator,
            generator,
            state,
            phase: CyclePhase::Idle,
        })
    }
}

/// One networked control loop: sensor, controller and actuator of a single
/// plant, advanced one sampling instant per [`ControlLoop::step`].
///
/// A failed step leaves the loop in an unspecified state; the caller has to
/// discard or rebuild it.
pub struct ControlLoop {
    config: LoopConfig,
    router: MessageRouter,
    plant: Box<dyn Plant>,
    sensor: Box<dyn Sensor>,
    estimator: EstimatorAdapter,
    generator: SequenceGenerator,
    state: LoopState,
    phase: CyclePhase,
}

impl ControlLoop {
    pub fn builder(config: LoopConfig) -> ControlLoopBuilder {
        ControlLoopBuilder::new(config)
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn statistics(&self) -> &LoopStatistics {
        &self.state.statistics
    }

    pub fn into_statistics(self) -> LoopStatistics {
        self.state.statistics
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    pub fn estimator(&self) -> &EstimatorAdapter {
        &self.estimator
    }

    /// Converts a timestamp into a time step, rejecting timestamps between
    /// sampling instants and ones that do not move forward
    pub fn time_step_for(&self, timestamp: Tick) -> Result<TimeStep, InvalidTimestampError> {
        let sampling_interval_ticks = self.config.sampling_interval_ticks;
        if timestamp % sampling_interval_ticks != 0 {
            return Err(InvalidTimestampError::NotAligned {
                timestamp,
                sampling_interval_ticks,
            });
        }
        let time_step = timestamp / sampling_interval_ticks;
        if let Some(last_time_step) = self.state.last_time_step {
            if time_step <= last_time_step {
                return Err(InvalidTimestampError::NotMonotonic {
                    time_step,
                    last_time_step,
                });
            }
        }
        Ok(time_step)
    }

    /// Runs one full cycle on the messages delivered to this loop, consuming
    /// them from `inbound`
    pub fn step(
        &mut self,
        inbound: &mut Vec<Message>,
        timestamp: Tick,
        overrides: Option<&ParamOverrides>,
    ) -> Result<CycleOutput, LoopError> {
        let time_step = self.time_step_for(timestamp)?;
        if let Some(overrides) = overrides {
            self.apply_overrides(overrides)?;
        }

        self.phase = CyclePhase::Routing;
        let routed = self.router.route(inbound, time_step)?;

        self.phase = CyclePhase::Estimating;
        let estimation = self.estimator.update(
            &routed.measurements,
            &routed.acknowledgements,
            &self.state.controller_history,
            time_step,
        )?;

        self.phase = CyclePhase::SequenceResolution;
        let previous_true_mode = self.state.plant_mode;
        self.state.actuator_buffer.age();
        let acceptance = self
            .state
            .actuator_buffer
            .accept(&routed.control_sequences, time_step);
        let (applied_input, applied_mode) = self.state.actuator_buffer.current_input();

        self.phase = CyclePhase::PlantAdvance;
        self.plant.set_input(&applied_input);
        let next_state = self.plant.simulate(&self.state.true_state);
        let admissible = self.plant.is_valid_state(&next_state);
        let measured_state = std::mem::replace(&mut self.state.true_state, next_state);
        self.state.plant_mode = applied_mode;
        let measurement = self.sensor.step(&measured_state);

        self.phase = CyclePhase::SequenceGeneration;
        let previous_mode = self.generator.resolve_previous_mode(
            previous_true_mode,
            estimation.previous_mode,
            time_step,
        )?;
        let sequence = self
            .generator
            .generate(&estimation.estimate, previous_mode, time_step)?;
        self.state.controller_history.age();
        if let Some(sequence) = &sequence {
            self.state
                .controller_history
                .push(sequence.clone(), time_step);
        }

        self.phase = CyclePhase::Reporting;
        let control_law = self.generator.control_law();
        let actual_control_error = control_law.control_error(&measured_state, time_step);
        let estimated_control_error = control_law.control_error(&estimation.estimate, time_step);
        let actual_stage_cost = control_law.stage_cost(&measured_state, &applied_input, time_step);
        let quality_of_control = norm(&actual_control_error);

        let statistics = CycleStatistics {
            time_step,
            actual_control_error,
            estimated_control_error,
            actual_stage_cost,
            admissible,
            sensor_sent: measurement.is_some(),
            controller_sent: sequence.is_some(),
            actuator_sent: acceptance.acknowledgement.is_some(),
            measurement_delays: routed.measurement_delays(),
            control_sequence_delays: routed.control_sequence_delays(),
            acknowledgement_delays: routed.acknowledgement_delays(),
            applied_input,
            applied_mode,
            discarded_sequences: acceptance.discarded,
            measurements_used: estimation.num_used,
            measurements_discarded: estimation.num_discarded,
        };

        let mut messages = Vec::with_capacity(3);
        messages.extend(acceptance.acknowledgement);
        messages.extend(measurement.map(|value| Message::measurement(time_step, value)));
        messages.extend(sequence.map(|sequence| Message::control_sequence(time_step, sequence)));

        self.state.statistics.record(statistics.clone());
        self.state.last_time_step = Some(time_step);
        self.phase = CyclePhase::Idle;

        Ok(CycleOutput {
            messages,
            quality_of_control,
            statistics,
        })
    }

    fn apply_overrides(&mut self, overrides: &ParamOverrides) -> Result<(), LoopError> {
        overrides.validate()?;

        if let Some(threshold) = overrides.event_threshold {
            let sensor_took = self.sensor.set_event_threshold(threshold);
            let controller_took = self.generator.set_event_threshold(threshold);
            if !sensor_took && !controller_took {
                info!("Ignoring event threshold override, nothing is event-triggered");
            }
        }

        if let Some(sequence_length) = overrides.sequence_length {
            if sequence_length != self.config.sequence_length {
                if self.generator.change_sequence_length(sequence_length) {
                    self.resize_sequences(sequence_length)?;
                } else {
                    info!("Ignoring sequence length override, the control law does not support it");
                }
            }
        }

        if let Some(delay_distribution) = &overrides.delay_distribution {
            if !self.generator.change_delay_distribution(delay_distribution) {
                info!("Ignoring delay distribution override, the control law does not support it");
            }
        }

        Ok(())
    }

    fn resize_sequences(&mut self, sequence_length: usize) -> Result<(), LoopError> {
        self.config.sequence_length = sequence_length;
        self.state.actuator_buffer.set_sequence_length(sequence_length);
        self.state
            .controller_history
            .set_sequence_length(sequence_length);
        self.estimator.set_sequence_length(sequence_length);
        self.state.plant_mode = if self.state.plant_mode.is_sentinel() {
            Mode::sentinel(sequence_length)
        } else {
            Mode::saturating_from_age(self.state.plant_mode.value(), sequence_length)?
        };
        Ok(())
    }
}
