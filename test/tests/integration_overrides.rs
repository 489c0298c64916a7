/// INTEGRATION TESTS: Per-cycle parameter overrides
///
/// Overrides reach the collaborators that support them and are no-ops for
/// the ones that do not.

use ncs_loop::{ControlLoop, LoopError};
use ncs_shared::{ConfigurationError, NetworkType, ParamOverrides, DELAY_DISTRIBUTION_KEY};
use ncs_test::{
    init_logger, scalar_config, scalar_loop, ConstantGainLaw, EventTriggeredLaw,
    EventTriggeredSensor, LinearPlant, ScriptedFilter,
};

fn event_triggered_loop(threshold: f64) -> ControlLoop {
    ControlLoop::builder(scalar_config(3, NetworkType::TcpLike))
        .plant(LinearPlant::scalar(1.0, 0.0))
        .sensor(EventTriggeredSensor::new(threshold))
        .filter(ScriptedFilter::new(vec![1.0]))
        .control_law(EventTriggeredLaw::new(
            ConstantGainLaw::scalar(0.5, 3),
            threshold,
        ))
        .build()
        .unwrap()
}

fn resizable_loop() -> ControlLoop {
    ControlLoop::builder(scalar_config(3, NetworkType::TcpLike))
        .plant(LinearPlant::scalar(0.9, 1.0))
        .sensor(EventTriggeredSensor::always())
        .filter(ScriptedFilter::new(vec![1.0]))
        .control_law(ConstantGainLaw::scalar(0.5, 3).resizable())
        .build()
        .unwrap()
}

fn sent_control_sequence_length(output: &ncs_loop::CycleOutput) -> Option<usize> {
    output
        .messages
        .iter()
        .find_map(|message| message.control_sequence_value())
        .map(|sequence| sequence.len())
}

#[test]
fn event_threshold_silences_and_wakes_sensor_and_controller() {
    init_logger();
    let mut control_loop = event_triggered_loop(100.0);

    let first = control_loop.step(&mut Vec::new(), 0, None).unwrap();
    let second = control_loop.step(&mut Vec::new(), 1, None).unwrap();
    assert!(first.statistics.sensor_sent);
    assert!(first.statistics.controller_sent);
    assert!(!second.statistics.sensor_sent);
    assert!(!second.statistics.controller_sent);
    assert!(second.messages.is_empty());

    let wake_up = ParamOverrides::new().with_event_threshold(0.0);
    let third = control_loop.step(&mut Vec::new(), 2, Some(&wake_up)).unwrap();
    assert!(third.statistics.sensor_sent);
    assert!(third.statistics.controller_sent);
}

#[test]
fn silent_controller_does_not_refresh_the_history() {
    init_logger();
    let mut control_loop = event_triggered_loop(100.0);

    for time_step in 0..3 {
        control_loop.step(&mut Vec::new(), time_step, None).unwrap();
    }

    let history = control_loop.state().controller_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history.slot(3).map(|slot| slot.origin_time_step()), Some(0));
}

#[test]
fn accepted_sequence_length_change_resizes_the_loop() {
    init_logger();
    let mut control_loop = resizable_loop();
    control_loop.step(&mut Vec::new(), 0, None).unwrap();

    let overrides: ParamOverrides = serde_json::from_str(r#"{ "sequenceLength": 5 }"#).unwrap();
    let output = control_loop.step(&mut Vec::new(), 1, Some(&overrides)).unwrap();

    assert_eq!(control_loop.config().sequence_length, 5);
    assert_eq!(control_loop.state().actuator_buffer().sequence_length(), 5);
    assert_eq!(control_loop.state().controller_history().sequence_length(), 5);
    assert_eq!(control_loop.estimator().staged_inputs().len(), 6);
    assert_eq!(sent_control_sequence_length(&output), Some(5));
    assert_eq!(output.statistics.applied_mode.value(), 6);
}

#[test]
fn unsupported_sequence_length_change_is_ignored() {
    init_logger();
    let (mut control_loop, _, _) = scalar_loop(scalar_config(3, NetworkType::TcpLike));

    let overrides = ParamOverrides::new().with_sequence_length(5);
    let output = control_loop.step(&mut Vec::new(), 0, Some(&overrides)).unwrap();

    assert_eq!(control_loop.config().sequence_length, 3);
    assert_eq!(sent_control_sequence_length(&output), Some(3));
}

#[test]
fn unsupported_delay_distribution_is_ignored() {
    init_logger();
    let (mut control_loop, _, _) = scalar_loop(scalar_config(3, NetworkType::TcpLike));

    let overrides: ParamOverrides = serde_json::from_str(
        r#"{ "delayDistribution": [0.25, 0.25, 0.5], "plantNoise": 3 }"#,
    )
    .unwrap();

    assert!(control_loop
        .step(&mut Vec::new(), 0, Some(&overrides))
        .is_ok());
}

#[test]
fn invalid_override_fails_the_cycle() {
    init_logger();
    let mut control_loop = event_triggered_loop(1.0);

    let overrides = ParamOverrides::new().with_delay_distribution(vec![0.9, 0.9]);
    let error = control_loop
        .step(&mut Vec::new(), 0, Some(&overrides))
        .unwrap_err();

    assert!(matches!(
        error,
        LoopError::Configuration(ConfigurationError::InvalidOverride {
            key: DELAY_DISTRIBUTION_KEY,
            ..
        })
    ));
    assert!(control_loop.statistics().is_empty());
}
