use crate::types::Vector;

/// Observes the true plant state each cycle
pub trait Sensor: Send {
    /// Measures `state`. Returns `None` when nothing should be transmitted,
    /// which is how event-triggered sensors stay silent.
    fn step(&mut self, state: &[f64]) -> Option<Vector>;

    /// Changes the transmission threshold. Returns false if this sensor is
    /// not event-triggered.
    fn set_event_threshold(&mut self, _threshold: f64) -> bool {
        false
    }
}
