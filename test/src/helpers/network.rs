use std::collections::{HashMap, VecDeque};

use log::debug;

use ncs_loop::{ControlLoop, CycleOutput, LoopError};
use ncs_shared::{Message, Role, TimeStep};

/// Single-hop network closing one loop. Each message is delivered a number
/// of cycles after it was sent, taken from a per-sender script and falling
/// back to a fixed per-sender delay. A delay of `None` in a script loses the
/// message.
#[derive(Default)]
pub struct DelayedNetwork {
    fixed_delays: HashMap<Role, TimeStep>,
    scripts: HashMap<Role, VecDeque<Option<TimeStep>>>,
    in_flight: Vec<(TimeStep, Message)>,
}

impl DelayedNetwork {
    /// Every message arrives one cycle after it was sent
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, sender: Role, delay: TimeStep) -> Self {
        self.fixed_delays.insert(sender, delay.max(1));
        self
    }

    pub fn with_script<I>(mut self, sender: Role, delays: I) -> Self
    where
        I: IntoIterator<Item = Option<TimeStep>>,
    {
        self.scripts
            .insert(sender, delays.into_iter().collect());
        self
    }

    pub fn send(&mut self, sent_at: TimeStep, messages: impl IntoIterator<Item = Message>) {
        for message in messages {
            let sender = message.source();
            let scripted = self
                .scripts
                .get_mut(&sender)
                .and_then(VecDeque::pop_front);
            let delay = match scripted {
                Some(Some(delay)) => delay.max(1),
                Some(None) => {
                    debug!(
                        "Losing {} sent by {:?} at time step {}",
                        message.payload().kind_name(),
                        sender,
                        sent_at
                    );
                    continue;
                }
                None => self.fixed_delays.get(&sender).copied().unwrap_or(1),
            };
            self.in_flight.push((sent_at + delay, message));
        }
    }

    /// Removes and returns, in sending order, everything due by `time_step`
    pub fn receive(&mut self, time_step: TimeStep) -> Vec<Message> {
        let (due, pending): (Vec<_>, Vec<_>) = self
            .in_flight
            .drain(..)
            .partition(|(arrival, _)| *arrival <= time_step);
        self.in_flight = pending;
        due.into_iter().map(|(_, message)| message).collect()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// Runs `cycles` consecutive cycles starting at `first_time_step`, feeding
/// every cycle's output back through `network`
pub fn run_cycles(
    control_loop: &mut ControlLoop,
    network: &mut DelayedNetwork,
    first_time_step: TimeStep,
    cycles: usize,
) -> Result<Vec<CycleOutput>, LoopError> {
    let sampling_interval_ticks = control_loop.config().sampling_interval_ticks;
    let mut outputs = Vec::with_capacity(cycles);
    for time_step in (first_time_step..).take(cycles) {
        let mut inbound = network.receive(time_step);
        let output = control_loop.step(&mut inbound, time_step * sampling_interval_ticks, None)?;
        network.send(time_step, output.messages.iter().cloned());
        outputs.push(output);
    }
    Ok(outputs)
}
