use std::collections::{hash_map::Entry, HashMap};

use log::debug;

use ncs_shared::{ConfigurationError, InstanceId, Message, ParamOverrides, Tick};

use crate::{
    control_loop::{ControlLoop, CycleOutput},
    error::LoopError,
    statistics::LoopStatistics,
};

/// Owns every control loop of a simulation along with the messages waiting
/// to be consumed by each of them.
///
/// Loops share nothing, so a driver that wants to advance them in parallel
/// can take them out with [`LoopRegistry::remove`] or keep one registry per
/// thread.
#[derive(Default)]
pub struct LoopRegistry {
    loops: HashMap<InstanceId, ControlLoop>,
    inbound: HashMap<InstanceId, Vec<Message>>,
}

impl LoopRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        instance: InstanceId,
        control_loop: ControlLoop,
    ) -> Result<(), ConfigurationError> {
        match self.loops.entry(instance) {
            Entry::Occupied(_) => Err(ConfigurationError::DuplicateInstance { instance }),
            Entry::Vacant(entry) => {
                entry.insert(control_loop);
                self.inbound.insert(instance, Vec::new());
                Ok(())
            }
        }
    }

    /// Queues a message for the next step of `instance`
    pub fn deliver(&mut self, instance: InstanceId, message: Message) -> Result<(), ConfigurationError> {
        self.inbound_mut(instance)?.push(message);
        Ok(())
    }

    pub fn deliver_all<I>(&mut self, instance: InstanceId, messages: I) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = Message>,
    {
        self.inbound_mut(instance)?.extend(messages);
        Ok(())
    }

    /// Messages queued for `instance` that its next step will consume
    pub fn pending(&self, instance: InstanceId) -> Option<&[Message]> {
        self.inbound.get(&instance).map(Vec::as_slice)
    }

    /// Runs one cycle of `instance` on everything delivered to it since its
    /// last step
    pub fn step(
        &mut self,
        instance: InstanceId,
        timestamp: Tick,
        overrides: Option<&ParamOverrides>,
    ) -> Result<CycleOutput, LoopError> {
        let control_loop = self
            .loops
            .get_mut(&instance)
            .ok_or(ConfigurationError::UnknownInstance { instance })?;
        let inbound = self.inbound.entry(instance).or_default();
        control_loop.step(inbound, timestamp, overrides)
    }

    /// Tears an instance down, returning what it recorded
    pub fn remove(&mut self, instance: InstanceId) -> Option<LoopStatistics> {
        if let Some(pending) = self.inbound.remove(&instance) {
            if !pending.is_empty() {
                debug!(
                    "Dropping {} undelivered message(s) of instance {:?}",
                    pending.len(),
                    instance
                );
            }
        }
        self.loops.remove(&instance).map(ControlLoop::into_statistics)
    }

    pub fn contains(&self, instance: InstanceId) -> bool {
        self.loops.contains_key(&instance)
    }

    pub fn instance(&self, instance: InstanceId) -> Option<&ControlLoop> {
        self.loops.get(&instance)
    }

    pub fn instances(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.loops.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    fn inbound_mut(&mut self, instance: InstanceId) -> Result<&mut Vec<Message>, ConfigurationError> {
        self.inbound
            .get_mut(&instance)
            .ok_or(ConfigurationError::UnknownInstance { instance })
    }
}
