use std::collections::VecDeque;

use log::debug;

use crate::{
    messages::message::{ControlSequence, Message},
    mode::Mode,
    types::{TimeStep, Vector},
};

/// One historical control sequence together with its age. A slot is at
/// age 1 in the cycle it is inserted and grows one age per cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceSlot {
    age: usize,
    origin_time_step: TimeStep,
    sequence: ControlSequence,
}

impl SequenceSlot {
    pub fn age(&self) -> usize {
        self.age
    }

    pub fn origin_time_step(&self) -> TimeStep {
        self.origin_time_step
    }

    pub fn sequence(&self) -> &ControlSequence {
        &self.sequence
    }
}

/// Result of offering one cycle's control sequences to the buffer
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AcceptOutcome {
    /// Origin time step of the sequence inserted at age 1, if any
    pub accepted: Option<TimeStep>,
    /// Acknowledgement for the accepted sequence
    pub acknowledgement: Option<Message>,
    /// Candidates not inserted into the buffer
    pub discarded: usize,
}

/// The input each mode would apply, indexed by mode `1..=N+1`
#[derive(Clone, Debug, PartialEq)]
pub struct ModeInputs {
    inputs: Vec<Vector>,
}

impl ModeInputs {
    /// Every mode applies the same input, as if nothing were buffered
    pub fn uniform(input: &[f64], sequence_length: usize) -> Self {
        Self {
            inputs: vec![input.to_vec(); sequence_length + 1],
        }
    }

    pub fn input(&self, mode: Mode) -> Option<&Vector> {
        self.inputs.get(mode.index())
    }

    /// Number of modes, `N + 1`
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn as_slice(&self) -> &[Vector] {
        &self.inputs
    }
}

/// Store of previously transmitted control sequences indexed by age.
///
/// Ages run over `1..=N`; at most one slot exists per age, a new sequence
/// enters at age 1 and a slot aging past N is evicted. The youngest slot
/// provides the active input.
#[derive(Clone, Debug)]
pub struct SequenceBuffer {
    sequence_length: usize,
    default_input: Vector,
    // ordered by ascending age
    slots: VecDeque<SequenceSlot>,
    newest_origin: Option<TimeStep>,
}

impl SequenceBuffer {
    pub fn new(sequence_length: usize, default_input: Vector) -> Self {
        Self {
            sequence_length,
            default_input,
            slots: VecDeque::new(),
            newest_origin: None,
        }
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    pub fn default_input(&self) -> &Vector {
        &self.default_input
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> impl Iterator<Item = &SequenceSlot> {
        self.slots.iter()
    }

    pub fn slot(&self, age: usize) -> Option<&SequenceSlot> {
        self.slots.iter().find(|slot| slot.age == age)
    }

    /// Origin time step of the newest sequence ever inserted, which survives
    /// eviction so that stale sequences stay rejected
    pub fn newest_origin(&self) -> Option<TimeStep> {
        self.newest_origin
    }

    /// Shifts every slot by one age, evicting the slot that passes N
    pub fn age(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.age += 1;
        }
        self.evict_expired();
    }

    /// Offers this cycle's control sequence messages to the buffer.
    ///
    /// The candidate with the latest origin time step wins, the first one on
    /// ties. It is inserted at age 1 and acknowledged only if it is newer
    /// than anything buffered so far; every other candidate is discarded.
    pub fn accept(&mut self, candidates: &[Message], current_time_step: TimeStep) -> AcceptOutcome {
        let mut newest: Option<(TimeStep, &ControlSequence)> = None;
        for candidate in candidates {
            let Some(sequence) = candidate.control_sequence_value() else {
                continue;
            };
            let origin = candidate.origin_time_step();
            match newest {
                Some((newest_origin, _)) if origin <= newest_origin => {}
                _ => newest = Some((origin, sequence)),
            }
        }

        let Some((origin, sequence)) = newest else {
            return AcceptOutcome {
                discarded: candidates.len(),
                ..AcceptOutcome::default()
            };
        };

        if !self.is_newer(origin) {
            debug!(
                "Discarding {} control sequence(s), none newer than time step {:?}",
                candidates.len(),
                self.newest_origin
            );
            return AcceptOutcome {
                discarded: candidates.len(),
                ..AcceptOutcome::default()
            };
        }

        self.insert(sequence.clone(), origin);
        debug!(
            "Accepted control sequence from time step {} at time step {}, discarding {}",
            origin,
            current_time_step,
            candidates.len() - 1
        );

        AcceptOutcome {
            accepted: Some(origin),
            acknowledgement: Some(Message::acknowledgement(current_time_step, origin)),
            discarded: candidates.len() - 1,
        }
    }

    /// Records a sequence at age 1 without acknowledging it, as the sending
    /// side does with its own history. Returns false if the sequence is not
    /// newer than what is already buffered.
    pub fn push(&mut self, sequence: ControlSequence, origin_time_step: TimeStep) -> bool {
        if !self.is_newer(origin_time_step) {
            return false;
        }
        self.insert(sequence, origin_time_step);
        true
    }

    /// Input to apply this cycle and the mode it corresponds to.
    ///
    /// The youngest slot applies its entry at position `min(age, N)`; with an
    /// empty buffer the default input is applied in the sentinel mode.
    pub fn current_input(&self) -> (Vector, Mode) {
        if let Some(slot) = self.slots.front() {
            let position = slot.age.min(self.sequence_length);
            if let Some(input) = slot.sequence.input(position) {
                return (input.clone(), Mode::from_slot_age(slot.age, self.sequence_length));
            }
        }
        (self.default_input.clone(), Mode::sentinel(self.sequence_length))
    }

    /// For every mode `j` in `1..=N`, the entry `j` of the slot at age `j`,
    /// falling back to the default input; the sentinel applies the default
    pub fn mode_inputs(&self) -> ModeInputs {
        let mut inputs = Vec::with_capacity(self.sequence_length + 1);
        for age in 1..=self.sequence_length {
            let input = self
                .slot(age)
                .and_then(|slot| slot.sequence.input(age))
                .unwrap_or(&self.default_input);
            inputs.push(input.clone());
        }
        inputs.push(self.default_input.clone());
        ModeInputs { inputs }
    }

    /// Changes N, evicting slots that are now too old
    pub fn set_sequence_length(&mut self, sequence_length: usize) {
        self.sequence_length = sequence_length;
        self.evict_expired();
    }

    fn is_newer(&self, origin_time_step: TimeStep) -> bool {
        match self.newest_origin {
            Some(newest) => origin_time_step > newest,
            None => true,
        }
    }

    fn insert(&mut self, sequence: ControlSequence, origin_time_step: TimeStep) {
        if matches!(self.slots.front(), Some(slot) if slot.age == 1) {
            // not aged since the last insertion, the newer sequence takes age 1
            self.slots.pop_front();
        }
        self.slots.push_front(SequenceSlot {
            age: 1,
            origin_time_step,
            sequence,
        });
        self.newest_origin = Some(origin_time_step);
    }

    fn evict_expired(&mut self) {
        let sequence_length = self.sequence_length;
        while matches!(self.slots.back(), Some(slot) if slot.age > sequence_length) {
            if let Some(slot) = self.slots.pop_back() {
                debug!(
                    "Evicting control sequence from time step {} at age {}",
                    slot.origin_time_step, slot.age
                );
            }
        }
    }
}
