use std::fmt;

use thiserror::Error;

/// Errors that can occur when constructing a Mode
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeError {
    /// Age lies outside of `1..=sequence_length + 1`
    #[error("Mode {age} is out of range for sequence length {sequence_length}. Valid modes are 1 through sequence length + 1")]
    OutOfRange { age: usize, sequence_length: usize },

    /// A sequence length of zero leaves no valid mode
    #[error("Sequence length must be at least 1 to define a mode")]
    ZeroSequenceLength,
}

/// Discrete state of the jump-linear system induced by the sequence buffer.
///
/// The value is the age of the buffered sequence whose input was applied,
/// within `1..=N`, or the sentinel `N + 1` when no sequence was available and
/// the default input was used instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Mode {
    age: usize,
    sequence_length: usize,
}

impl Mode {
    pub fn from_age(age: usize, sequence_length: usize) -> Result<Self, ModeError> {
        if sequence_length == 0 {
            return Err(ModeError::ZeroSequenceLength);
        }
        if age == 0 || age > sequence_length + 1 {
            return Err(ModeError::OutOfRange {
                age,
                sequence_length,
            });
        }
        Ok(Self {
            age,
            sequence_length,
        })
    }

    /// Mode reported when no buffered sequence is available
    pub fn sentinel(sequence_length: usize) -> Self {
        Self {
            age: sequence_length + 1,
            sequence_length,
        }
    }

    /// Like [`Mode::from_age`], but ages beyond the horizon collapse into the
    /// sentinel, since such a sequence has run out of inputs
    pub fn saturating_from_age(age: usize, sequence_length: usize) -> Result<Self, ModeError> {
        Self::from_age(age.min(sequence_length + 1), sequence_length)
    }

    /// Buffer slots never outlive the horizon, so their age is always a mode
    pub(crate) fn from_slot_age(age: usize, sequence_length: usize) -> Self {
        debug_assert!(age >= 1 && age <= sequence_length);
        Self {
            age,
            sequence_length,
        }
    }

    pub fn value(&self) -> usize {
        self.age
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    pub fn is_sentinel(&self) -> bool {
        self.age == self.sequence_length + 1
    }

    /// Zero-based position of this mode in a mode-indexed collection
    pub fn index(&self) -> usize {
        self.age - 1
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            write!(f, "{} (default input)", self.age)
        } else {
            write!(f, "{}", self.age)
        }
    }
}
