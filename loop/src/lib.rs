//! # NCS Loop
//! Drives networked control loops one sampling instant at a time: routes the
//! delivered messages, feeds the filter, resolves the input the actuator
//! applies, advances the plant and produces the next control sequence.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod control_loop;
mod error;
mod estimator;
mod generator;
mod loop_state;
mod registry;
mod statistics;

pub use control_loop::{ControlLoop, ControlLoopBuilder, CycleOutput, CyclePhase};
pub use error::{InvalidTimestampError, LoopError, MissingModeError};
pub use estimator::{observed_mode, EstimatorAdapter, EstimatorUpdate};
pub use generator::SequenceGenerator;
pub use loop_state::LoopState;
pub use registry::LoopRegistry;
pub use statistics::{CycleStatistics, LoopStatistics, StatisticsSummary};

pub use ncs_shared as shared;
