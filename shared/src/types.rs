use serde::{Deserialize, Serialize};

pub type TimeStep = u64;
pub type Tick = u64;
pub type Vector = Vec<f64>;

/// Identifies one control loop instance (one controlled plant)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

/// The three participants of a control loop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Sensor,
    Controller,
    Actuator,
}

/// Capabilities of the network closing the loop
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType {
    /// The controller learns the previous true mode of the plant
    #[default]
    TcpLike,
    /// The controller has to estimate the mode from acknowledgement timing
    UdpLike,
}

impl NetworkType {
    pub fn provides_true_mode_feedback(self) -> bool {
        match self {
            NetworkType::TcpLike => true,
            NetworkType::UdpLike => false,
        }
    }
}

/// Euclidean norm of a vector
pub fn norm(vector: &[f64]) -> f64 {
    vector.iter().map(|value| value * value).sum::<f64>().sqrt()
}
