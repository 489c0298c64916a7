pub mod control_law;
pub mod error;
pub mod filter;
pub mod plant;
pub mod sensor;
