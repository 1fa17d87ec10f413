//! AI systems

pub mod fsm;
pub mod steering;

pub use fsm::*;
pub use steering::*;
