//! Combat systems

pub mod death;
pub mod effects;
pub mod skills;

#[cfg(test)]
mod skills_tests;

pub use death::*;
pub use effects::*;
pub use skills::*;
