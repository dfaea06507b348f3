/// Implementations and deployment helpers shared by the scenario tests.
pub mod fixtures;

pub use fixtures::*;
