//! Simulation driver: time stepping and run diagnostics.

mod diagnostics;
mod stepper;

pub use diagnostics::MaterialBalance;
pub use stepper::{
    ConfigError, RunState, Simulation, StepError, StepResult, StepWarning, Steps,
};
