//! Per-increment, per-iteration coupling control.
//!
//! The orchestrator is the only component that talks to both the host solver
//! and the middleware. Each outer pass runs one sub-iteration:
//!
//! 1. negotiate the increment ([`time_step`]),
//! 2. open a new step (checkpoint save when a coupling window opens) or
//!    rewind the rejected window (restore),
//! 3. read coupling data, run the kernel, write coupling data,
//! 4. advance the middleware and accept or reject the sub-iteration.

pub mod driver;
pub mod report;
pub mod state;
pub mod time_step;

pub use driver::CouplingOrchestrator;
pub use report::RunSummary;
pub use state::{CouplingState, IterationOutcome};
pub use time_step::{StepLimit, StepPlan, TimeStepPolicy};
