//! Summary of a finished coupling run.

use std::fmt;

use super::state::CouplingState;

/// Counters collected by [`super::CouplingOrchestrator::run`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    /// Accepted increments.
    pub accepted_increments: usize,
    /// Sub-iterations run, accepted or not.
    pub sub_iterations: usize,
    /// Rejected sub-iterations (retries).
    pub rejected_iterations: usize,
    /// Completed fraction of the host step.
    pub final_theta: f64,
    /// Completed physical step time.
    pub final_time: f64,
    /// State at return.
    pub state: CouplingState,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} increments, {} sub-iterations ({} rejected), step time {:.6e}, {}",
            self.accepted_increments,
            self.sub_iterations,
            self.rejected_iterations,
            self.final_time,
            self.state
        )
    }
}
