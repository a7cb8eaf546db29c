//! Coupling loop states.

use std::fmt;

/// Where the orchestrator is in the coupling protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CouplingState {
    /// Set up; the next pass opens a new step.
    #[default]
    AwaitingStep,
    /// A sub-iteration of the current step ran and was not yet accepted.
    Iterating,
    /// The last sub-iteration was accepted.
    Converged,
    /// Coupling ended and the middleware was finalized.
    Finished,
}

impl CouplingState {
    /// The next pass starts a new step.
    pub fn opens_step(self) -> bool {
        matches!(self, CouplingState::AwaitingStep | CouplingState::Converged)
    }

    /// No further passes are possible.
    pub fn is_terminal(self) -> bool {
        self == CouplingState::Finished
    }
}

impl fmt::Display for CouplingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CouplingState::AwaitingStep => "awaiting-step",
            CouplingState::Iterating => "iterating",
            CouplingState::Converged => "converged",
            CouplingState::Finished => "finished",
        })
    }
}

/// Verdict of the middleware on one sub-iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Progress committed.
    Accepted,
    /// State must be restored and the step repeated.
    Rejected,
}
