//! Iteration checkpoints.
//!
//! When a coupling window opens the primary state and the normalized time
//! are copied aside; the copy is kept across every increment (subcycle) of
//! the window, and a rejected window copies it back. Snapshots are full
//! copies and never alias the live state.

use crate::adapter_error::AdapterError;
use crate::solver::{HostSolver, SolverTime};

/// State needed to repeat one coupling window.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckpointSnapshot {
    /// Coupling window the snapshot was taken for (1-based).
    pub window: usize,
    /// Completed fraction of the step.
    pub theta: f64,
    /// Increment fraction.
    pub dtheta: f64,
    /// Copy of the primary state vector.
    pub state: Vec<f64>,
}

/// Owner of the single live snapshot.
#[derive(Debug, Default)]
pub struct CheckpointManager {
    snapshot: Option<CheckpointSnapshot>,
    saves: usize,
    restores: usize,
}

impl CheckpointManager {
    /// Manager without a snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the snapshot with the solver's current state.
    pub fn save<S: HostSolver + ?Sized>(&mut self, solver: &S, window: usize) {
        let time = solver.time();
        match &mut self.snapshot {
            // reuse the allocation across windows
            Some(snap) => {
                snap.window = window;
                snap.theta = time.theta;
                snap.dtheta = time.dtheta;
                snap.state.clear();
                snap.state.extend_from_slice(solver.primary_state());
            }
            None => {
                self.snapshot = Some(CheckpointSnapshot {
                    window,
                    theta: time.theta,
                    dtheta: time.dtheta,
                    state: solver.primary_state().to_vec(),
                })
            }
        }
        self.saves += 1;
        log::debug!("checkpoint saved for coupling window {window}");
    }

    /// Copies the snapshot of `window` back into the solver.
    ///
    /// # Errors
    /// `CheckpointMissing` when no snapshot exists for `window`;
    /// `BufferLengthMismatch` when the state vector changed size.
    pub fn restore<S: HostSolver + ?Sized>(
        &mut self,
        solver: &mut S,
        window: usize,
    ) -> Result<(), AdapterError> {
        let snap = self
            .snapshot
            .as_ref()
            .filter(|s| s.window == window)
            .ok_or(AdapterError::CheckpointMissing { window })?;
        let state = solver.primary_state_mut();
        if state.len() != snap.state.len() {
            return Err(AdapterError::BufferLengthMismatch {
                expected: snap.state.len(),
                found: state.len(),
            });
        }
        state.copy_from_slice(&snap.state);
        let period = solver.time().period;
        solver.set_time(SolverTime {
            theta: snap.theta,
            dtheta: snap.dtheta,
            period,
        });
        self.restores += 1;
        log::debug!("checkpoint restored for coupling window {window}");
        Ok(())
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Option<&CheckpointSnapshot> {
        self.snapshot.as_ref()
    }

    /// Number of saves so far.
    pub fn saves(&self) -> usize {
        self.saves
    }

    /// Number of restores so far.
    pub fn restores(&self) -> usize {
        self.restores
    }

    /// Drops the snapshot.
    pub fn clear(&mut self) {
        self.snapshot = None;
    }
}
