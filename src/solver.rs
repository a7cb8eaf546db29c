//! Host solver boundary.
//!
//! The adapter never assembles or solves anything. It reads and writes the
//! host's arrays through [`HostSolver`] and asks it to run one coupling
//! sub-iteration of its physics kernel.

use thiserror::Error;

use crate::data::bc::{BoundaryTables, TEMPERATURE_DOF};
use crate::topology::entity::{FaceRef, NodeId};
use crate::topology::host_mesh::HostMesh;

/// Analysis procedure of the current host step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalysisKind {
    /// Pseudo-transient relaxation to a steady state.
    SteadyState,
    /// Time-accurate analysis.
    Transient,
}

/// Normalized host time of the current step.
///
/// `theta` is the completed fraction of the step period, `dtheta` the
/// fraction the next increment covers; physical step time is `theta * period`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverTime {
    /// Completed fraction of the step.
    pub theta: f64,
    /// Fraction covered by the current increment.
    pub dtheta: f64,
    /// Step period in physical time units.
    pub period: f64,
}

impl SolverTime {
    /// Start of a step of length `period` with a first increment of `dtheta`.
    pub fn new(period: f64, dtheta: f64) -> Self {
        Self {
            theta: 0.0,
            dtheta,
            period,
        }
    }

    /// Physical size of the current increment.
    #[inline]
    pub fn increment_size(&self) -> f64 {
        self.dtheta * self.period
    }

    /// Physical time already completed in the step.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.theta * self.period
    }

    /// Physical step time at the end of the current increment.
    #[inline]
    pub fn end_of_increment(&self) -> f64 {
        (self.theta + self.dtheta) * self.period
    }
}

/// What the kernel is asked to compute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IncrementInfo {
    /// 1-based accepted-increment counter.
    pub increment: usize,
    /// 1-based pass over the current coupling window.
    pub attempt: usize,
    /// Time state for this attempt.
    pub time: SolverTime,
}

/// Hard failure of a host routine (no convergence, bad method code, ...).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct KernelFailure {
    /// Host-provided description.
    pub reason: String,
}

impl KernelFailure {
    /// Failure with a message.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Access to the host solver's state for one coupling participant.
pub trait HostSolver {
    /// Mesh with named sets.
    fn mesh(&self) -> &HostMesh;

    /// Analysis procedure of the running step.
    fn analysis(&self) -> AnalysisKind;

    /// Slots per node in the primary state vector; temperature is slot 0.
    fn dofs_per_node(&self) -> usize;

    /// Full primary state vector (`dofs_per_node * num_nodes`).
    fn primary_state(&self) -> &[f64];

    /// Mutable primary state vector.
    fn primary_state_mut(&mut self) -> &mut [f64];

    /// Boundary bookkeeping arrays.
    fn boundary(&self) -> &BoundaryTables;

    /// Mutable boundary bookkeeping arrays.
    fn boundary_mut(&mut self) -> &mut BoundaryTables;

    /// Current normalized time.
    fn time(&self) -> SolverTime;

    /// Replaces the normalized time.
    fn set_time(&mut self, time: SolverTime);

    /// Increment fraction the solver would take on its own (stability/accuracy bound).
    fn preferred_increment(&self) -> f64;

    /// Maximum number of increments allowed in the step.
    fn max_increments(&self) -> usize;

    /// Heat flux leaving each face, in face order.
    fn face_heat_flux(&self, faces: &[FaceRef], out: &mut [f64]) -> Result<(), KernelFailure>;

    /// Film coefficient (conductivity over wall distance) of each face.
    fn face_heat_transfer_coefficient(
        &self,
        faces: &[FaceRef],
        out: &mut [f64],
    ) -> Result<(), KernelFailure>;

    /// Near-wall reference temperature of each face.
    fn face_sink_temperature(&self, faces: &[FaceRef], out: &mut [f64])
    -> Result<(), KernelFailure>;

    /// Runs one coupling sub-iteration of the physics kernel.
    fn solve_increment(&mut self, info: &IncrementInfo) -> Result<(), KernelFailure>;

    /// Writes results for the last accepted increment.
    fn write_output(&mut self, _increment: usize) -> Result<(), KernelFailure> {
        Ok(())
    }

    /// Nodal temperature from the primary state.
    fn node_temperature(&self, node: NodeId) -> Option<f64> {
        self.primary_state()
            .get(node.index() * self.dofs_per_node() + TEMPERATURE_DOF as usize)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_arithmetic() {
        let t = SolverTime {
            theta: 0.25,
            dtheta: 0.5,
            period: 2.0,
        };
        assert_eq!(t.increment_size(), 1.0);
        assert_eq!(t.elapsed(), 0.5);
        assert_eq!(t.end_of_increment(), 1.5);
        assert_eq!(SolverTime::new(4.0, 0.1).theta, 0.0);
    }

    #[test]
    fn kernel_failure_displays_reason() {
        assert_eq!(KernelFailure::new("no convergence").to_string(), "no convergence");
    }
}
