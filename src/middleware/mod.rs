//! Coupling middleware boundary.
//!
//! The middleware synchronizes participants in time and moves per-vertex
//! data between them. The adapter only registers meshes, exchanges flat
//! buffers and follows the actions the middleware requests.

pub mod loopback;

use std::fmt;

use crate::adapter_error::AdapterError;

macro_rules! handle_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

handle_id!(
    /// Middleware handle of a coupling mesh.
    MeshId
);
handle_id!(
    /// Middleware handle of one coupled data field on one mesh.
    DataId
);
handle_id!(
    /// Middleware handle of a mesh vertex.
    VertexId
);

/// Actions the middleware may require from the participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Provide initial data before `initialize_data`.
    WriteInitialData,
    /// Save state; the coming iteration may be repeated.
    WriteIterationCheckpoint,
    /// Restore state; the last iteration was not converged.
    ReadIterationCheckpoint,
}

impl Action {
    /// Protocol name of the action.
    pub fn name(self) -> &'static str {
        match self {
            Action::WriteInitialData => "write-initial-data",
            Action::WriteIterationCheckpoint => "write-iteration-checkpoint",
            Action::ReadIterationCheckpoint => "read-iteration-checkpoint",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operations the adapter needs from a coupling middleware.
///
/// Participant creation and middleware configuration belong to the
/// implementation's constructor. All calls are blocking.
pub trait CouplingMiddleware {
    /// Handle of the mesh called `name`.
    fn mesh_id(&self, name: &str) -> Result<MeshId, AdapterError>;

    /// Registers vertices and returns their handles in input order.
    fn set_mesh_vertices(
        &mut self,
        mesh: MeshId,
        positions: &[[f64; 3]],
    ) -> Result<Vec<VertexId>, AdapterError>;

    /// Registers a surface triangle together with its edges.
    fn set_mesh_triangle_with_edges(
        &mut self,
        mesh: MeshId,
        corners: [VertexId; 3],
    ) -> Result<(), AdapterError>;

    /// Handle of data `name` on `mesh`.
    fn data_id(&self, name: &str, mesh: MeshId) -> Result<DataId, AdapterError>;

    /// Starts coupling and returns the first allowed step size.
    fn initialize(&mut self) -> Result<f64, AdapterError>;

    /// Exchanges initial data.
    fn initialize_data(&mut self) -> Result<(), AdapterError>;

    /// Completes a step of size `dt` and returns the next allowed step size.
    fn advance(&mut self, dt: f64) -> Result<f64, AdapterError>;

    /// False once the last time window is done.
    fn is_coupling_ongoing(&self) -> bool;

    /// New data can be read.
    fn is_read_data_available(&self) -> bool;

    /// A step of size `dt` needs written data.
    fn is_write_data_required(&self, dt: f64) -> bool;

    /// `action` is pending.
    fn is_action_required(&self, action: Action) -> bool;

    /// Marks `action` as done.
    fn fulfilled_action(&mut self, action: Action) -> Result<(), AdapterError>;

    /// Reads one scalar per vertex into `values`.
    fn read_block_scalar_data(
        &mut self,
        data: DataId,
        vertices: &[VertexId],
        values: &mut [f64],
    ) -> Result<(), AdapterError>;

    /// Writes one scalar per vertex from `values`.
    fn write_block_scalar_data(
        &mut self,
        data: DataId,
        vertices: &[VertexId],
        values: &[f64],
    ) -> Result<(), AdapterError>;

    /// Ends coupling and releases the connection.
    fn finalize(&mut self) -> Result<(), AdapterError>;
}
