#![cfg_attr(docsrs, feature(doc_cfg))]
//! # cht-adapter
//!
//! cht-adapter couples a host thermal solver to a co-simulation middleware
//! for conjugate heat transfer. It solves no physics. It translates between
//! the host's discretization (nodes, element faces, boundary-value slots) and
//! the middleware's flat per-vertex buffers, and it drives implicit
//! partitioned coupling: iteration control, checkpoint and rollback, and
//! step-size negotiation.
//!
//! ## Features
//! - Region resolution from the host's named node and face sets
//! - Nodes and face-centers coupling meshes per interface, with optional triangles
//! - Read channels for temperature, heat flux and film (sink temperature,
//!   heat-transfer coefficient) through precomputed index tables
//! - Write channels extracting the same quantities from host state
//! - Checkpointing of the primary state and normalized time
//! - Steady-state and transient step policies with subcycling control
//! - An in-process loopback middleware for dry runs and tests
//!
//! ## Usage
//! Implement [`solver::HostSolver`] for the host and
//! [`middleware::CouplingMiddleware`] for the coupling library, then:
//!
//! ```ignore
//! let mut orchestrator = CouplingOrchestrator::new(&config, solver, middleware)?;
//! let summary = orchestrator.run()?;
//! log::info!("{summary}");
//! ```
//!
//! ## Invariants
//! Vertex handles stay index-aligned with region entities for the whole run.
//! Enable the `check-invariants` feature to validate interfaces and tables in
//! release builds as well.

pub mod adapter_error;
pub mod algs;
pub mod checkpoint;
pub mod config;
pub mod data;
pub mod debug_invariants;
pub mod interface;
pub mod middleware;
pub mod orchestrator;
pub mod registry;
pub mod solver;
pub mod topology;

pub use adapter_error::AdapterError;
pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::adapter_error::{AdapterError, BcFamily, MissingEntity};
    pub use crate::checkpoint::{CheckpointManager, CheckpointSnapshot};
    pub use crate::config::{AdapterConfig, InterfaceConfig};
    pub use crate::data::bc::{BoundaryTables, DirichletTable, LoadKind, LoadLabel, LoadTable};
    pub use crate::data::channel::{ReadChannel, RegionEntities, WriteChannel};
    pub use crate::data::quantity::{Direction, Quantity};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::interface::CouplingInterface;
    pub use crate::middleware::loopback::{LoopbackMiddleware, TimeWindow};
    pub use crate::middleware::{Action, CouplingMiddleware, DataId, MeshId, VertexId};
    pub use crate::orchestrator::{CouplingOrchestrator, CouplingState, RunSummary};
    pub use crate::registry::Registry;
    pub use crate::solver::{AnalysisKind, HostSolver, IncrementInfo, KernelFailure, SolverTime};
    pub use crate::topology::{ElementId, ElementType, FaceRef, HostMesh, NodeId};
}
