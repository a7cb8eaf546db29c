//! AdapterError: Unified error type for cht-adapter public APIs
//!
//! Every fallible operation of the adapter returns this error. Configuration
//! and divergence variants are fatal for a run; a rejected coupling
//! sub-iteration is never reported through this type.

use thiserror::Error;

use crate::data::quantity::Direction;
use crate::solver::KernelFailure;
use crate::topology::entity::{ElementId, FaceRef, NodeId};

/// Boundary-condition family a read channel needs the host solver to declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BcFamily {
    /// Fixed nodal temperature (Dirichlet).
    Temperature,
    /// Distributed surface flux.
    Flux,
    /// Convective film (coefficient + sink temperature).
    Film,
}

impl std::fmt::Display for BcFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BcFamily::Temperature => "temperature",
            BcFamily::Flux => "flux",
            BcFamily::Film => "film",
        };
        f.write_str(name)
    }
}

/// Entity that failed a boundary-condition lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingEntity {
    /// A region node.
    Node(NodeId),
    /// A region face.
    Face(FaceRef),
}

impl std::fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingEntity::Node(node) => write!(f, "node {node}"),
            MissingEntity::Face(face) => write!(f, "{face}"),
        }
    }
}

/// Unified error type for adapter operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdapterError {
    /// The decorated node set of a region does not exist in the host mesh.
    #[error("node set `{set}` for region `{region}` not found in the host mesh")]
    NodeSetNotFound { region: String, set: String },
    /// The decorated face (surface) set of a region does not exist in the host mesh.
    #[error("face set `{set}` for region `{region}` not found in the host mesh")]
    FaceSetNotFound { region: String, set: String },
    /// A region resolved to no entities.
    #[error("region `{0}` contains no entities")]
    EmptyRegion(String),
    /// A node id refers past the coordinate array.
    #[error("node {0} is not part of the host mesh")]
    UnknownNode(NodeId),
    /// An element id refers past the element table.
    #[error("element {0} is not part of the host mesh")]
    UnknownElement(ElementId),
    /// Face decomposition requested on an element type without a face table.
    #[error("element {element} has unsupported type `{kind}` (only C3D4/C3D10 tetrahedra)")]
    UnsupportedElement { element: ElementId, kind: String },
    /// Encoded face number outside `1..=4`.
    #[error("invalid local face {face} on element {element}")]
    InvalidLocalFace { element: ElementId, face: u8 },
    /// A face corner is not part of the node region used for triangles.
    #[error("corner node {node} of {face} is not in the node region of interface `{interface}`")]
    NodeNotInRegion {
        interface: String,
        face: FaceRef,
        node: NodeId,
    },
    /// A read channel needs a boundary condition that the host did not declare.
    #[error("missing {family} boundary condition for {entity}")]
    MissingBoundaryCondition {
        family: BcFamily,
        entity: MissingEntity,
    },
    /// The quantity name is not one of the supported data kinds.
    #[error("{direction} data `{name}` does not exist")]
    UnsupportedQuantity { name: String, direction: Direction },
    /// A quantity needs a coupling mesh the interface configuration omitted.
    #[error("{mesh} mesh not provided for interface `{interface}` (needed by `{quantity}`)")]
    MeshNotProvided {
        interface: String,
        mesh: &'static str,
        quantity: String,
    },
    /// Configuration is structurally invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Buffer and entity counts disagree.
    #[error("buffer length mismatch: expected {expected}, found {found}")]
    BufferLengthMismatch { expected: usize, found: usize },
    /// Restore requested while no snapshot exists for the current coupling window.
    #[error("checkpoint restore requested for coupling window {window} without a saved snapshot")]
    CheckpointMissing { window: usize },
    /// The physics kernel reported a hard failure.
    #[error("solver diverged in increment {increment} (attempt {attempt}): {reason}")]
    Divergence {
        increment: usize,
        attempt: usize,
        reason: String,
    },
    /// A host evaluation routine failed outside the physics kernel.
    #[error("host routine failed: {0}")]
    Kernel(#[from] KernelFailure),
    /// More increments than the solver allows.
    #[error("max. # of increments ({0}) reached")]
    MaxIncrementsExceeded(usize),
    /// Error reported by the coupling middleware.
    #[error("coupling middleware error: {0}")]
    Middleware(String),
}

impl AdapterError {
    /// True for errors caused by the case setup rather than the run itself.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AdapterError::NodeSetNotFound { .. }
                | AdapterError::FaceSetNotFound { .. }
                | AdapterError::EmptyRegion(_)
                | AdapterError::UnknownNode(_)
                | AdapterError::UnknownElement(_)
                | AdapterError::UnsupportedElement { .. }
                | AdapterError::InvalidLocalFace { .. }
                | AdapterError::NodeNotInRegion { .. }
                | AdapterError::MissingBoundaryCondition { .. }
                | AdapterError::UnsupportedQuantity { .. }
                | AdapterError::MeshNotProvided { .. }
                | AdapterError::InvalidConfig(_)
        )
    }

    /// True for numerical failures of the host solver.
    pub fn is_divergence(&self) -> bool {
        matches!(
            self,
            AdapterError::Divergence { .. }
                | AdapterError::Kernel(_)
                | AdapterError::MaxIncrementsExceeded(_)
        )
    }
}
