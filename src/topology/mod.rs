//! Host mesh topology as seen by the coupling adapter.
//!
//! This module provides:
//! - one-based node and element identifiers and encoded element faces
//! - tetrahedral element types with their local-face corner table
//! - named node and face sets under the host's naming convention
//! - the host mesh (coordinates, elements, sets)

pub mod element;
pub mod entity;
pub mod host_mesh;
pub mod named_sets;

pub use element::ElementType;
pub use entity::{ElementId, FaceRef, NodeId};
pub use host_mesh::HostMesh;
pub use named_sets::NamedSets;
