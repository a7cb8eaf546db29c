//! Element type metadata and local face tables.

use crate::adapter_error::AdapterError;
use crate::topology::entity::{ElementId, FaceRef};

/// Local corner nodes of each tetrahedron face (0-based, faces 1..=4).
///
/// Identical for first- and second-order tetrahedra: mid-side nodes of
/// quadratic faces are not used for centroids or triangles.
pub const TET_FACE_CORNERS: [[usize; 3]; 4] = [[0, 1, 2], [0, 3, 1], [1, 3, 2], [2, 3, 0]];

/// Element types known to the host mesh.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ElementType {
    /// Linear tetrahedron (C3D4).
    Tet4,
    /// Quadratic tetrahedron (C3D10).
    Tet10,
    /// Any other host element label, kept for error reporting.
    Other(String),
}

impl ElementType {
    /// Maps a host element label to a type.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "C3D4" => ElementType::Tet4,
            "C3D10" => ElementType::Tet10,
            other => ElementType::Other(other.to_string()),
        }
    }

    /// Host label of the type.
    pub fn label(&self) -> &str {
        match self {
            ElementType::Tet4 => "C3D4",
            ElementType::Tet10 => "C3D10",
            ElementType::Other(label) => label,
        }
    }

    /// Number of nodes in the element connectivity, when known.
    pub fn node_count(&self) -> Option<usize> {
        match self {
            ElementType::Tet4 => Some(4),
            ElementType::Tet10 => Some(10),
            ElementType::Other(_) => None,
        }
    }

    /// True for the tetrahedral types with a face table.
    pub fn is_tetrahedron(&self) -> bool {
        matches!(self, ElementType::Tet4 | ElementType::Tet10)
    }

    /// Local corner indices of `face` for an element of this type.
    pub fn face_corners(&self, face: FaceRef) -> Result<[usize; 3], AdapterError> {
        if !self.is_tetrahedron() {
            return Err(unsupported(face.element(), self));
        }
        let local = face.local_face() as usize;
        TET_FACE_CORNERS
            .get(local.wrapping_sub(1))
            .copied()
            .ok_or(AdapterError::InvalidLocalFace {
                element: face.element(),
                face: face.local_face(),
            })
    }
}

pub(crate) fn unsupported(element: ElementId, kind: &ElementType) -> AdapterError {
    AdapterError::UnsupportedElement {
        element,
        kind: kind.label().to_string(),
    }
}
