//! Read-only view of the host solver mesh needed for coupling.
//!
//! Only what the mapper consumes is kept: node coordinates, element
//! connectivity with element types, and the named-set tables.

use crate::adapter_error::AdapterError;
use crate::topology::element::{ElementType, unsupported};
use crate::topology::entity::{ElementId, FaceRef, NodeId};
use crate::topology::named_sets::NamedSets;

/// One element: its type and 1-based node connectivity in host order.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Element type.
    pub kind: ElementType,
    /// Connectivity.
    pub nodes: Vec<NodeId>,
}

/// Host mesh: coordinates indexed by `NodeId::index()`, elements by
/// `ElementId::index()`.
#[derive(Clone, Debug, Default)]
pub struct HostMesh {
    coordinates: Vec<[f64; 3]>,
    elements: Vec<Element>,
    sets: NamedSets,
}

impl HostMesh {
    /// Creates a mesh from node coordinates; node `i + 1` sits at `coordinates[i]`.
    pub fn new(coordinates: Vec<[f64; 3]>) -> Self {
        Self {
            coordinates,
            elements: Vec::new(),
            sets: NamedSets::new(),
        }
    }

    /// Appends an element and returns its id.
    ///
    /// # Errors
    /// `UnknownNode` if the connectivity references a node past the
    /// coordinate array, `InvalidConfig` if a tetrahedron has the wrong
    /// number of nodes.
    pub fn try_add_element(
        &mut self,
        kind: ElementType,
        nodes: Vec<NodeId>,
    ) -> Result<ElementId, AdapterError> {
        if let Some(&bad) = nodes.iter().find(|n| n.index() >= self.coordinates.len()) {
            return Err(AdapterError::UnknownNode(bad));
        }
        if let Some(expected) = kind.node_count() {
            if nodes.len() != expected {
                return Err(AdapterError::InvalidConfig(format!(
                    "{} element needs {expected} nodes, got {}",
                    kind.label(),
                    nodes.len()
                )));
            }
        }
        self.elements.push(Element { kind, nodes });
        Ok(ElementId::from_index(self.elements.len() - 1))
    }

    /// Named sets.
    #[inline]
    pub fn sets(&self) -> &NamedSets {
        &self.sets
    }

    /// Mutable named sets, for case setup.
    #[inline]
    pub fn sets_mut(&mut self) -> &mut NamedSets {
        &mut self.sets
    }

    /// Coordinates of `node`.
    pub fn coordinates(&self, node: NodeId) -> Result<[f64; 3], AdapterError> {
        self.coordinates
            .get(node.index())
            .copied()
            .ok_or(AdapterError::UnknownNode(node))
    }

    /// Element `id`.
    pub fn element(&self, id: ElementId) -> Result<&Element, AdapterError> {
        self.elements
            .get(id.index())
            .ok_or(AdapterError::UnknownElement(id))
    }

    /// Global corner nodes of a tetrahedron face, in table order.
    pub fn face_corner_nodes(&self, face: FaceRef) -> Result<[NodeId; 3], AdapterError> {
        let element = self.element(face.element())?;
        let local = element.kind.face_corners(face)?;
        let mut corners = [NodeId::new(1); 3];
        for (slot, &l) in corners.iter_mut().zip(local.iter()) {
            *slot = *element
                .nodes
                .get(l)
                .ok_or_else(|| unsupported(face.element(), &element.kind))?;
        }
        Ok(corners)
    }

    /// Centroid of a face: average of its three corner nodes.
    pub fn face_centroid(&self, face: FaceRef) -> Result<[f64; 3], AdapterError> {
        let mut centroid = [0.0; 3];
        for node in self.face_corner_nodes(face)? {
            let xyz = self.coordinates(node)?;
            for (c, x) in centroid.iter_mut().zip(xyz) {
                *c += x;
            }
        }
        Ok(centroid.map(|c| c / 3.0))
    }
}
