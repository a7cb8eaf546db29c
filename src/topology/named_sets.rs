//! Named entity sets of the host mesh.
//!
//! The host keeps node sets and face (surface) sets by name. A coupling
//! region `R` is stored as node set `NRN` and face set `SRT`; lookups by
//! region apply that decoration and fail with distinct errors so the user
//! knows which set is missing from the case file.

use hashbrown::HashMap;

use crate::adapter_error::AdapterError;
use crate::topology::entity::{FaceRef, NodeId};

/// Decorated node-set name of a region.
pub fn node_set_name(region: &str) -> String {
    format!("N{region}N")
}

/// Decorated face-set name of a region.
pub fn face_set_name(region: &str) -> String {
    format!("S{region}T")
}

/// Named node and face sets, in host order.
#[derive(Clone, Debug, Default)]
pub struct NamedSets {
    nodes: HashMap<String, Vec<NodeId>>,
    faces: HashMap<String, Vec<FaceRef>>,
}

impl NamedSets {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores node set `name`, replacing any previous set of that name.
    pub fn insert_node_set(
        &mut self,
        name: impl Into<String>,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> Option<Vec<NodeId>> {
        self.nodes.insert(name.into(), nodes.into_iter().collect())
    }

    /// Stores face set `name` from the host encoding `element * 10 + face`.
    pub fn insert_encoded_face_set(
        &mut self,
        name: impl Into<String>,
        codes: &[u64],
    ) -> Result<(), AdapterError> {
        let faces = codes
            .iter()
            .map(|&code| FaceRef::decode(code))
            .collect::<Result<Vec<_>, _>>()?;
        self.faces.insert(name.into(), faces);
        Ok(())
    }

    /// Raw node set by its stored name.
    pub fn node_set(&self, name: &str) -> Option<&[NodeId]> {
        self.nodes.get(name).map(Vec::as_slice)
    }

    /// Raw face set by its stored name.
    pub fn face_set(&self, name: &str) -> Option<&[FaceRef]> {
        self.faces.get(name).map(Vec::as_slice)
    }

    /// Node set of coupling region `region`.
    pub fn region_nodes(&self, region: &str) -> Result<&[NodeId], AdapterError> {
        let set = node_set_name(region);
        self.node_set(&set)
            .ok_or_else(|| AdapterError::NodeSetNotFound {
                region: region.to_string(),
                set,
            })
    }

    /// Face set of coupling region `region`.
    pub fn region_faces(&self, region: &str) -> Result<&[FaceRef], AdapterError> {
        let set = face_set_name(region);
        self.face_set(&set)
            .ok_or_else(|| AdapterError::FaceSetNotFound {
                region: region.to_string(),
                set,
            })
    }
}
