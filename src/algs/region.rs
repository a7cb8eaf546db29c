//! Region resolution: named host sets → ordered coupling entities.
//!
//! A coupling interface may span several regions. Their entities are
//! concatenated in configuration order and deduplicated keeping the first
//! occurrence, so the resulting order is deterministic and fixed for the
//! lifetime of the interface.

use hashbrown::HashMap;
use itertools::Itertools;

use crate::adapter_error::AdapterError;
use crate::topology::entity::{FaceRef, NodeId};
use crate::topology::host_mesh::HostMesh;

/// Nodes of a coupling region with their coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeRegion {
    /// Ordered, deduplicated nodes.
    pub nodes: Vec<NodeId>,
    /// `coordinates[i]` belongs to `nodes[i]`.
    pub coordinates: Vec<[f64; 3]>,
}

/// Faces of a coupling region with their centroids.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceRegion {
    /// Ordered, deduplicated faces.
    pub faces: Vec<FaceRef>,
    /// `centroids[i]` belongs to `faces[i]`.
    pub centroids: Vec<[f64; 3]>,
}

fn joined_name(regions: &[String]) -> String {
    regions.join("+")
}

/// Resolves the node sets of `regions`.
///
/// # Errors
/// `NodeSetNotFound` for the first missing set, `UnknownNode` for a set
/// member outside the mesh, `EmptyRegion` when nothing is left.
pub fn resolve_node_region(mesh: &HostMesh, regions: &[String]) -> Result<NodeRegion, AdapterError> {
    let mut sets = Vec::with_capacity(regions.len());
    for region in regions {
        sets.push(mesh.sets().region_nodes(region)?);
    }
    let nodes: Vec<NodeId> = sets.into_iter().flatten().copied().unique().collect();
    if nodes.is_empty() {
        return Err(AdapterError::EmptyRegion(joined_name(regions)));
    }
    let coordinates = nodes
        .iter()
        .map(|&n| mesh.coordinates(n))
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!(
        "resolved {} nodes for region `{}`",
        nodes.len(),
        joined_name(regions)
    );
    Ok(NodeRegion { nodes, coordinates })
}

/// Resolves the face sets of `regions` and computes face centroids.
///
/// # Errors
/// `FaceSetNotFound` for the first missing set, element errors from
/// [`HostMesh::face_centroid`], `EmptyRegion` when nothing is left.
pub fn resolve_face_region(mesh: &HostMesh, regions: &[String]) -> Result<FaceRegion, AdapterError> {
    let mut sets = Vec::with_capacity(regions.len());
    for region in regions {
        sets.push(mesh.sets().region_faces(region)?);
    }
    let faces: Vec<FaceRef> = sets.into_iter().flatten().copied().unique().collect();
    if faces.is_empty() {
        return Err(AdapterError::EmptyRegion(joined_name(regions)));
    }
    let centroids = faces
        .iter()
        .map(|&f| mesh.face_centroid(f))
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!(
        "resolved {} faces for region `{}`",
        faces.len(),
        joined_name(regions)
    );
    Ok(FaceRegion { faces, centroids })
}

/// Surface triangles over a node region: one triangle per face, as
/// positions into `nodes`.
///
/// # Errors
/// `NodeNotInRegion` when a face corner is not among `nodes`.
pub fn face_triangles(
    mesh: &HostMesh,
    faces: &[FaceRef],
    nodes: &[NodeId],
    interface: &str,
) -> Result<Vec<[usize; 3]>, AdapterError> {
    let position: HashMap<NodeId, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    faces
        .iter()
        .map(|&face| {
            let corners = mesh.face_corner_nodes(face)?;
            let mut tri = [0usize; 3];
            for (slot, node) in tri.iter_mut().zip(corners) {
                *slot = *position.get(&node).ok_or_else(|| AdapterError::NodeNotInRegion {
                    interface: interface.to_string(),
                    face,
                    node,
                })?;
            }
            Ok(tri)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::element::ElementType;
    use crate::topology::entity::ElementId;

    /// Two tets sharing face (2,3,4).
    fn two_tets() -> HostMesh {
        let mut mesh = HostMesh::new(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
        ]);
        let n = NodeId::new;
        mesh.try_add_element(ElementType::Tet4, vec![n(1), n(2), n(3), n(4)])
            .unwrap();
        mesh.try_add_element(ElementType::Tet4, vec![n(2), n(3), n(4), n(5)])
            .unwrap();
        let sets = mesh.sets_mut();
        sets.insert_node_set("NbottomN", [n(1), n(2), n(3)]);
        sets.insert_node_set("NsideN", [n(3), n(1), n(4)]);
        sets.insert_encoded_face_set("SbottomT", &[11]).unwrap();
        sets.insert_encoded_face_set("SsideT", &[14, 11]).unwrap();
        sets.insert_node_set("NemptyN", []);
        mesh
    }

    #[test]
    fn nodes_concatenate_and_deduplicate() {
        let mesh = two_tets();
        let region =
            resolve_node_region(&mesh, &["bottom".to_string(), "side".to_string()]).unwrap();
        let raw: Vec<u64> = region.nodes.iter().map(|n| n.get()).collect();
        assert_eq!(raw, vec![1, 2, 3, 4]);
        assert_eq!(region.coordinates[3], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn faces_deduplicate_and_have_centroids() {
        let mesh = two_tets();
        let region = resolve_face_region(&mesh, &["bottom".to_string(), "side".to_string()]).unwrap();
        assert_eq!(region.faces.len(), 2);
        assert_eq!(region.faces[0].encode(), 11);
        assert_eq!(region.faces[1].encode(), 14);
        assert_eq!(region.centroids.len(), 2);
        // face 4 of element 1 is (3,4,1)
        let c = region.centroids[1];
        assert!((c[0] - 0.0).abs() < 1e-15);
        assert!((c[1] - 1.0 / 3.0).abs() < 1e-15);
        assert!((c[2] - 1.0 / 3.0).abs() < 1e-15);
    }

    #[test]
    fn missing_sets_are_reported_per_kind() {
        let mesh = two_tets();
        assert!(matches!(
            resolve_node_region(&mesh, &["top".to_string()]),
            Err(AdapterError::NodeSetNotFound { .. })
        ));
        assert!(matches!(
            resolve_face_region(&mesh, &["top".to_string()]),
            Err(AdapterError::FaceSetNotFound { .. })
        ));
        assert_eq!(
            resolve_node_region(&mesh, &["empty".to_string()]),
            Err(AdapterError::EmptyRegion("empty".into()))
        );
    }

    #[test]
    fn triangles_index_into_node_region() {
        let mesh = two_tets();
        let nodes = resolve_node_region(&mesh, &["bottom".to_string()]).unwrap();
        let faces = resolve_face_region(&mesh, &["bottom".to_string()]).unwrap();
        let tris = face_triangles(&mesh, &faces.faces, &nodes.nodes, "bottom").unwrap();
        assert_eq!(tris, vec![[0, 1, 2]]);
    }

    #[test]
    fn triangle_corner_outside_region_fails() {
        let mesh = two_tets();
        let nodes = resolve_node_region(&mesh, &["bottom".to_string()]).unwrap();
        let face = FaceRef::new(ElementId::new(2), 1).unwrap();
        let err = face_triangles(&mesh, &[face], &nodes.nodes, "bottom").unwrap_err();
        assert!(matches!(err, AdapterError::NodeNotInRegion { node, .. } if node == NodeId::new(4)));
    }
}
