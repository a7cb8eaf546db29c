//! Coupling interfaces: resolved regions, registered meshes and channels.
//!
//! An interface is built once at setup. Its entity order, and therefore the
//! vertex order on the middleware side, never changes afterwards.

use crate::adapter_error::AdapterError;
use crate::algs::region::{face_triangles, resolve_face_region, resolve_node_region};
use crate::config::InterfaceConfig;
use crate::data::bc::BoundaryTables;
use crate::data::channel::{ReadChannel, RegionEntities, WriteChannel};
use crate::data::quantity::{Direction, MeshLocation, Quantity};
use crate::debug_invariants::DebugInvariants;
use crate::middleware::{CouplingMiddleware, MeshId, VertexId};
use crate::solver::HostSolver;
use crate::topology::entity::{FaceRef, NodeId};

/// Middleware mesh over region nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeMesh {
    /// Middleware mesh name.
    pub name: String,
    /// Middleware mesh handle.
    pub mesh_id: MeshId,
    /// Region nodes in vertex order.
    pub nodes: Vec<NodeId>,
    /// Node coordinates.
    pub coordinates: Vec<[f64; 3]>,
    /// `vertex_ids[i]` is the vertex of `nodes[i]`.
    pub vertex_ids: Vec<VertexId>,
    /// Registered triangles as positions into `nodes`.
    pub triangles: Vec<[usize; 3]>,
}

/// Middleware mesh over region face centroids.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceMesh {
    /// Middleware mesh name.
    pub name: String,
    /// Middleware mesh handle.
    pub mesh_id: MeshId,
    /// Region faces in vertex order.
    pub faces: Vec<FaceRef>,
    /// Face centroids.
    pub centroids: Vec<[f64; 3]>,
    /// `vertex_ids[i]` is the vertex of `faces[i]`.
    pub vertex_ids: Vec<VertexId>,
}

/// One named coupling surface of the participant.
#[derive(Clone, Debug, PartialEq)]
pub struct CouplingInterface {
    name: String,
    regions: Vec<String>,
    nodes: Option<NodeMesh>,
    faces: Option<FaceMesh>,
    read_channels: Vec<ReadChannel>,
    write_channels: Vec<WriteChannel>,
}

fn mesh_not_provided(interface: &str, location: MeshLocation, data: &str) -> AdapterError {
    AdapterError::MeshNotProvided {
        interface: interface.to_string(),
        mesh: location.describe(),
        quantity: data.to_string(),
    }
}

fn entities_of<'a>(
    nodes: &'a Option<NodeMesh>,
    faces: &'a Option<FaceMesh>,
    location: MeshLocation,
) -> Option<(RegionEntities<'a>, &'a [VertexId])> {
    match location {
        MeshLocation::Nodes => nodes
            .as_ref()
            .map(|m| (RegionEntities::Nodes(&m.nodes), m.vertex_ids.as_slice())),
        MeshLocation::FaceCenters => faces
            .as_ref()
            .map(|m| (RegionEntities::Faces(&m.faces), m.vertex_ids.as_slice())),
    }
}

impl CouplingInterface {
    /// Resolves regions, registers meshes and builds channels.
    ///
    /// Quantity names and mesh requirements are checked before anything is
    /// registered with the middleware.
    pub fn build<S, M>(
        config: &InterfaceConfig,
        solver: &S,
        middleware: &mut M,
    ) -> Result<Self, AdapterError>
    where
        S: HostSolver + ?Sized,
        M: CouplingMiddleware + ?Sized,
    {
        let mut data = Vec::new();
        for (name, direction) in config.data() {
            let quantity = Quantity::from_data_name(name, direction)?;
            let location = quantity.location();
            let provided = match location {
                MeshLocation::Nodes => config.nodes_mesh.is_some(),
                MeshLocation::FaceCenters => config.face_centers_mesh.is_some(),
            };
            if !provided {
                return Err(mesh_not_provided(&config.name, location, name));
            }
            data.push((name, direction, quantity));
        }

        let mesh = solver.mesh();
        let nodes = match &config.nodes_mesh {
            Some(mesh_name) => {
                let region = resolve_node_region(mesh, &config.regions)?;
                let mesh_id = middleware.mesh_id(mesh_name)?;
                let vertex_ids = middleware.set_mesh_vertices(mesh_id, &region.coordinates)?;
                let triangles = if config.triangles {
                    let faces = resolve_face_region(mesh, &config.regions)?;
                    let tris = face_triangles(mesh, &faces.faces, &region.nodes, &config.name)?;
                    for tri in &tris {
                        middleware.set_mesh_triangle_with_edges(
                            mesh_id,
                            [vertex_ids[tri[0]], vertex_ids[tri[1]], vertex_ids[tri[2]]],
                        )?;
                    }
                    tris
                } else {
                    Vec::new()
                };
                Some(NodeMesh {
                    name: mesh_name.clone(),
                    mesh_id,
                    nodes: region.nodes,
                    coordinates: region.coordinates,
                    vertex_ids,
                    triangles,
                })
            }
            None => None,
        };
        let faces = match &config.face_centers_mesh {
            Some(mesh_name) => {
                let region = resolve_face_region(mesh, &config.regions)?;
                let mesh_id = middleware.mesh_id(mesh_name)?;
                let vertex_ids = middleware.set_mesh_vertices(mesh_id, &region.centroids)?;
                Some(FaceMesh {
                    name: mesh_name.clone(),
                    mesh_id,
                    faces: region.faces,
                    centroids: region.centroids,
                    vertex_ids,
                })
            }
            None => None,
        };

        let tables = solver.boundary();
        let mut read_channels = Vec::new();
        let mut write_channels = Vec::new();
        for (name, direction, quantity) in data {
            let location = quantity.location();
            let (entities, _) = entities_of(&nodes, &faces, location)
                .ok_or_else(|| mesh_not_provided(&config.name, location, name))?;
            let mesh_id = match location {
                MeshLocation::Nodes => nodes.as_ref().map(|m| m.mesh_id),
                MeshLocation::FaceCenters => faces.as_ref().map(|m| m.mesh_id),
            }
            .ok_or_else(|| mesh_not_provided(&config.name, location, name))?;
            let data_id = middleware.data_id(name, mesh_id)?;
            match direction {
                Direction::Read => {
                    read_channels.push(ReadChannel::build(quantity, name, data_id, entities, tables)?)
                }
                Direction::Write => {
                    write_channels.push(WriteChannel::new(quantity, name, data_id, entities.len()))
                }
            }
        }

        let iface = Self {
            name: config.name.clone(),
            regions: config.regions.clone(),
            nodes,
            faces,
            read_channels,
            write_channels,
        };
        iface.debug_assert_invariants();
        log::info!(
            "interface `{}`: {} nodes, {} faces, {} read / {} write channels",
            iface.name,
            iface.nodes.as_ref().map_or(0, |m| m.nodes.len()),
            iface.faces.as_ref().map_or(0, |m| m.faces.len()),
            iface.read_channels.len(),
            iface.write_channels.len()
        );
        Ok(iface)
    }

    /// Interface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Host regions.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Nodes mesh, if configured.
    pub fn node_mesh(&self) -> Option<&NodeMesh> {
        self.nodes.as_ref()
    }

    /// Face-centers mesh, if configured.
    pub fn face_mesh(&self) -> Option<&FaceMesh> {
        self.faces.as_ref()
    }

    /// Read channels in configuration order.
    pub fn read_channels(&self) -> &[ReadChannel] {
        &self.read_channels
    }

    /// Write channels in configuration order.
    pub fn write_channels(&self) -> &[WriteChannel] {
        &self.write_channels
    }

    /// Imports every read channel into `tables`.
    pub fn read_coupling_data<M: CouplingMiddleware + ?Sized>(
        &mut self,
        middleware: &mut M,
        tables: &mut BoundaryTables,
    ) -> Result<(), AdapterError> {
        for channel in &mut self.read_channels {
            let location = channel.quantity().location();
            let (_, vertices) = entities_of(&self.nodes, &self.faces, location)
                .ok_or_else(|| mesh_not_provided(&self.name, location, channel.data_name()))?;
            channel.receive(middleware, vertices, tables)?;
        }
        Ok(())
    }

    /// Exports every write channel from `solver`.
    pub fn write_coupling_data<S, M>(
        &mut self,
        solver: &S,
        middleware: &mut M,
    ) -> Result<(), AdapterError>
    where
        S: HostSolver + ?Sized,
        M: CouplingMiddleware + ?Sized,
    {
        for channel in &mut self.write_channels {
            let location = channel.quantity().location();
            let (entities, vertices) = entities_of(&self.nodes, &self.faces, location)
                .ok_or_else(|| mesh_not_provided(&self.name, location, channel.data_name()))?;
            channel.send(solver, entities, middleware, vertices)?;
        }
        Ok(())
    }
}

impl DebugInvariants for CouplingInterface {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "CouplingInterface");
    }

    /// Vertex handles are index-aligned with entities, channels sized to them.
    fn validate_invariants(&self) -> Result<(), AdapterError> {
        let misaligned = |what: &str| {
            AdapterError::InvalidConfig(format!(
                "interface `{}`: {what} not aligned with region entities",
                self.name
            ))
        };
        if let Some(m) = &self.nodes {
            if m.vertex_ids.len() != m.nodes.len() || m.coordinates.len() != m.nodes.len() {
                return Err(misaligned("nodes mesh vertices"));
            }
            if m.triangles.iter().flatten().any(|&p| p >= m.nodes.len()) {
                return Err(misaligned("triangles"));
            }
        }
        if let Some(m) = &self.faces {
            if m.vertex_ids.len() != m.faces.len() || m.centroids.len() != m.faces.len() {
                return Err(misaligned("face-centers mesh vertices"));
            }
        }
        for ch in &self.read_channels {
            let expected = entities_of(&self.nodes, &self.faces, ch.quantity().location())
                .map(|(e, _)| e.len());
            if expected != Some(ch.len()) {
                return Err(misaligned(ch.data_name()));
            }
        }
        for ch in &self.write_channels {
            let expected = entities_of(&self.nodes, &self.faces, ch.quantity().location())
                .map(|(e, _)| e.len());
            if expected != Some(ch.len()) {
                return Err(misaligned(ch.data_name()));
            }
        }
        Ok(())
    }
}
