#![allow(dead_code)]
use cht_adapter::{
    config::{AdapterConfig, InterfaceConfig},
    data::bc::{BoundaryTables, DirichletTable, LoadTable},
    middleware::loopback::{LoopbackMiddleware, TimeWindow},
    solver::{AnalysisKind, HostSolver, IncrementInfo, KernelFailure, SolverTime},
    topology::{ElementId, ElementType, FaceRef, HostMesh, NodeId},
};

pub const DOFS: usize = 2;

pub fn nid(u: u64) -> NodeId {
    NodeId::new(u)
}

pub fn face(element: u64, local: u8) -> FaceRef {
    FaceRef::new(ElementId::new(element), local).unwrap()
}

/// Tiny thermal solver over tetrahedra.
///
/// Each sub-iteration relaxes every free node toward the mean of the fixed
/// values by `dtheta`; fixed nodes take their boundary value.
#[derive(Clone, Debug)]
pub struct ToySolver {
    pub mesh: HostMesh,
    pub analysis: AnalysisKind,
    pub state: Vec<f64>,
    pub boundary: BoundaryTables,
    pub fixed: Vec<(NodeId, usize)>,
    pub time: SolverTime,
    pub preferred: f64,
    pub max_increments: usize,
    pub conductance: f64,
    pub fail_at: Option<(usize, usize)>,
    /// `(info, state at the start of the sub-iteration)` per call.
    pub starts: Vec<(IncrementInfo, Vec<f64>)>,
    pub outputs: Vec<usize>,
}

impl ToySolver {
    /// One C3D4 tetrahedron, nodes 1..4, all temperatures fixed (declared
    /// in order 4, 1, 2, 3), film and flux loads on face 1.
    ///
    /// Sets: `NbaseN` = {1,2,3}, `SbaseT` = {face 1}, `NtipN` = {4},
    /// `NallN` = {1,2,3,4}.
    pub fn single_tet(analysis: AnalysisKind) -> Self {
        let mut mesh = HostMesh::new(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]);
        mesh.try_add_element(ElementType::Tet4, (1..=4).map(nid).collect())
            .unwrap();
        let sets = mesh.sets_mut();
        sets.insert_node_set("NbaseN", [nid(1), nid(2), nid(3)]);
        sets.insert_encoded_face_set("SbaseT", &[11]).unwrap();
        sets.insert_node_set("NtipN", [nid(4)]);
        sets.insert_node_set("NallN", (1..=4).map(nid));

        let order = [4, 1, 2, 3];
        let dirichlet =
            DirichletTable::from_declarations(order.iter().map(|&n| (nid(n), 0, 280.0))).unwrap();
        let fixed = order
            .iter()
            .enumerate()
            .map(|(slot, &n)| (nid(n), slot))
            .collect();
        let mut loads = LoadTable::new();
        loads.push(ElementId::new(1), "S1".parse().unwrap(), [0.0, 0.0]);
        loads.push(ElementId::new(1), "F1".parse().unwrap(), [0.0, 0.0]);

        let mut state = vec![0.0; 4 * DOFS];
        for (i, t) in [280.0, 285.0, 290.0, 295.0].into_iter().enumerate() {
            state[i * DOFS] = t;
        }
        Self {
            mesh,
            analysis,
            state,
            boundary: BoundaryTables { dirichlet, loads },
            fixed,
            time: SolverTime::new(1.0, 1.0),
            preferred: 1.0,
            max_increments: 100,
            conductance: 10.0,
            fail_at: None,
            starts: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Same tetrahedron with only the base temperatures fixed.
    pub fn base_fixed(analysis: AnalysisKind) -> Self {
        let mut s = Self::single_tet(analysis);
        let order = [1, 2, 3];
        s.boundary.dirichlet =
            DirichletTable::from_declarations(order.iter().map(|&n| (nid(n), 0, 280.0))).unwrap();
        s.fixed = order
            .iter()
            .enumerate()
            .map(|(slot, &n)| (nid(n), slot))
            .collect();
        s
    }

    pub fn transient(period: f64, preferred: f64) -> Self {
        let mut s = Self::base_fixed(AnalysisKind::Transient);
        s.time = SolverTime::new(period, preferred);
        s.preferred = preferred;
        s
    }

    pub fn temperature(&self, node: u64) -> f64 {
        self.state[(node as usize - 1) * DOFS]
    }

    fn face_mean_temperature(&self, f: FaceRef) -> Result<f64, KernelFailure> {
        let corners = self
            .mesh
            .face_corner_nodes(f)
            .map_err(|e| KernelFailure::new(e.to_string()))?;
        Ok(corners.iter().map(|n| self.state[n.index() * DOFS]).sum::<f64>() / 3.0)
    }
}

impl HostSolver for ToySolver {
    fn mesh(&self) -> &HostMesh {
        &self.mesh
    }

    fn analysis(&self) -> AnalysisKind {
        self.analysis
    }

    fn dofs_per_node(&self) -> usize {
        DOFS
    }

    fn primary_state(&self) -> &[f64] {
        &self.state
    }

    fn primary_state_mut(&mut self) -> &mut [f64] {
        &mut self.state
    }

    fn boundary(&self) -> &BoundaryTables {
        &self.boundary
    }

    fn boundary_mut(&mut self) -> &mut BoundaryTables {
        &mut self.boundary
    }

    fn time(&self) -> SolverTime {
        self.time
    }

    fn set_time(&mut self, time: SolverTime) {
        self.time = time;
    }

    fn preferred_increment(&self) -> f64 {
        self.preferred
    }

    fn max_increments(&self) -> usize {
        self.max_increments
    }

    fn face_heat_flux(&self, faces: &[FaceRef], out: &mut [f64]) -> Result<(), KernelFailure> {
        for (slot, &f) in out.iter_mut().zip(faces) {
            *slot = self.conductance * (self.face_mean_temperature(f)? - 273.15);
        }
        Ok(())
    }

    fn face_heat_transfer_coefficient(
        &self,
        faces: &[FaceRef],
        out: &mut [f64],
    ) -> Result<(), KernelFailure> {
        for (slot, &f) in out.iter_mut().zip(faces) {
            *slot = self.conductance * f64::from(f.local_face());
        }
        Ok(())
    }

    fn face_sink_temperature(
        &self,
        faces: &[FaceRef],
        out: &mut [f64],
    ) -> Result<(), KernelFailure> {
        for (slot, &f) in out.iter_mut().zip(faces) {
            *slot = self.face_mean_temperature(f)?;
        }
        Ok(())
    }

    fn solve_increment(&mut self, info: &IncrementInfo) -> Result<(), KernelFailure> {
        self.starts.push((*info, self.state.clone()));
        if self.fail_at == Some((info.increment, info.attempt)) {
            return Err(KernelFailure::new("temperature residual diverged"));
        }
        let values = self.boundary.dirichlet.values();
        let mean = self.fixed.iter().map(|&(_, s)| values[s]).sum::<f64>() / self.fixed.len() as f64;
        for n in 0..self.state.len() / DOFS {
            let node = NodeId::from_index(n);
            let t = &mut self.state[n * DOFS];
            match self.fixed.iter().find(|(fixed, _)| *fixed == node) {
                Some(&(_, slot)) => *t = values[slot],
                None => *t += info.time.dtheta * (mean - *t),
            }
        }
        Ok(())
    }

    fn write_output(&mut self, increment: usize) -> Result<(), KernelFailure> {
        self.outputs.push(increment);
        Ok(())
    }
}

pub fn interface(name: &str, regions: &[&str]) -> InterfaceConfig {
    InterfaceConfig {
        name: name.to_string(),
        regions: regions.iter().map(|r| r.to_string()).collect(),
        nodes_mesh: None,
        face_centers_mesh: None,
        triangles: false,
        read_data: Vec::new(),
        write_data: Vec::new(),
    }
}

pub fn config(interfaces: Vec<InterfaceConfig>) -> AdapterConfig {
    AdapterConfig {
        participant: "Solid".to_string(),
        middleware_config: "coupling.xml".to_string(),
        interfaces,
        subcycling: true,
        output_interval: 1,
    }
}

/// Loopback with the nodes/face-centers meshes and every data name the
/// tests use.
pub fn loopback(windows: Vec<TimeWindow>) -> LoopbackMiddleware {
    LoopbackMiddleware::new(windows)
        .with_mesh("Solid-Nodes")
        .with_mesh("Solid-Faces")
        .with_data("Temperature", "Solid-Nodes")
        .with_data("Heat-Flux", "Solid-Faces")
        .with_data("Sink-Temperature-Fluid", "Solid-Faces")
        .with_data("Heat-Transfer-Coefficient-Fluid", "Solid-Faces")
}

/// Base interface reading temperature on the nodes mesh and writing heat
/// flux on the face-centers mesh.
pub fn dirichlet_interface() -> InterfaceConfig {
    let mut iface = interface("base", &["base"]);
    iface.nodes_mesh = Some("Solid-Nodes".into());
    iface.face_centers_mesh = Some("Solid-Faces".into());
    iface.read_data = vec!["Temperature".into()];
    iface.write_data = vec!["Heat-Flux".into()];
    iface
}
