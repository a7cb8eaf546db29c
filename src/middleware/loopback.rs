//! In-process loopback middleware.
//!
//! A deterministic single-participant stand-in for a real coupling library.
//! Time advances through a scripted list of windows; each window repeats
//! (requesting a checkpoint restore) until its scripted iteration count is
//! reached. Written data is stored per `(data, vertex)` and read back
//! unchanged, so a participant reads what it (or a test) wrote.

use hashbrown::HashMap;

use super::{Action, CouplingMiddleware, DataId, MeshId, VertexId};
use crate::adapter_error::AdapterError;

const TIME_EPS: f64 = 1e-12;

/// One scripted coupling time window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    /// Window length.
    pub size: f64,
    /// Iterations until the window counts as converged (at least 1).
    pub iterations: usize,
}

impl TimeWindow {
    /// Window converging after `iterations` passes.
    pub fn new(size: f64, iterations: usize) -> Self {
        Self {
            size,
            iterations: iterations.max(1),
        }
    }
}

/// Recorded middleware call, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    /// `initialize`.
    Initialize,
    /// `initialize_data`.
    InitializeData,
    /// `advance` with the step used.
    Advance(f64),
    /// An action was fulfilled.
    Fulfilled(Action),
    /// Block read of one data field.
    Read(DataId),
    /// Block write of one data field.
    Write(DataId),
    /// `finalize`.
    Finalize,
}

#[derive(Debug, Default)]
struct MeshRecord {
    name: String,
    vertices: Vec<[f64; 3]>,
    triangles: Vec<[VertexId; 3]>,
}

#[derive(Debug)]
struct DataRecord {
    name: String,
    mesh: MeshId,
}

/// Scripted in-process middleware.
#[derive(Debug)]
pub struct LoopbackMiddleware {
    windows: Vec<TimeWindow>,
    implicit: bool,
    initial_data: bool,
    meshes: Vec<MeshRecord>,
    data: Vec<DataRecord>,
    values: HashMap<(DataId, VertexId), f64>,
    pending: Vec<Action>,
    calls: Vec<Call>,
    window: usize,
    iteration: usize,
    window_time: f64,
    read_available: bool,
    initialized: bool,
    finalized: bool,
}

impl LoopbackMiddleware {
    /// Middleware that runs through `windows`.
    ///
    /// The scheme is implicit (checkpoint actions at every window start)
    /// when any window needs more than one iteration.
    pub fn new(windows: impl IntoIterator<Item = TimeWindow>) -> Self {
        let windows: Vec<_> = windows.into_iter().collect();
        let implicit = windows.iter().any(|w| w.iterations > 1);
        Self {
            windows,
            implicit,
            initial_data: false,
            meshes: Vec::new(),
            data: Vec::new(),
            values: HashMap::new(),
            pending: Vec::new(),
            calls: Vec::new(),
            window: 0,
            iteration: 1,
            window_time: 0.0,
            read_available: false,
            initialized: false,
            finalized: false,
        }
    }

    /// `count` explicit windows of equal `size`.
    pub fn uniform(size: f64, count: usize) -> Self {
        Self::new((0..count).map(|_| TimeWindow::new(size, 1)))
    }

    /// Declares a coupling mesh.
    pub fn with_mesh(mut self, name: &str) -> Self {
        self.meshes.push(MeshRecord {
            name: name.to_string(),
            ..Default::default()
        });
        self
    }

    /// Declares data `name` on the previously declared mesh `mesh`.
    ///
    /// # Panics
    /// If `mesh` was not declared.
    pub fn with_data(mut self, name: &str, mesh: &str) -> Self {
        let mesh = self
            .meshes
            .iter()
            .position(|m| m.name == mesh)
            .unwrap_or_else(|| panic!("mesh `{mesh}` must be declared before its data"));
        self.data.push(DataRecord {
            name: name.to_string(),
            mesh: MeshId(mesh as u32),
        });
        self
    }

    /// Requires the write-initial-data action after `initialize`.
    pub fn with_initial_data(mut self) -> Self {
        self.initial_data = true;
        self
    }

    /// Forces implicit (checkpointing) or explicit coupling.
    pub fn implicit(mut self, implicit: bool) -> Self {
        self.implicit = implicit;
        self
    }

    /// Calls received so far.
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Vertex positions registered on `mesh`.
    pub fn vertices(&self, mesh: MeshId) -> &[[f64; 3]] {
        self.meshes
            .get(mesh.0 as usize)
            .map_or(&[], |m| m.vertices.as_slice())
    }

    /// Triangles registered on `mesh`.
    pub fn triangles(&self, mesh: MeshId) -> &[[VertexId; 3]] {
        self.meshes
            .get(mesh.0 as usize)
            .map_or(&[], |m| m.triangles.as_slice())
    }

    /// Last value stored for `(data, vertex)`.
    pub fn value(&self, data: DataId, vertex: VertexId) -> Option<f64> {
        self.values.get(&(data, vertex)).copied()
    }

    /// True after `finalize`.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn current(&self) -> Option<TimeWindow> {
        self.windows.get(self.window).copied()
    }

    fn remaining(&self) -> f64 {
        self.current().map_or(0.0, |w| w.size - self.window_time)
    }

    fn require(&mut self, action: Action) {
        if !self.pending.contains(&action) {
            self.pending.push(action);
        }
    }

    fn open_window(&mut self) {
        self.iteration = 1;
        self.window_time = 0.0;
        if self.implicit && self.current().is_some() {
            self.require(Action::WriteIterationCheckpoint);
        }
    }

    fn data_record(&self, data: DataId) -> Result<&DataRecord, AdapterError> {
        self.data
            .get(data.0 as usize)
            .ok_or_else(|| AdapterError::Middleware(format!("unknown data id {data}")))
    }

    fn check_vertices(&self, data: DataId, vertices: &[VertexId], len: usize) -> Result<(), AdapterError> {
        let record = self.data_record(data)?;
        if vertices.len() != len {
            return Err(AdapterError::BufferLengthMismatch {
                expected: vertices.len(),
                found: len,
            });
        }
        let count = self.meshes[record.mesh.0 as usize].vertices.len();
        match vertices.iter().find(|v| v.0 as usize >= count) {
            Some(v) => Err(AdapterError::Middleware(format!(
                "vertex {v} is not on the mesh of data `{}`",
                record.name
            ))),
            None => Ok(()),
        }
    }
}

impl CouplingMiddleware for LoopbackMiddleware {
    fn mesh_id(&self, name: &str) -> Result<MeshId, AdapterError> {
        self.meshes
            .iter()
            .position(|m| m.name == name)
            .map(|i| MeshId(i as u32))
            .ok_or_else(|| AdapterError::Middleware(format!("mesh `{name}` is not configured")))
    }

    fn set_mesh_vertices(
        &mut self,
        mesh: MeshId,
        positions: &[[f64; 3]],
    ) -> Result<Vec<VertexId>, AdapterError> {
        let record = self
            .meshes
            .get_mut(mesh.0 as usize)
            .ok_or_else(|| AdapterError::Middleware(format!("unknown mesh id {mesh}")))?;
        let first = record.vertices.len() as u32;
        record.vertices.extend_from_slice(positions);
        Ok((0..positions.len() as u32).map(|i| VertexId(first + i)).collect())
    }

    fn set_mesh_triangle_with_edges(
        &mut self,
        mesh: MeshId,
        corners: [VertexId; 3],
    ) -> Result<(), AdapterError> {
        let record = self
            .meshes
            .get_mut(mesh.0 as usize)
            .ok_or_else(|| AdapterError::Middleware(format!("unknown mesh id {mesh}")))?;
        if let Some(v) = corners.iter().find(|v| v.0 as usize >= record.vertices.len()) {
            return Err(AdapterError::Middleware(format!(
                "triangle corner {v} is not a vertex of mesh `{}`",
                record.name
            )));
        }
        record.triangles.push(corners);
        Ok(())
    }

    fn data_id(&self, name: &str, mesh: MeshId) -> Result<DataId, AdapterError> {
        self.data
            .iter()
            .position(|d| d.name == name && d.mesh == mesh)
            .map(|i| DataId(i as u32))
            .ok_or_else(|| {
                AdapterError::Middleware(format!("data `{name}` is not configured on mesh {mesh}"))
            })
    }

    fn initialize(&mut self) -> Result<f64, AdapterError> {
        if self.initialized {
            return Err(AdapterError::Middleware("initialize called twice".into()));
        }
        self.calls.push(Call::Initialize);
        self.initialized = true;
        self.window = 0;
        self.open_window();
        if self.initial_data {
            self.require(Action::WriteInitialData);
        }
        Ok(self.remaining())
    }

    fn initialize_data(&mut self) -> Result<(), AdapterError> {
        if self.pending.contains(&Action::WriteInitialData) {
            return Err(AdapterError::Middleware(
                "initial data was not written before initialize_data".into(),
            ));
        }
        self.calls.push(Call::InitializeData);
        self.read_available = true;
        Ok(())
    }

    fn advance(&mut self, dt: f64) -> Result<f64, AdapterError> {
        let Some(window) = self.current() else {
            return Err(AdapterError::Middleware("advance after coupling ended".into()));
        };
        if dt > self.remaining() + TIME_EPS {
            return Err(AdapterError::Middleware(format!(
                "step {dt} exceeds the remaining window time {}",
                self.remaining()
            )));
        }
        self.calls.push(Call::Advance(dt));
        // a pending checkpoint request expires with the step it was issued for
        self.pending.retain(|&a| a != Action::WriteIterationCheckpoint);
        self.window_time += dt;
        if self.window_time < window.size - TIME_EPS {
            self.read_available = false;
            return Ok(self.remaining());
        }
        self.read_available = true;
        if self.iteration < window.iterations {
            self.iteration += 1;
            self.window_time = 0.0;
            self.require(Action::ReadIterationCheckpoint);
        } else {
            self.window += 1;
            self.open_window();
        }
        Ok(self.remaining())
    }

    fn is_coupling_ongoing(&self) -> bool {
        !self.finalized && self.window < self.windows.len()
    }

    fn is_read_data_available(&self) -> bool {
        self.read_available
    }

    fn is_write_data_required(&self, dt: f64) -> bool {
        self.window_time + dt >= self.current().map_or(0.0, |w| w.size) - TIME_EPS
    }

    fn is_action_required(&self, action: Action) -> bool {
        self.pending.contains(&action)
    }

    fn fulfilled_action(&mut self, action: Action) -> Result<(), AdapterError> {
        let Some(pos) = self.pending.iter().position(|&a| a == action) else {
            return Err(AdapterError::Middleware(format!(
                "action `{action}` fulfilled but not required"
            )));
        };
        self.pending.remove(pos);
        self.calls.push(Call::Fulfilled(action));
        Ok(())
    }

    fn read_block_scalar_data(
        &mut self,
        data: DataId,
        vertices: &[VertexId],
        values: &mut [f64],
    ) -> Result<(), AdapterError> {
        self.check_vertices(data, vertices, values.len())?;
        self.calls.push(Call::Read(data));
        for (slot, &v) in values.iter_mut().zip(vertices) {
            *slot = self.values.get(&(data, v)).copied().unwrap_or(0.0);
        }
        Ok(())
    }

    fn write_block_scalar_data(
        &mut self,
        data: DataId,
        vertices: &[VertexId],
        values: &[f64],
    ) -> Result<(), AdapterError> {
        self.check_vertices(data, vertices, values.len())?;
        self.calls.push(Call::Write(data));
        for (&v, &x) in vertices.iter().zip(values) {
            self.values.insert((data, v), x);
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), AdapterError> {
        if self.finalized {
            return Err(AdapterError::Middleware("finalize called twice".into()));
        }
        self.calls.push(Call::Finalize);
        self.finalized = true;
        Ok(())
    }
}
