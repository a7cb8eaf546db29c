//! Directional data channels between host state and middleware buffers.
//!
//! A read channel overwrites host boundary values through its index table; a
//! write channel extracts a quantity from host state. Each owns a scratch
//! buffer sized to its region's entity count. Channels are closed enums over
//! the supported quantities.

use crate::adapter_error::AdapterError;
use crate::algs::index_lookup::{LoadSlot, load_indices, temperature_indices};
use crate::data::bc::BoundaryTables;
use crate::data::index_table::IndexTable;
use crate::data::quantity::{Direction, MeshLocation, Quantity};
use crate::middleware::{CouplingMiddleware, DataId, VertexId};
use crate::solver::HostSolver;
use crate::topology::entity::{FaceRef, NodeId};

/// Entities of one coupling mesh, in interface order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RegionEntities<'a> {
    /// Nodes mesh.
    Nodes(&'a [NodeId]),
    /// Face-centers mesh.
    Faces(&'a [FaceRef]),
}

impl RegionEntities<'_> {
    /// Entity count.
    pub fn len(&self) -> usize {
        match self {
            RegionEntities::Nodes(n) => n.len(),
            RegionEntities::Faces(f) => f.len(),
        }
    }

    /// True without entities.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mesh kind of the entities.
    pub fn location(&self) -> MeshLocation {
        match self {
            RegionEntities::Nodes(_) => MeshLocation::Nodes,
            RegionEntities::Faces(_) => MeshLocation::FaceCenters,
        }
    }

    fn nodes(&self, quantity: Quantity) -> Result<&[NodeId], AdapterError> {
        match self {
            RegionEntities::Nodes(n) => Ok(n),
            RegionEntities::Faces(_) => Err(wrong_mesh(quantity)),
        }
    }

    fn faces(&self, quantity: Quantity) -> Result<&[FaceRef], AdapterError> {
        match self {
            RegionEntities::Faces(f) => Ok(f),
            RegionEntities::Nodes(_) => Err(wrong_mesh(quantity)),
        }
    }
}

fn wrong_mesh(quantity: Quantity) -> AdapterError {
    AdapterError::InvalidConfig(format!(
        "{quantity} must be exchanged on the {} mesh",
        quantity.location().describe()
    ))
}

/// Middleware identity and scratch buffer shared by both directions.
#[derive(Clone, Debug, PartialEq)]
pub struct Port {
    data_name: String,
    data_id: DataId,
    buffer: Vec<f64>,
}

impl Port {
    fn new(data_name: &str, data_id: DataId, len: usize) -> Self {
        Self {
            data_name: data_name.to_string(),
            data_id,
            buffer: vec![0.0; len],
        }
    }

    /// Middleware data name.
    pub fn data_name(&self) -> &str {
        &self.data_name
    }

    /// Middleware data handle.
    pub fn data_id(&self) -> DataId {
        self.data_id
    }

    /// Last exchanged values.
    pub fn buffer(&self) -> &[f64] {
        &self.buffer
    }
}

/// Read port: buffer plus immutable index table.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadPort {
    port: Port,
    table: IndexTable,
}

impl ReadPort {
    /// Shared port data.
    pub fn port(&self) -> &Port {
        &self.port
    }

    /// Buffer position → boundary slot table.
    pub fn table(&self) -> &IndexTable {
        &self.table
    }
}

/// Channel importing a quantity into host boundary conditions.
#[derive(Clone, Debug, PartialEq)]
pub enum ReadChannel {
    /// Fixed nodal temperature.
    Temperature(ReadPort),
    /// Distributed face flux.
    HeatFlux(ReadPort),
    /// Sink temperature of a face film.
    SinkTemperature(ReadPort),
    /// Coefficient of a face film.
    HeatTransferCoefficient(ReadPort),
}

impl ReadChannel {
    /// Resolves the index table of `quantity` over `entities`.
    ///
    /// # Errors
    /// `MissingBoundaryCondition` naming the family when an entity has no
    /// matching host declaration.
    pub fn build(
        quantity: Quantity,
        data_name: &str,
        data_id: DataId,
        entities: RegionEntities<'_>,
        tables: &BoundaryTables,
    ) -> Result<Self, AdapterError> {
        let table = match LoadSlot::of(quantity) {
            None => temperature_indices(entities.nodes(quantity)?, tables)?,
            Some(slot) => load_indices(entities.faces(quantity)?, slot, tables)?,
        };
        let read = ReadPort {
            port: Port::new(data_name, data_id, table.len()),
            table,
        };
        Ok(match quantity {
            Quantity::Temperature => ReadChannel::Temperature(read),
            Quantity::HeatFlux => ReadChannel::HeatFlux(read),
            Quantity::SinkTemperature => ReadChannel::SinkTemperature(read),
            Quantity::HeatTransferCoefficient => ReadChannel::HeatTransferCoefficient(read),
        })
    }

    /// Quantity kind.
    pub fn quantity(&self) -> Quantity {
        match self {
            ReadChannel::Temperature(_) => Quantity::Temperature,
            ReadChannel::HeatFlux(_) => Quantity::HeatFlux,
            ReadChannel::SinkTemperature(_) => Quantity::SinkTemperature,
            ReadChannel::HeatTransferCoefficient(_) => Quantity::HeatTransferCoefficient,
        }
    }

    /// Always [`Direction::Read`].
    pub fn direction(&self) -> Direction {
        Direction::Read
    }

    /// Port and index table.
    pub fn read_port(&self) -> &ReadPort {
        match self {
            ReadChannel::Temperature(p)
            | ReadChannel::HeatFlux(p)
            | ReadChannel::SinkTemperature(p)
            | ReadChannel::HeatTransferCoefficient(p) => p,
        }
    }

    fn read_port_mut(&mut self) -> &mut ReadPort {
        match self {
            ReadChannel::Temperature(p)
            | ReadChannel::HeatFlux(p)
            | ReadChannel::SinkTemperature(p)
            | ReadChannel::HeatTransferCoefficient(p) => p,
        }
    }

    /// Middleware data handle.
    pub fn data_id(&self) -> DataId {
        self.read_port().port.data_id
    }

    /// Middleware data name.
    pub fn data_name(&self) -> &str {
        &self.read_port().port.data_name
    }

    /// Entity count.
    pub fn len(&self) -> usize {
        self.read_port().table.len()
    }

    /// True for an empty region.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrites the addressed boundary values with `buffer`, entity by entity.
    pub fn read(&self, buffer: &[f64], tables: &mut BoundaryTables) -> Result<(), AdapterError> {
        self.read_port().table.scatter(buffer, tables)
    }

    /// Pulls this channel's data from the middleware and applies it.
    pub fn receive<M: CouplingMiddleware + ?Sized>(
        &mut self,
        middleware: &mut M,
        vertices: &[VertexId],
        tables: &mut BoundaryTables,
    ) -> Result<(), AdapterError> {
        let read = self.read_port_mut();
        middleware.read_block_scalar_data(read.port.data_id, vertices, &mut read.port.buffer)?;
        read.table.scatter(&read.port.buffer, tables)
    }
}

/// Channel exporting a quantity from host state.
#[derive(Clone, Debug, PartialEq)]
pub enum WriteChannel {
    /// Nodal temperature from the primary state.
    Temperature(Port),
    /// Face heat flux.
    HeatFlux(Port),
    /// Near-wall sink temperature of each face.
    SinkTemperature(Port),
    /// Face heat-transfer coefficient.
    HeatTransferCoefficient(Port),
}

impl WriteChannel {
    /// Channel for `quantity` over `len` entities.
    pub fn new(quantity: Quantity, data_name: &str, data_id: DataId, len: usize) -> Self {
        let port = Port::new(data_name, data_id, len);
        match quantity {
            Quantity::Temperature => WriteChannel::Temperature(port),
            Quantity::HeatFlux => WriteChannel::HeatFlux(port),
            Quantity::SinkTemperature => WriteChannel::SinkTemperature(port),
            Quantity::HeatTransferCoefficient => WriteChannel::HeatTransferCoefficient(port),
        }
    }

    /// Quantity kind.
    pub fn quantity(&self) -> Quantity {
        match self {
            WriteChannel::Temperature(_) => Quantity::Temperature,
            WriteChannel::HeatFlux(_) => Quantity::HeatFlux,
            WriteChannel::SinkTemperature(_) => Quantity::SinkTemperature,
            WriteChannel::HeatTransferCoefficient(_) => Quantity::HeatTransferCoefficient,
        }
    }

    /// Always [`Direction::Write`].
    pub fn direction(&self) -> Direction {
        Direction::Write
    }

    /// Port.
    pub fn port(&self) -> &Port {
        match self {
            WriteChannel::Temperature(p)
            | WriteChannel::HeatFlux(p)
            | WriteChannel::SinkTemperature(p)
            | WriteChannel::HeatTransferCoefficient(p) => p,
        }
    }

    fn port_mut(&mut self) -> &mut Port {
        match self {
            WriteChannel::Temperature(p)
            | WriteChannel::HeatFlux(p)
            | WriteChannel::SinkTemperature(p)
            | WriteChannel::HeatTransferCoefficient(p) => p,
        }
    }

    /// Middleware data handle.
    pub fn data_id(&self) -> DataId {
        self.port().data_id
    }

    /// Middleware data name.
    pub fn data_name(&self) -> &str {
        &self.port().data_name
    }

    /// Entity count.
    pub fn len(&self) -> usize {
        self.port().buffer.len()
    }

    /// True for an empty region.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extracts the quantity for every entity into the channel buffer.
    ///
    /// Reads host state only; nothing is recomputed.
    pub fn write<S: HostSolver + ?Sized>(
        &mut self,
        solver: &S,
        entities: RegionEntities<'_>,
    ) -> Result<&[f64], AdapterError> {
        let quantity = self.quantity();
        let expected = self.len();
        if entities.len() != expected {
            return Err(AdapterError::BufferLengthMismatch {
                expected,
                found: entities.len(),
            });
        }
        match self {
            WriteChannel::Temperature(port) => {
                let nodes = entities.nodes(quantity)?;
                for (slot, &node) in port.buffer.iter_mut().zip(nodes) {
                    *slot = solver
                        .node_temperature(node)
                        .ok_or(AdapterError::UnknownNode(node))?;
                }
            }
            WriteChannel::HeatFlux(port) => {
                solver.face_heat_flux(entities.faces(quantity)?, &mut port.buffer)?
            }
            WriteChannel::SinkTemperature(port) => {
                solver.face_sink_temperature(entities.faces(quantity)?, &mut port.buffer)?
            }
            WriteChannel::HeatTransferCoefficient(port) => solver
                .face_heat_transfer_coefficient(entities.faces(quantity)?, &mut port.buffer)?,
        }
        Ok(&self.port().buffer)
    }

    /// Extracts the quantity and pushes it to the middleware.
    pub fn send<S: HostSolver + ?Sized, M: CouplingMiddleware + ?Sized>(
        &mut self,
        solver: &S,
        entities: RegionEntities<'_>,
        middleware: &mut M,
        vertices: &[VertexId],
    ) -> Result<(), AdapterError> {
        self.write(solver, entities)?;
        let port = self.port_mut();
        middleware.write_block_scalar_data(port.data_id, vertices, &port.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter_error::BcFamily;
    use crate::data::bc::{DirichletTable, LoadTable};
    use crate::topology::entity::ElementId;

    fn tables() -> BoundaryTables {
        let mut loads = LoadTable::new();
        loads.push(ElementId::new(1), "F1".parse().unwrap(), [0.0, 0.0]);
        loads.push(ElementId::new(1), "S1".parse().unwrap(), [0.0, 0.0]);
        BoundaryTables {
            dirichlet: DirichletTable::from_declarations(
                (1..=4).map(|n| (NodeId::new(n), 0, 0.0)),
            )
            .unwrap(),
            loads,
        }
    }

    #[test]
    fn temperature_read_touches_one_value() {
        let mut t = tables();
        let nodes = [NodeId::new(2)];
        let ch = ReadChannel::build(
            Quantity::Temperature,
            "Temperature",
            DataId(0),
            RegionEntities::Nodes(&nodes),
            &t,
        )
        .unwrap();
        ch.read(&[300.0], &mut t).unwrap();
        assert_eq!(t.dirichlet.values(), &[0.0, 300.0, 0.0, 0.0]);
        assert_eq!(ch.direction(), Direction::Read);
    }

    #[test]
    fn robin_pair_writes_disjoint_components() {
        let faces = [FaceRef::new(ElementId::new(1), 1).unwrap()];
        let base = tables();
        let sink = ReadChannel::build(
            Quantity::SinkTemperature,
            "Sink-Temperature-Fluid",
            DataId(0),
            RegionEntities::Faces(&faces),
            &base,
        )
        .unwrap();
        let htc = ReadChannel::build(
            Quantity::HeatTransferCoefficient,
            "Heat-Transfer-Coefficient-Fluid",
            DataId(1),
            RegionEntities::Faces(&faces),
            &base,
        )
        .unwrap();

        let mut a = base.clone();
        sink.read(&[290.0], &mut a).unwrap();
        htc.read(&[15.0], &mut a).unwrap();
        let mut b = base.clone();
        htc.read(&[15.0], &mut b).unwrap();
        sink.read(&[290.0], &mut b).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a.loads.values()[..2], &[15.0, 290.0]);
    }

    #[test]
    fn missing_flux_declaration_is_fatal() {
        let faces = [FaceRef::new(ElementId::new(2), 1).unwrap()];
        let err = ReadChannel::build(
            Quantity::HeatFlux,
            "Heat-Flux",
            DataId(0),
            RegionEntities::Faces(&faces),
            &tables(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AdapterError::MissingBoundaryCondition {
                family: BcFamily::Flux,
                ..
            }
        ));
    }

    #[test]
    fn face_quantity_on_nodes_mesh_is_rejected() {
        let nodes = [NodeId::new(1)];
        assert!(matches!(
            ReadChannel::build(
                Quantity::HeatFlux,
                "Heat-Flux",
                DataId(0),
                RegionEntities::Nodes(&nodes),
                &tables(),
            ),
            Err(AdapterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn write_channel_reports_quantity() {
        let ch = WriteChannel::new(Quantity::HeatFlux, "Heat-Flux", DataId(3), 5);
        assert_eq!(ch.quantity(), Quantity::HeatFlux);
        assert_eq!(ch.len(), 5);
        assert_eq!(ch.data_id(), DataId(3));
        assert_eq!(ch.data_name(), "Heat-Flux");
    }
}
