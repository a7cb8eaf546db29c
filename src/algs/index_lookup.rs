//! One-time construction of read-channel index tables.
//!
//! Nodal temperatures are found by binary search in the host's sorted
//! Dirichlet DOF index; face loads by a linear scan over load declarations
//! matching element and label. A region entity without a matching
//! declaration is a configuration error naming the missing family.

use crate::adapter_error::{AdapterError, BcFamily, MissingEntity};
use crate::data::bc::{BoundaryArray, BoundaryTables, LoadKind, LoadTable, TEMPERATURE_DOF, dof_key};
use crate::data::index_table::IndexTable;
use crate::data::quantity::Quantity;
use crate::debug_invariants::DebugInvariants;
use crate::topology::entity::{FaceRef, NodeId};

/// Where in a load entry a face quantity is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadSlot {
    /// Load family the face must carry.
    pub kind: LoadKind,
    /// Component within the entry.
    pub component: usize,
    /// Family named when a face lacks the declaration.
    pub family: BcFamily,
}

impl LoadSlot {
    /// Load slot of a face quantity, `None` for nodal quantities.
    pub fn of(quantity: Quantity) -> Option<Self> {
        let (kind, component) = match quantity {
            Quantity::Temperature => return None,
            Quantity::HeatFlux => (LoadKind::DistributedFlux, 0),
            Quantity::HeatTransferCoefficient => (LoadKind::Film, 0),
            Quantity::SinkTemperature => (LoadKind::Film, 1),
        };
        Some(Self {
            kind,
            component,
            family: quantity.bc_family(),
        })
    }
}

/// Dirichlet value slots of the temperature DOF of `nodes`.
pub fn temperature_indices(
    nodes: &[NodeId],
    tables: &BoundaryTables,
) -> Result<IndexTable, AdapterError> {
    let offsets = nodes
        .iter()
        .map(|&node| {
            tables
                .dirichlet
                .find_slot(dof_key(node, TEMPERATURE_DOF))
                .ok_or(AdapterError::MissingBoundaryCondition {
                    family: BcFamily::Temperature,
                    entity: MissingEntity::Node(node),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let table = IndexTable::new(BoundaryArray::Dirichlet, offsets);
    table.debug_assert_invariants();
    Ok(table)
}

/// Load value slots of `faces` for `slot`.
pub fn load_indices(
    faces: &[FaceRef],
    slot: LoadSlot,
    tables: &BoundaryTables,
) -> Result<IndexTable, AdapterError> {
    let offsets = faces
        .iter()
        .map(|&face| {
            tables
                .loads
                .find_entry(face, slot.kind)
                .map(|entry| LoadTable::slot(entry, slot.component))
                .ok_or(AdapterError::MissingBoundaryCondition {
                    family: slot.family,
                    entity: MissingEntity::Face(face),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let table = IndexTable::new(BoundaryArray::Loads, offsets);
    table.debug_assert_invariants();
    Ok(table)
}
