//! Host boundary-condition bookkeeping.
//!
//! The host solver does not address its boundary values by entity. Fixed
//! nodal values live in a value array reached through a *sorted* DOF-key
//! index plus a slot permutation; surface loads live in a flat value array
//! with two components per load entry, matched by element and load label.
//! Read channels resolve entity → slot once at setup (see
//! [`crate::algs::index_lookup`]) and then write slots directly.

use std::fmt;
use std::str::FromStr;

use crate::adapter_error::AdapterError;
use crate::debug_invariants::DebugInvariants;
use crate::topology::entity::{ElementId, FaceRef, NodeId};

/// DOF slots per node in the Dirichlet key space.
pub const DOF_STRIDE: u64 = 8;

/// Temperature is DOF 0 of every node.
pub const TEMPERATURE_DOF: u8 = 0;

/// Values stored per load entry: `[flux or coefficient, sink temperature]`.
pub const LOAD_COMPONENTS: usize = 2;

/// Key of `dof` at `node` in the sorted Dirichlet index.
#[inline]
pub fn dof_key(node: NodeId, dof: u8) -> u64 {
    DOF_STRIDE * (node.get() - 1) + u64::from(dof)
}

/// Fixed nodal values (Dirichlet), in host declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DirichletTable {
    /// Sorted DOF keys.
    keys: Vec<u64>,
    /// `slots[k]` is the value slot of `keys[k]`.
    slots: Vec<usize>,
    /// Boundary values in declaration order.
    values: Vec<f64>,
}

impl DirichletTable {
    /// Builds the table from `(node, dof, value)` declarations.
    ///
    /// # Errors
    /// `InvalidConfig` on a duplicated `(node, dof)` declaration.
    pub fn from_declarations(
        declarations: impl IntoIterator<Item = (NodeId, u8, f64)>,
    ) -> Result<Self, AdapterError> {
        let mut keyed = Vec::new();
        let mut values = Vec::new();
        for (slot, (node, dof, value)) in declarations.into_iter().enumerate() {
            keyed.push((dof_key(node, dof), slot));
            values.push(value);
        }
        keyed.sort_unstable();
        if let Some(w) = keyed.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(AdapterError::InvalidConfig(format!(
                "duplicate fixed boundary value for dof key {}",
                w[0].0
            )));
        }
        let (keys, slots) = keyed.into_iter().unzip();
        let table = Self {
            keys,
            slots,
            values,
        };
        crate::debug_invariants!(table.validate_invariants(), "DirichletTable");
        Ok(table)
    }

    /// Value slot of `key`, by binary search over the sorted index.
    pub fn find_slot(&self, key: u64) -> Option<usize> {
        self.keys
            .binary_search(&key)
            .ok()
            .map(|k| self.slots[k])
    }

    /// Number of declared values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing is declared.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Boundary values.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mutable boundary values.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }
}

impl DebugInvariants for DirichletTable {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "DirichletTable");
    }

    fn validate_invariants(&self) -> Result<(), AdapterError> {
        if self.keys.len() != self.slots.len() || self.slots.len() != self.values.len() {
            return Err(AdapterError::InvalidConfig(
                "dirichlet index and value lengths differ".into(),
            ));
        }
        if self.keys.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AdapterError::InvalidConfig(
                "dirichlet index is not strictly sorted".into(),
            ));
        }
        if self.slots.iter().any(|&s| s >= self.values.len()) {
            return Err(AdapterError::InvalidConfig(
                "dirichlet slot out of range".into(),
            ));
        }
        Ok(())
    }
}

/// Surface load families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadKind {
    /// Distributed flux, label prefix `S`.
    DistributedFlux,
    /// Convective film, label prefix `F`.
    Film,
}

impl LoadKind {
    fn prefix(self) -> char {
        match self {
            LoadKind::DistributedFlux => 'S',
            LoadKind::Film => 'F',
        }
    }
}

/// Load label such as `S3` or `F1`: family plus local face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadLabel {
    /// Family.
    pub kind: LoadKind,
    /// 1-based local face.
    pub face: u8,
}

impl LoadLabel {
    /// Label of `kind` on `face`'s local face.
    pub fn on(kind: LoadKind, face: FaceRef) -> Self {
        Self {
            kind,
            face: face.local_face(),
        }
    }
}

impl fmt::Display for LoadLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.face)
    }
}

impl FromStr for LoadLabel {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let kind = match chars.next() {
            Some('S') => LoadKind::DistributedFlux,
            Some('F') => LoadKind::Film,
            _ => return Err(AdapterError::InvalidConfig(format!("unknown load label `{s}`"))),
        };
        let face = chars
            .as_str()
            .parse::<u8>()
            .ok()
            .filter(|f| (1..=FaceRef::MAX_LOCAL_FACE).contains(f))
            .ok_or_else(|| AdapterError::InvalidConfig(format!("bad face in load label `{s}`")))?;
        Ok(Self { kind, face })
    }
}

/// One surface load declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadEntry {
    /// Loaded element.
    pub element: ElementId,
    /// Family and local face.
    pub label: LoadLabel,
}

/// Surface loads: entries plus `LOAD_COMPONENTS` values per entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadTable {
    entries: Vec<LoadEntry>,
    values: Vec<f64>,
}

impl LoadTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a load and returns its entry index.
    pub fn push(&mut self, element: ElementId, label: LoadLabel, values: [f64; LOAD_COMPONENTS]) -> usize {
        self.entries.push(LoadEntry { element, label });
        self.values.extend_from_slice(&values);
        self.entries.len() - 1
    }

    /// First entry for `face` under `kind`, by linear search.
    pub fn find_entry(&self, face: FaceRef, kind: LoadKind) -> Option<usize> {
        let label = LoadLabel::on(kind, face);
        self.entries
            .iter()
            .position(|e| e.element == face.element() && e.label == label)
    }

    /// Flat value slot of `component` of entry `entry`.
    #[inline]
    pub fn slot(entry: usize, component: usize) -> usize {
        entry * LOAD_COMPONENTS + component
    }

    /// Declared entries.
    #[inline]
    pub fn entries(&self) -> &[LoadEntry] {
        &self.entries
    }

    /// Flat load values.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mutable flat load values.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True without entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All boundary bookkeeping of the host solver that read channels write into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundaryTables {
    /// Fixed nodal values.
    pub dirichlet: DirichletTable,
    /// Surface loads.
    pub loads: LoadTable,
}

/// Target array of a read channel's index table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryArray {
    /// [`DirichletTable::values`].
    Dirichlet,
    /// [`LoadTable::values`].
    Loads,
}

impl BoundaryTables {
    /// Mutable value array for `target`.
    pub fn array_mut(&mut self, target: BoundaryArray) -> &mut [f64] {
        match target {
            BoundaryArray::Dirichlet => self.dirichlet.values_mut(),
            BoundaryArray::Loads => self.loads.values_mut(),
        }
    }

    /// Value array for `target`.
    pub fn array(&self, target: BoundaryArray) -> &[f64] {
        match target {
            BoundaryArray::Dirichlet => self.dirichlet.values(),
            BoundaryArray::Loads => self.loads.values(),
        }
    }
}
