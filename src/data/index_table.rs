//! IndexTable: immutable buffer-position → boundary-value-slot offsets.
//!
//! Built once per read channel at setup and reused on every exchange. The
//! host's boundary storage is only reachable through a sorted or implicit
//! index, so the lookup cost is paid once here and never per exchange.

use crate::adapter_error::AdapterError;
use crate::data::bc::{BoundaryArray, BoundaryTables};
use crate::debug_invariants::DebugInvariants;

/// Offsets into one host boundary array, index-aligned with a region's entities.
///
/// # Invariants
/// - Every offset is in range of `target` on the tables it was built against.
/// - The table is never mutated after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexTable {
    target: BoundaryArray,
    offsets: Box<[usize]>,
}

impl IndexTable {
    /// Wraps resolved offsets.
    pub fn new(target: BoundaryArray, offsets: Vec<usize>) -> Self {
        Self {
            target,
            offsets: offsets.into_boxed_slice(),
        }
    }

    /// Boundary array the offsets point into.
    #[inline]
    pub fn target(&self) -> BoundaryArray {
        self.target
    }

    /// Offsets in entity order.
    #[inline]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Number of entries (= region entity count).
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// True for an empty region.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Overwrites `tables[target][offsets[i]] = buffer[i]` for every entry.
    ///
    /// # Errors
    /// `BufferLengthMismatch` for a buffer of the wrong length, and the
    /// error of [`validate_against`](Self::validate_against) when the host
    /// shrank its boundary arrays since setup. Nothing is written on error.
    pub fn scatter(&self, buffer: &[f64], tables: &mut BoundaryTables) -> Result<(), AdapterError> {
        if buffer.len() != self.offsets.len() {
            return Err(AdapterError::BufferLengthMismatch {
                expected: self.offsets.len(),
                found: buffer.len(),
            });
        }
        self.validate_against(tables)?;
        let values = tables.array_mut(self.target);
        for (&offset, &v) in self.offsets.iter().zip(buffer) {
            values[offset] = v;
        }
        Ok(())
    }

    /// Copies the addressed values back out, in entity order.
    pub fn gather(&self, tables: &BoundaryTables, buffer: &mut [f64]) -> Result<(), AdapterError> {
        if buffer.len() != self.offsets.len() {
            return Err(AdapterError::BufferLengthMismatch {
                expected: self.offsets.len(),
                found: buffer.len(),
            });
        }
        self.validate_against(tables)?;
        let values = tables.array(self.target);
        for (slot, &offset) in buffer.iter_mut().zip(self.offsets.iter()) {
            *slot = values[offset];
        }
        Ok(())
    }

    /// Checks every offset against the current table sizes.
    pub fn validate_against(&self, tables: &BoundaryTables) -> Result<(), AdapterError> {
        let len = tables.array(self.target).len();
        match self.offsets.iter().find(|&&o| o >= len) {
            Some(&bad) => Err(AdapterError::InvalidConfig(format!(
                "index table offset {bad} outside {:?} array of length {len}",
                self.target
            ))),
            None => Ok(()),
        }
    }
}

impl DebugInvariants for IndexTable {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "IndexTable");
    }

    /// Offsets are unique: two entities never share one boundary slot.
    fn validate_invariants(&self) -> Result<(), AdapterError> {
        let mut sorted = self.offsets.to_vec();
        sorted.sort_unstable();
        if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(AdapterError::InvalidConfig(format!(
                "index table maps two entities onto slot {}",
                w[0]
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bc::DirichletTable;
    use crate::topology::entity::NodeId;

    fn tables() -> BoundaryTables {
        BoundaryTables {
            dirichlet: DirichletTable::from_declarations(
                (1..=4).map(|n| (NodeId::new(n), 0, 0.0)),
            )
            .unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn scatter_overwrites_only_addressed_slots() {
        let mut t = tables();
        let table = IndexTable::new(BoundaryArray::Dirichlet, vec![2, 0]);
        table.scatter(&[7.0, 9.0], &mut t).unwrap();
        assert_eq!(t.dirichlet.values(), &[9.0, 0.0, 7.0, 0.0]);

        let mut back = [0.0; 2];
        table.gather(&t, &mut back).unwrap();
        assert_eq!(back, [7.0, 9.0]);
    }

    #[test]
    fn scatter_checks_length() {
        let mut t = tables();
        let table = IndexTable::new(BoundaryArray::Dirichlet, vec![1]);
        assert_eq!(
            table.scatter(&[1.0, 2.0], &mut t),
            Err(AdapterError::BufferLengthMismatch {
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn duplicate_offsets_violate_invariants() {
        let table = IndexTable::new(BoundaryArray::Loads, vec![0, 2, 0]);
        assert!(table.validate_invariants().is_err());
        let ok = IndexTable::new(BoundaryArray::Loads, vec![0, 2]);
        ok.validate_invariants().unwrap();
        assert!(ok.validate_against(&tables()).is_err());
    }

    #[test]
    fn scatter_into_shrunk_array_is_an_error() {
        let mut t = tables();
        let table = IndexTable::new(BoundaryArray::Dirichlet, vec![0, 3]);
        t.dirichlet =
            DirichletTable::from_declarations([(NodeId::new(1), 0, 5.0)]).unwrap();
        assert!(matches!(
            table.scatter(&[1.0, 2.0], &mut t),
            Err(AdapterError::InvalidConfig(_))
        ));
        // all-or-nothing: the in-range slot is untouched
        assert_eq!(t.dirichlet.values(), &[5.0]);
        let mut back = [0.0; 2];
        assert!(table.gather(&t, &mut back).is_err());
    }
}
