//! Data module: boundary tables, quantities, index tables and channels
#![warn(missing_docs)]

pub mod bc;
pub mod channel;
pub mod index_table;
pub mod quantity;

pub use bc::{BoundaryArray, BoundaryTables, DirichletTable, LoadTable};
pub use channel::{ReadChannel, RegionEntities, WriteChannel};
pub use index_table::IndexTable;
pub use quantity::{Direction, MeshLocation, Quantity};
