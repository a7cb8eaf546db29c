//! Setup-time algorithms: region resolution and boundary index lookup.

pub mod index_lookup;
pub mod region;
