//! Participant registry: every coupling interface of one participant.

use crate::adapter_error::AdapterError;
use crate::config::AdapterConfig;
use crate::debug_invariants::DebugInvariants;
use crate::interface::CouplingInterface;
use crate::middleware::CouplingMiddleware;
use crate::solver::HostSolver;

/// Interfaces of the participant, in configuration order.
#[derive(Clone, Debug, PartialEq)]
pub struct Registry {
    participant: String,
    interfaces: Vec<CouplingInterface>,
}

impl Registry {
    /// Validates `config` and builds every interface against the host mesh.
    ///
    /// # Errors
    /// The first configuration error; no partially built registry is returned.
    pub fn build<S, M>(
        config: &AdapterConfig,
        solver: &S,
        middleware: &mut M,
    ) -> Result<Self, AdapterError>
    where
        S: HostSolver + ?Sized,
        M: CouplingMiddleware + ?Sized,
    {
        config.validate()?;
        let interfaces = config
            .interfaces
            .iter()
            .map(|iface| CouplingInterface::build(iface, solver, middleware))
            .collect::<Result<Vec<_>, _>>()?;
        let registry = Self {
            participant: config.participant.clone(),
            interfaces,
        };
        registry.debug_assert_invariants();
        log::info!(
            "participant `{}`: {} coupling interface(s) set up",
            registry.participant,
            registry.interfaces.len()
        );
        Ok(registry)
    }

    /// Participant name.
    pub fn participant(&self) -> &str {
        &self.participant
    }

    /// All interfaces.
    pub fn interfaces(&self) -> &[CouplingInterface] {
        &self.interfaces
    }

    /// Interface by name.
    pub fn interface(&self, name: &str) -> Option<&CouplingInterface> {
        self.interfaces.iter().find(|i| i.name() == name)
    }

    /// Imports all read data into the solver's boundary tables.
    pub fn read_all<S, M>(&mut self, solver: &mut S, middleware: &mut M) -> Result<(), AdapterError>
    where
        S: HostSolver + ?Sized,
        M: CouplingMiddleware + ?Sized,
    {
        let tables = solver.boundary_mut();
        for iface in &mut self.interfaces {
            iface.read_coupling_data(middleware, tables)?;
        }
        Ok(())
    }

    /// Exports all write data from the solver.
    pub fn write_all<S, M>(&mut self, solver: &S, middleware: &mut M) -> Result<(), AdapterError>
    where
        S: HostSolver + ?Sized,
        M: CouplingMiddleware + ?Sized,
    {
        for iface in &mut self.interfaces {
            iface.write_coupling_data(solver, middleware)?;
        }
        Ok(())
    }

    /// Drops all interfaces and their channels.
    pub fn release(&mut self) {
        self.interfaces.clear();
    }
}

impl DebugInvariants for Registry {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Registry");
    }

    fn validate_invariants(&self) -> Result<(), AdapterError> {
        for (i, iface) in self.interfaces.iter().enumerate() {
            iface.validate_invariants()?;
            if self.interfaces[..i].iter().any(|o| o.name() == iface.name()) {
                return Err(AdapterError::InvalidConfig(format!(
                    "interface `{}` registered twice",
                    iface.name()
                )));
            }
        }
        Ok(())
    }
}
