//! Coupled physical quantities and their naming.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::adapter_error::{AdapterError, BcFamily};

/// Prefix of sink-temperature data names (`Sink-Temperature-<partner>`).
pub const SINK_TEMPERATURE_PREFIX: &str = "Sink-Temperature-";
/// Prefix of heat-transfer-coefficient data names.
pub const HEAT_TRANSFER_COEFFICIENT_PREFIX: &str = "Heat-Transfer-Coefficient-";

/// Data exchange direction, seen from the host solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Middleware → solver boundary conditions.
    Read,
    /// Solver state → middleware.
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Read => "read",
            Direction::Write => "write",
        })
    }
}

/// Coupling mesh a quantity lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshLocation {
    /// Region nodes.
    Nodes,
    /// Region face centroids.
    FaceCenters,
}

impl MeshLocation {
    /// Human-readable mesh kind, used in errors.
    pub fn describe(self) -> &'static str {
        match self {
            MeshLocation::Nodes => "nodes",
            MeshLocation::FaceCenters => "face-centers",
        }
    }
}

/// Supported quantity kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Nodal temperature.
    Temperature,
    /// Face heat flux.
    HeatFlux,
    /// Face sink temperature of a film condition.
    SinkTemperature,
    /// Face heat-transfer coefficient of a film condition.
    HeatTransferCoefficient,
}

impl Quantity {
    /// Classifies a middleware data name.
    pub fn from_data_name(name: &str, direction: Direction) -> Result<Self, AdapterError> {
        match name {
            "Temperature" => Ok(Quantity::Temperature),
            "Heat-Flux" => Ok(Quantity::HeatFlux),
            n if n.starts_with(SINK_TEMPERATURE_PREFIX) => Ok(Quantity::SinkTemperature),
            n if n.starts_with(HEAT_TRANSFER_COEFFICIENT_PREFIX) => {
                Ok(Quantity::HeatTransferCoefficient)
            }
            _ => Err(AdapterError::UnsupportedQuantity {
                name: name.to_string(),
                direction,
            }),
        }
    }

    /// Mesh the quantity is exchanged on.
    pub fn location(self) -> MeshLocation {
        match self {
            Quantity::Temperature => MeshLocation::Nodes,
            Quantity::HeatFlux | Quantity::SinkTemperature | Quantity::HeatTransferCoefficient => {
                MeshLocation::FaceCenters
            }
        }
    }

    /// Boundary-condition family a read channel of this quantity writes into.
    pub fn bc_family(self) -> BcFamily {
        match self {
            Quantity::Temperature => BcFamily::Temperature,
            Quantity::HeatFlux => BcFamily::Flux,
            Quantity::SinkTemperature | Quantity::HeatTransferCoefficient => BcFamily::Film,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Quantity::Temperature => "temperature",
            Quantity::HeatFlux => "heat flux",
            Quantity::SinkTemperature => "sink temperature",
            Quantity::HeatTransferCoefficient => "heat transfer coefficient",
        })
    }
}
