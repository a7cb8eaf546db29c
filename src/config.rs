//! Adapter configuration.
//!
//! Parsing a configuration file is the host program's job; these types are
//! the already-parsed structure, deserializable with serde using kebab-case
//! field names.

use serde::{Deserialize, Serialize};

use crate::adapter_error::AdapterError;
use crate::data::quantity::{Direction, Quantity};

fn default_true() -> bool {
    true
}

fn default_output_interval() -> usize {
    1
}

/// Participant-level configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AdapterConfig {
    /// Name of this participant in the coupled simulation.
    pub participant: String,
    /// Path to the middleware's own configuration.
    pub middleware_config: String,
    /// Coupling interfaces, registered in this order.
    pub interfaces: Vec<InterfaceConfig>,
    /// Keep solver steps smaller than the coupling step.
    #[serde(default = "default_true")]
    pub subcycling: bool,
    /// Accepted increments between solver outputs; 0 disables periodic output.
    #[serde(default = "default_output_interval")]
    pub output_interval: usize,
}

/// One coupling interface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct InterfaceConfig {
    /// Interface name, used in messages.
    pub name: String,
    /// Host regions making up the interface.
    pub regions: Vec<String>,
    /// Middleware mesh over the region nodes.
    #[serde(default)]
    pub nodes_mesh: Option<String>,
    /// Middleware mesh over the region face centroids.
    #[serde(default)]
    pub face_centers_mesh: Option<String>,
    /// Register face triangles on the nodes mesh.
    #[serde(default)]
    pub triangles: bool,
    /// Data imported into host boundary conditions.
    #[serde(default)]
    pub read_data: Vec<String>,
    /// Data exported from host state.
    #[serde(default)]
    pub write_data: Vec<String>,
}

impl InterfaceConfig {
    /// Data names with their direction, reads first.
    pub fn data(&self) -> impl Iterator<Item = (&str, Direction)> {
        self.read_data
            .iter()
            .map(|n| (n.as_str(), Direction::Read))
            .chain(self.write_data.iter().map(|n| (n.as_str(), Direction::Write)))
    }
}

impl AdapterConfig {
    /// Structural checks that need no host mesh.
    ///
    /// # Errors
    /// `InvalidConfig` for empty names, duplicate interfaces, interfaces
    /// without regions or meshes, data listed twice, triangles without a
    /// nodes mesh; `UnsupportedQuantity` for unknown data names.
    pub fn validate(&self) -> Result<(), AdapterError> {
        if self.participant.trim().is_empty() {
            return Err(AdapterError::InvalidConfig("participant name is empty".into()));
        }
        for (i, iface) in self.interfaces.iter().enumerate() {
            if iface.name.trim().is_empty() {
                return Err(AdapterError::InvalidConfig(format!(
                    "interface #{i} has no name"
                )));
            }
            if self.interfaces[..i].iter().any(|o| o.name == iface.name) {
                return Err(AdapterError::InvalidConfig(format!(
                    "interface `{}` is declared twice",
                    iface.name
                )));
            }
            if iface.regions.is_empty() {
                return Err(AdapterError::InvalidConfig(format!(
                    "interface `{}` lists no regions",
                    iface.name
                )));
            }
            if iface.nodes_mesh.is_none() && iface.face_centers_mesh.is_none() {
                return Err(AdapterError::InvalidConfig(format!(
                    "interface `{}` names neither a nodes nor a face-centers mesh",
                    iface.name
                )));
            }
            if iface.triangles && iface.nodes_mesh.is_none() {
                return Err(AdapterError::InvalidConfig(format!(
                    "interface `{}` requests triangles without a nodes mesh",
                    iface.name
                )));
            }
            let mut seen: Vec<&str> = Vec::new();
            for (name, direction) in iface.data() {
                Quantity::from_data_name(name, direction)?;
                if seen.contains(&name) {
                    return Err(AdapterError::InvalidConfig(format!(
                        "data `{name}` listed twice on interface `{}`",
                        iface.name
                    )));
                }
                seen.push(name);
            }
        }
        Ok(())
    }
}
