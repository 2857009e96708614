//! Datacenter location catalog
//!
//! Locations carry the set of role sizes available in that datacenter, which
//! the VM creation workflow checks before building any deployment document.

use crate::client::AsmClient;
use crate::error::{AsmError, Result};
use serde::Deserialize;

const LOCATIONS_PATH: &str = "locations";

/// A datacenter location available to the subscription
#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "DisplayName")]
    pub display_name: Option<String>,
    #[serde(rename = "VirtualMachineRoleSizes", default)]
    pub virtual_machine_role_sizes: VirtualMachineRoleSizes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VirtualMachineRoleSizes {
    #[serde(rename = "RoleSize", default)]
    pub items: Vec<String>,
}

impl Location {
    /// Whether the given role size can be provisioned in this location
    #[must_use]
    pub fn supports_role_size(&self, role_size: &str) -> bool {
        self.virtual_machine_role_sizes
            .items
            .iter()
            .any(|available| available == role_size)
    }
}

#[derive(Debug, Deserialize)]
struct Locations {
    #[serde(rename = "Location", default)]
    items: Vec<Location>,
}

/// Handler for location lookups
pub struct LocationHandler {
    client: AsmClient,
}

impl LocationHandler {
    pub fn new(client: AsmClient) -> Self {
        Self { client }
    }

    /// List all locations available to the subscription
    pub async fn list(&self) -> Result<Vec<Location>> {
        let locations: Locations = self.client.get_xml(LOCATIONS_PATH).await?;
        Ok(locations.items)
    }

    /// Fetch a single location by name.
    ///
    /// The API only exposes the full list, so this lists and filters.
    pub async fn get(&self, name: &str) -> Result<Location> {
        self.list()
            .await?
            .into_iter()
            .find(|location| location.name == name)
            .ok_or_else(|| AsmError::NotFound {
                message: format!("location '{}' is not available for this subscription", name),
            })
    }
}
