//! Role size catalog

use crate::client::AsmClient;
use crate::error::{AsmError, Result};
use serde::Deserialize;

const ROLE_SIZES_PATH: &str = "rolesizes";

/// A role (VM instance) size offered by the platform
#[derive(Debug, Clone, Deserialize)]
pub struct RoleSize {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Label")]
    pub label: Option<String>,
    #[serde(rename = "Cores")]
    pub cores: Option<u32>,
    #[serde(rename = "MemoryInMb")]
    pub memory_in_mb: Option<u32>,
    #[serde(rename = "SupportedByVirtualMachines", default)]
    pub supported_by_virtual_machines: bool,
}

#[derive(Debug, Deserialize)]
struct RoleSizes {
    #[serde(rename = "RoleSize", default)]
    items: Vec<RoleSize>,
}

/// Handler for role size lookups
pub struct RoleSizeHandler {
    client: AsmClient,
}

impl RoleSizeHandler {
    pub fn new(client: AsmClient) -> Self {
        Self { client }
    }

    /// List all role sizes offered by the platform
    pub async fn list(&self) -> Result<Vec<RoleSize>> {
        let sizes: RoleSizes = self.client.get_xml(ROLE_SIZES_PATH).await?;
        Ok(sizes.items)
    }

    /// Resolve a role size by name, failing with the full list of available
    /// sizes so the caller sees what is valid.
    pub async fn resolve(&self, name: &str) -> Result<RoleSize> {
        let sizes = self.list().await?;
        if let Some(size) = sizes.iter().find(|size| size.name == name) {
            return Ok(size.clone());
        }
        let available: Vec<&str> = sizes.iter().map(|size| size.name.as_str()).collect();
        Err(AsmError::NotFound {
            message: format!(
                "invalid role size '{}'; available role sizes: {}",
                name,
                available.join(", ")
            ),
        })
    }
}
