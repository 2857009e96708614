//! Subscription-wide virtual network configuration
//!
//! The network configuration is a single XML document covering every virtual
//! network site of the subscription; updates replace the whole document. The
//! API serializes these operations server-side, so callers must not run
//! network operations for the same subscription concurrently.
//!
//! The media endpoint predates the rest of the schema: it uses its own
//! namespace and requires the `text/plain` content type on upload.

use crate::client::AsmClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};

const NETWORK_CONFIGURATION_PATH: &str = "services/networking/media";

/// XML namespace of the network configuration schema
pub const NETWORK_CONFIG_XMLNS: &str =
    "http://schemas.microsoft.com/ServiceHosting/2011/07/NetworkConfiguration";

fn network_xmlns() -> String {
    NETWORK_CONFIG_XMLNS.to_string()
}

/// The subscription's network configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfiguration {
    #[serde(rename = "@xmlns", default = "network_xmlns")]
    xmlns: String,
    #[serde(rename = "VirtualNetworkConfiguration")]
    pub virtual_network_configuration: VirtualNetworkConfiguration,
}

impl NetworkConfiguration {
    /// Wrap a virtual network configuration with the namespace the media
    /// endpoint requires.
    #[must_use]
    pub fn new(virtual_network_configuration: VirtualNetworkConfiguration) -> Self {
        Self {
            xmlns: network_xmlns(),
            virtual_network_configuration,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VirtualNetworkConfiguration {
    #[serde(rename = "Dns", skip_serializing_if = "Option::is_none")]
    pub dns: Option<Dns>,
    #[serde(
        rename = "VirtualNetworkSites",
        skip_serializing_if = "Option::is_none"
    )]
    pub virtual_network_sites: Option<VirtualNetworkSites>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dns {
    #[serde(rename = "DnsServers", skip_serializing_if = "Option::is_none")]
    pub dns_servers: Option<DnsServers>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DnsServers {
    #[serde(rename = "DnsServer", default)]
    pub items: Vec<DnsServer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsServer {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@IPAddress")]
    pub ip_address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VirtualNetworkSites {
    #[serde(rename = "VirtualNetworkSite", default)]
    pub items: Vec<VirtualNetworkSite>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualNetworkSite {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@Location", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "@AffinityGroup", skip_serializing_if = "Option::is_none")]
    pub affinity_group: Option<String>,
    #[serde(rename = "AddressSpace")]
    pub address_space: AddressSpace,
    #[serde(rename = "Subnets", skip_serializing_if = "Option::is_none")]
    pub subnets: Option<Subnets>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressSpace {
    #[serde(rename = "AddressPrefix", default)]
    pub address_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subnets {
    #[serde(rename = "Subnet", default)]
    pub items: Vec<Subnet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subnet {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "AddressPrefix")]
    pub address_prefix: String,
}

/// Handler for the network configuration media endpoint
pub struct VirtualNetworkHandler {
    client: AsmClient,
}

impl VirtualNetworkHandler {
    pub fn new(client: AsmClient) -> Self {
        Self { client }
    }

    /// Fetch the current network configuration of the subscription
    pub async fn get_configuration(&self) -> Result<NetworkConfiguration> {
        self.client.get_xml(NETWORK_CONFIGURATION_PATH).await
    }

    /// Replace the subscription's network configuration.
    ///
    /// Returns the request id of the accepted operation.
    pub async fn set_configuration(&self, configuration: &NetworkConfiguration) -> Result<String> {
        self.client
            .put(
                NETWORK_CONFIGURATION_PATH,
                "text/plain",
                quick_xml::se::to_string(configuration)?,
            )
            .await
    }
}
