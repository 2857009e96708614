//! Storage account management
//!
//! VM disks live as page blobs in a storage account; the VM workflow looks
//! one up by location (creating it when none exists) and derives the VHD
//! media link from its blob endpoint.

use crate::client::AsmClient;
use crate::error::Result;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

const STORAGE_SERVICES_PATH: &str = "services/storageservices";

/// A storage account as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct StorageService {
    #[serde(rename = "Url")]
    pub url: Option<String>,
    #[serde(rename = "ServiceName")]
    pub service_name: String,
    #[serde(rename = "StorageServiceProperties")]
    pub properties: Option<StorageServiceProperties>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageServiceProperties {
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Label")]
    pub label: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "Endpoints", default)]
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Endpoints {
    #[serde(rename = "Endpoint", default)]
    pub items: Vec<String>,
}

impl StorageService {
    /// The location this account lives in, when reported
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|properties| properties.location.as_deref())
    }

    /// The blob endpoint URI of this account, e.g.
    /// `https://myaccount.blob.core.windows.net/`
    #[must_use]
    pub fn blob_endpoint(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .map(|properties| properties.endpoints.items.as_slice())
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .find(|endpoint| endpoint.contains("blob"))
    }
}

#[derive(Debug, Deserialize)]
struct StorageServices {
    #[serde(rename = "StorageService", default)]
    items: Vec<StorageService>,
}

#[derive(Debug, Serialize)]
struct CreateStorageServiceInput {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "ServiceName")]
    service_name: String,
    #[serde(rename = "Label")]
    label: String,
    #[serde(rename = "Location")]
    location: String,
}

/// Handler for storage account operations
pub struct StorageServiceHandler {
    client: AsmClient,
}

impl StorageServiceHandler {
    pub fn new(client: AsmClient) -> Self {
        Self { client }
    }

    /// List all storage accounts in the subscription
    pub async fn list(&self) -> Result<Vec<StorageService>> {
        let services: StorageServices = self.client.get_xml(STORAGE_SERVICES_PATH).await?;
        Ok(services.items)
    }

    /// Fetch a storage account by name
    pub async fn get(&self, service_name: &str) -> Result<StorageService> {
        self.client
            .get_xml(&format!(
                "{}/{}",
                STORAGE_SERVICES_PATH,
                urlencoding::encode(service_name)
            ))
            .await
    }

    /// The first storage account in the given location, if any
    pub async fn find_by_location(&self, location: &str) -> Result<Option<StorageService>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|service| service.location() == Some(location)))
    }

    /// Create a storage account. Account names are restricted to 3-24
    /// lowercase alphanumeric characters. Returns the request id.
    pub async fn create(&self, service_name: &str, location: &str) -> Result<String> {
        let doc = CreateStorageServiceInput {
            xmlns: crate::AZURE_XMLNS,
            service_name: service_name.to_string(),
            label: BASE64.encode(service_name),
            location: location.to_string(),
        };
        self.client
            .post(STORAGE_SERVICES_PATH, quick_xml::se::to_string(&doc)?)
            .await
    }
}
