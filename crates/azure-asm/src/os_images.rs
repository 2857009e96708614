//! OS image catalog
//!
//! Images are resolved before a disk is configured so that a bad image name
//! fails the workflow before anything is created remotely.

use crate::client::AsmClient;
use crate::error::{AsmError, Result};
use serde::Deserialize;

const IMAGES_PATH: &str = "services/images";

/// An OS image available to the subscription
#[derive(Debug, Clone, Deserialize)]
pub struct OsImage {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Label")]
    pub label: Option<String>,
    #[serde(rename = "OS")]
    pub os: Option<String>,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Images {
    #[serde(rename = "OSImage", default)]
    items: Vec<OsImage>,
}

/// Handler for OS image lookups
pub struct OsImageHandler {
    client: AsmClient,
}

impl OsImageHandler {
    pub fn new(client: AsmClient) -> Self {
        Self { client }
    }

    /// List all OS images visible to the subscription
    pub async fn list(&self) -> Result<Vec<OsImage>> {
        let images: Images = self.client.get_xml(IMAGES_PATH).await?;
        Ok(images.items)
    }

    /// Resolve an image by name or label.
    ///
    /// Labels are the human-readable strings shown in the portal; accepting
    /// either lets callers pass whichever they have.
    pub async fn resolve(&self, name: &str) -> Result<OsImage> {
        self.list()
            .await?
            .into_iter()
            .find(|image| image.name == name || image.label.as_deref() == Some(name))
            .ok_or_else(|| AsmError::NotFound {
                message: format!("OS image '{}' was not found", name),
            })
    }
}
