//! Hosted service (cloud service) management
//!
//! A hosted service is the container a deployment lives in; its name doubles
//! as the public DNS prefix (`<name>.cloudapp.net`). Service certificates
//! used for SSH provisioning are uploaded into the service's certificate
//! store.

use crate::client::AsmClient;
use crate::error::Result;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

const SERVICES_PATH: &str = "services/hostedservices";

/// A hosted service as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct HostedService {
    #[serde(rename = "Url")]
    pub url: Option<String>,
    #[serde(rename = "ServiceName")]
    pub service_name: String,
    #[serde(rename = "HostedServiceProperties")]
    pub properties: Option<HostedServiceProperties>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostedServiceProperties {
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Label")]
    pub label: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateHostedService {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "ServiceName")]
    service_name: String,
    #[serde(rename = "Label")]
    label: String,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "Location")]
    location: String,
}

#[derive(Debug, Serialize)]
struct CertificateFile {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "Data")]
    data: String,
    #[serde(rename = "CertificateFormat")]
    certificate_format: String,
}

/// Handler for hosted service operations
pub struct HostedServiceHandler {
    client: AsmClient,
}

impl HostedServiceHandler {
    pub fn new(client: AsmClient) -> Self {
        Self { client }
    }

    /// Create a hosted service in the given location.
    ///
    /// The label shown in the portal is the base64-encoded service name.
    /// Returns the request id of the accepted operation.
    pub async fn create(
        &self,
        service_name: &str,
        location: &str,
        description: Option<&str>,
    ) -> Result<String> {
        let doc = CreateHostedService {
            xmlns: crate::AZURE_XMLNS,
            service_name: service_name.to_string(),
            label: BASE64.encode(service_name),
            description: description.map(str::to_string),
            location: location.to_string(),
        };
        self.client
            .post(SERVICES_PATH, quick_xml::se::to_string(&doc)?)
            .await
    }

    /// Fetch a hosted service by name
    pub async fn get(&self, service_name: &str) -> Result<HostedService> {
        self.client
            .get_xml(&format!(
                "{}/{}",
                SERVICES_PATH,
                urlencoding::encode(service_name)
            ))
            .await
    }

    /// Delete a hosted service. Returns the request id.
    pub async fn delete(&self, service_name: &str) -> Result<String> {
        self.client
            .delete(&format!(
                "{}/{}",
                SERVICES_PATH,
                urlencoding::encode(service_name)
            ))
            .await
    }

    /// Upload a service certificate into the hosted service.
    ///
    /// `data` is the raw certificate file; it is base64-encoded on the wire.
    /// Returns the request id.
    pub async fn add_certificate(
        &self,
        service_name: &str,
        data: &[u8],
        certificate_format: &str,
    ) -> Result<String> {
        let doc = CertificateFile {
            xmlns: crate::AZURE_XMLNS,
            data: BASE64.encode(data),
            certificate_format: certificate_format.to_string(),
        };
        self.client
            .post(
                &format!(
                    "{}/{}/certificates",
                    SERVICES_PATH,
                    urlencoding::encode(service_name)
                ),
                quick_xml::se::to_string(&doc)?,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_document_shape() {
        let doc = CreateHostedService {
            xmlns: crate::AZURE_XMLNS,
            service_name: "myservice".to_string(),
            label: BASE64.encode("myservice"),
            description: None,
            location: "West US".to_string(),
        };
        let xml = quick_xml::se::to_string(&doc).unwrap();
        assert!(xml.starts_with(
            "<CreateHostedService xmlns=\"http://schemas.microsoft.com/windowsazure\">"
        ));
        assert!(xml.contains("<ServiceName>myservice</ServiceName>"));
        assert!(xml.contains("<Label>bXlzZXJ2aWNl</Label>"));
        assert!(xml.contains("<Location>West US</Location>"));
        assert!(!xml.contains("<Description>"));
    }

    #[test]
    fn test_create_document_with_description() {
        let doc = CreateHostedService {
            xmlns: crate::AZURE_XMLNS,
            service_name: "svc".to_string(),
            label: BASE64.encode("svc"),
            description: Some("test service".to_string()),
            location: "West US".to_string(),
        };
        let xml = quick_xml::se::to_string(&doc).unwrap();
        assert!(xml.contains("<Description>test service</Description>"));
    }

    #[test]
    fn test_certificate_document_shape() {
        let doc = CertificateFile {
            xmlns: crate::AZURE_XMLNS,
            data: BASE64.encode(b"certificate bytes"),
            certificate_format: "pfx".to_string(),
        };
        let xml = quick_xml::se::to_string(&doc).unwrap();
        assert!(xml.contains("<Data>Y2VydGlmaWNhdGUgYnl0ZXM=</Data>"));
        assert!(xml.contains("<CertificateFormat>pfx</CertificateFormat>"));
    }

    #[test]
    fn test_parse_hosted_service() {
        let xml = r#"<HostedService xmlns="http://schemas.microsoft.com/windowsazure">
            <Url>https://management.core.windows.net/sub-1/services/hostedservices/myservice</Url>
            <ServiceName>myservice</ServiceName>
            <HostedServiceProperties>
                <Description>test</Description>
                <Location>West US</Location>
                <Label>bXlzZXJ2aWNl</Label>
                <Status>Created</Status>
            </HostedServiceProperties>
        </HostedService>"#;
        let service: HostedService = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(service.service_name, "myservice");
        let properties = service.properties.unwrap();
        assert_eq!(properties.location.as_deref(), Some("West US"));
        assert_eq!(properties.status.as_deref(), Some("Created"));
    }
}
