//! HTTP client for the Service Management endpoint
//!
//! All requests are scoped to a subscription and carry the `x-ms-version`
//! header. Mutating verbs (POST/PUT/DELETE) are accepted asynchronously by
//! the API: the response body is empty and the `x-ms-request-id` header
//! carries the tracking token for the operation, which callers poll via
//! [`OperationHandler`](crate::operations::OperationHandler).
//!
//! # Example
//!
//! ```rust,no_run
//! use azure_asm::AsmClient;
//!
//! # fn example() -> azure_asm::Result<()> {
//! let client = AsmClient::builder()
//!     .subscription_id("a1b2c3d4-...")
//!     .management_certificate("~/.azure/management.pem")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::deployments::DeploymentHandler;
use crate::error::{AsmError, Result};
use crate::hosted_services::HostedServiceHandler;
use crate::locations::LocationHandler;
use crate::operations::OperationHandler;
use crate::os_images::OsImageHandler;
use crate::role_sizes::RoleSizeHandler;
use crate::storage_services::StorageServiceHandler;
use crate::virtual_networks::VirtualNetworkHandler;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Default management endpoint for the public Azure cloud
pub const DEFAULT_MANAGEMENT_URL: &str = "https://management.core.windows.net";

/// API version sent with every request
const MS_VERSION: &str = "2013-03-01";

/// Header carrying the API version
const MS_VERSION_HEADER: &str = "x-ms-version";

/// Header carrying the tracking token of an accepted mutating call
const REQUEST_ID_HEADER: &str = "x-ms-request-id";

/// Default user agent string for client requests
const DEFAULT_USER_AGENT: &str = concat!("azure-asm/", env!("CARGO_PKG_VERSION"));

/// Content type for XML request documents
const XML_CONTENT_TYPE: &str = "application/xml";

/// Client for the Service Management API
///
/// Cheap to clone; handlers borrow a clone of the client and can outlive it.
#[derive(Debug, Clone)]
pub struct AsmClient {
    http: reqwest::Client,
    base_url: String,
    subscription_id: String,
}

/// Builder for [`AsmClient`]
#[derive(Debug, Default)]
pub struct AsmClientBuilder {
    subscription_id: Option<String>,
    base_url: Option<String>,
    user_agent: Option<String>,
    management_certificate: Option<PathBuf>,
}

impl AsmClientBuilder {
    /// Set the subscription id all requests are scoped to (required)
    #[must_use]
    pub fn subscription_id(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = Some(subscription_id.into());
        self
    }

    /// Override the management endpoint (defaults to the public cloud)
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Override the user agent string
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Path to the PEM management certificate (certificate plus private key)
    /// used as the TLS client identity.
    ///
    /// Optional so that tests can run against a plain-HTTP mock endpoint;
    /// the real management endpoint rejects unauthenticated requests.
    #[must_use]
    pub fn management_certificate(mut self, path: impl Into<PathBuf>) -> Self {
        self.management_certificate = Some(path.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<AsmClient> {
        let subscription_id = self.subscription_id.ok_or_else(|| {
            AsmError::InvalidConfiguration("subscription id is required".to_string())
        })?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_MANAGEMENT_URL.to_string());
        let parsed = url::Url::parse(&base_url).map_err(|e| {
            AsmError::InvalidConfiguration(format!("invalid management URL '{}': {}", base_url, e))
        })?;
        let base_url = parsed.as_str().trim_end_matches('/').to_string();

        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()));

        if let Some(ref path) = self.management_certificate {
            let pem = std::fs::read(path).map_err(|e| {
                AsmError::InvalidConfiguration(format!(
                    "failed to read management certificate {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let identity = reqwest::Identity::from_pem(&pem)?;
            builder = builder.identity(identity);
            debug!(certificate = %path.display(), "using TLS client certificate");
        }

        Ok(AsmClient {
            http: builder.build()?,
            base_url,
            subscription_id,
        })
    }
}

impl AsmClient {
    /// Start building a client
    pub fn builder() -> AsmClientBuilder {
        AsmClientBuilder::default()
    }

    /// The subscription id this client is scoped to
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// The management endpoint this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.subscription_id, path)
    }

    /// Issue a GET and return the raw response body
    pub async fn get(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.execute(self.http.get(&url)).await?;
        let body = response.text().await?;
        trace!(%body, "response body");
        Ok(body)
    }

    /// Issue a GET and deserialize the XML response body
    pub(crate) async fn get_xml<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get(path).await?;
        Ok(quick_xml::de::from_str(&body)?)
    }

    /// Issue a POST with an XML body and return the operation's request id
    pub async fn post(&self, path: &str, body: String) -> Result<String> {
        let url = self.url(path);
        debug!(%url, "POST");
        trace!(%body, "request body");
        let response = self
            .execute(
                self.http
                    .post(&url)
                    .header(reqwest::header::CONTENT_TYPE, XML_CONTENT_TYPE)
                    .body(body),
            )
            .await?;
        Self::request_id(&response)
    }

    /// Issue a PUT with an explicit content type and return the request id.
    ///
    /// The network configuration media endpoint requires `text/plain` even
    /// though the body is XML, so the content type is caller-supplied.
    pub async fn put(&self, path: &str, content_type: &str, body: String) -> Result<String> {
        let url = self.url(path);
        debug!(%url, content_type, "PUT");
        trace!(%body, "request body");
        let response = self
            .execute(
                self.http
                    .put(&url)
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .body(body),
            )
            .await?;
        Self::request_id(&response)
    }

    /// Issue a DELETE and return the operation's request id
    pub async fn delete(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        debug!(%url, "DELETE");
        let response = self.execute(self.http.delete(&url)).await?;
        Self::request_id(&response)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.header(MS_VERSION_HEADER, MS_VERSION).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await?;
        debug!(%status, %body, "request failed");
        Err(crate::error::from_response(status, &body))
    }

    fn request_id(response: &reqwest::Response) -> Result<String> {
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                AsmError::UnexpectedResponse(format!(
                    "response carried no {} header",
                    REQUEST_ID_HEADER
                ))
            })
    }

    /// Asynchronous operation status lookups
    pub fn operations(&self) -> OperationHandler {
        OperationHandler::new(self.clone())
    }

    /// Hosted service (cloud service) management
    pub fn hosted_services(&self) -> HostedServiceHandler {
        HostedServiceHandler::new(self.clone())
    }

    /// Deployment and role management
    pub fn deployments(&self) -> DeploymentHandler {
        DeploymentHandler::new(self.clone())
    }

    /// Subscription-wide virtual network configuration
    pub fn virtual_networks(&self) -> VirtualNetworkHandler {
        VirtualNetworkHandler::new(self.clone())
    }

    /// Datacenter location catalog
    pub fn locations(&self) -> LocationHandler {
        LocationHandler::new(self.clone())
    }

    /// Storage account management
    pub fn storage_services(&self) -> StorageServiceHandler {
        StorageServiceHandler::new(self.clone())
    }

    /// OS image catalog
    pub fn os_images(&self) -> OsImageHandler {
        OsImageHandler::new(self.clone())
    }

    /// Role size catalog
    pub fn role_sizes(&self) -> RoleSizeHandler {
        RoleSizeHandler::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_subscription_id() {
        let err = AsmClient::builder().build().unwrap_err();
        assert!(matches!(err, AsmError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("subscription id"));
    }

    #[test]
    fn test_builder_defaults_to_public_cloud() {
        let client = AsmClient::builder()
            .subscription_id("sub-1")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), DEFAULT_MANAGEMENT_URL);
        assert_eq!(client.subscription_id(), "sub-1");
    }

    #[test]
    fn test_builder_rejects_invalid_url() {
        let err = AsmClient::builder()
            .subscription_id("sub-1")
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, AsmError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_url_is_subscription_scoped() {
        let client = AsmClient::builder()
            .subscription_id("sub-1")
            .base_url("https://example.test/")
            .build()
            .unwrap();
        assert_eq!(
            client.url("services/hostedservices"),
            "https://example.test/sub-1/services/hostedservices"
        );
    }
}
