//! Mock management endpoint and XML fixtures for tests
//!
//! Enabled through the `test-support` feature so downstream crates can test
//! workflow logic against a wiremock-backed endpoint without real
//! credentials:
//!
//! ```toml
//! [dev-dependencies]
//! azure-asm = { version = "0.1", features = ["test-support"] }
//! ```

use crate::client::AsmClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Subscription id baked into clients returned by [`MockAsmServer::client`]
pub const TEST_SUBSCRIPTION_ID: &str = "test-subscription";

/// A wiremock-backed Service Management endpoint
pub struct MockAsmServer {
    server: MockServer,
}

impl MockAsmServer {
    /// Start a mock server on a random local port
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// A client pointed at this server, scoped to [`TEST_SUBSCRIPTION_ID`]
    pub fn client(&self) -> AsmClient {
        AsmClient::builder()
            .subscription_id(TEST_SUBSCRIPTION_ID)
            .base_url(self.server.uri())
            .build()
            .expect("mock client")
    }

    /// The underlying wiremock server, for mounting custom expectations
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Base URI of the mock endpoint
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    fn subscription_path(&self, relative: &str) -> String {
        format!("/{}/{}", TEST_SUBSCRIPTION_ID, relative)
    }

    /// Response accepted asynchronously, carrying the request id header
    pub fn accepted(request_id: &str) -> ResponseTemplate {
        ResponseTemplate::new(202).insert_header("x-ms-request-id", request_id)
    }

    /// Serve one operation document for `operations/{request_id}`
    pub async fn mock_operation(&self, request_id: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(self.subscription_path(&format!(
                "operations/{}",
                request_id
            ))))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Serve a sequence of operation documents for successive polls.
    ///
    /// Every entry except the last is served exactly once; the final entry
    /// answers all remaining polls. Mount order matters: wiremock consumes
    /// capped mocks before falling through to later ones.
    pub async fn mock_operation_sequence(&self, request_id: &str, bodies: Vec<String>) {
        let operation_path = self.subscription_path(&format!("operations/{}", request_id));
        let last = bodies.len().saturating_sub(1);
        for (index, body) in bodies.into_iter().enumerate() {
            let mock = Mock::given(method("GET"))
                .and(path(operation_path.clone()))
                .respond_with(ResponseTemplate::new(200).set_body_string(body));
            if index < last {
                mock.up_to_n_times(1).mount(&self.server).await;
            } else {
                mock.mount(&self.server).await;
            }
        }
    }

    /// Accept hosted service creation with the given request id
    pub async fn mock_hosted_service_created(&self, request_id: &str) {
        Mock::given(method("POST"))
            .and(path(self.subscription_path("services/hostedservices")))
            .respond_with(Self::accepted(request_id))
            .mount(&self.server)
            .await;
    }

    /// Accept hosted service deletion, asserting it is issued exactly once
    pub async fn mock_hosted_service_deleted(&self, service_name: &str, request_id: &str) {
        Mock::given(method("DELETE"))
            .and(path(self.subscription_path(&format!(
                "services/hostedservices/{}",
                service_name
            ))))
            .respond_with(Self::accepted(request_id))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Accept a certificate upload into the hosted service
    pub async fn mock_certificate_uploaded(&self, service_name: &str, request_id: &str) {
        Mock::given(method("POST"))
            .and(path(self.subscription_path(&format!(
                "services/hostedservices/{}/certificates",
                service_name
            ))))
            .respond_with(Self::accepted(request_id))
            .mount(&self.server)
            .await;
    }

    /// Reject a certificate upload with the given status and ASM error body
    pub async fn mock_certificate_upload_failure(&self, service_name: &str, status: u16, body: String) {
        Mock::given(method("POST"))
            .and(path(self.subscription_path(&format!(
                "services/hostedservices/{}/certificates",
                service_name
            ))))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Accept deployment creation in the hosted service
    pub async fn mock_deployment_created(&self, service_name: &str, request_id: &str) {
        Mock::given(method("POST"))
            .and(path(self.subscription_path(&format!(
                "services/hostedservices/{}/deployments",
                service_name
            ))))
            .respond_with(Self::accepted(request_id))
            .mount(&self.server)
            .await;
    }

    /// Serve the location catalog
    pub async fn mock_locations(&self, locations: Vec<String>) {
        let body = format!(
            "<Locations xmlns=\"{}\">{}</Locations>",
            crate::AZURE_XMLNS,
            locations.concat()
        );
        Mock::given(method("GET"))
            .and(path(self.subscription_path("locations")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Serve the storage account list
    pub async fn mock_storage_services(&self, services: Vec<String>) {
        let body = format!(
            "<StorageServices xmlns=\"{}\">{}</StorageServices>",
            crate::AZURE_XMLNS,
            services.concat()
        );
        Mock::given(method("GET"))
            .and(path(self.subscription_path("services/storageservices")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Serve one storage account by name
    pub async fn mock_storage_service_get(&self, service_name: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(self.subscription_path(&format!(
                "services/storageservices/{}",
                service_name
            ))))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Accept storage account creation with the given request id
    pub async fn mock_storage_service_created(&self, request_id: &str) {
        Mock::given(method("POST"))
            .and(path(self.subscription_path("services/storageservices")))
            .respond_with(Self::accepted(request_id))
            .mount(&self.server)
            .await;
    }

    /// Serve the OS image catalog
    pub async fn mock_images(&self, images: Vec<String>) {
        let body = format!(
            "<Images xmlns=\"{}\">{}</Images>",
            crate::AZURE_XMLNS,
            images.concat()
        );
        Mock::given(method("GET"))
            .and(path(self.subscription_path("services/images")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Serve the role size catalog
    pub async fn mock_role_sizes(&self, sizes: Vec<String>) {
        let body = format!(
            "<RoleSizes xmlns=\"{}\">{}</RoleSizes>",
            crate::AZURE_XMLNS,
            sizes.concat()
        );
        Mock::given(method("GET"))
            .and(path(self.subscription_path("rolesizes")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Serve the network configuration document
    pub async fn mock_network_configuration(&self, body: String) {
        Mock::given(method("GET"))
            .and(path(self.subscription_path("services/networking/media")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Accept a network configuration update
    pub async fn mock_network_configuration_updated(&self, request_id: &str) {
        Mock::given(method("PUT"))
            .and(path(self.subscription_path("services/networking/media")))
            .respond_with(Self::accepted(request_id))
            .mount(&self.server)
            .await;
    }
}

/// Builds `<Operation>` documents
pub struct OperationFixture {
    id: String,
    status: String,
    error: Option<(String, String)>,
}

impl OperationFixture {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: "InProgress".to_string(),
            error: None,
        }
    }

    pub fn in_progress(mut self) -> Self {
        self.status = "InProgress".to_string();
        self
    }

    pub fn succeeded(mut self) -> Self {
        self.status = "Succeeded".to_string();
        self
    }

    pub fn failed(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.status = "Failed".to_string();
        self.error = Some((code.into(), message.into()));
        self
    }

    pub fn build(self) -> String {
        let error = match self.error {
            Some((code, message)) => format!(
                "<HttpStatusCode>400</HttpStatusCode><Error><Code>{}</Code><Message>{}</Message></Error>",
                code, message
            ),
            None => String::new(),
        };
        format!(
            "<Operation xmlns=\"{}\"><ID>{}</ID><Status>{}</Status>{}</Operation>",
            crate::AZURE_XMLNS,
            self.id,
            self.status,
            error
        )
    }
}

/// Builds `<Location>` elements for the location catalog
pub struct LocationFixture {
    name: String,
    role_sizes: Vec<String>,
}

impl LocationFixture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role_sizes: Vec::new(),
        }
    }

    pub fn role_size(mut self, size: impl Into<String>) -> Self {
        self.role_sizes.push(size.into());
        self
    }

    pub fn build(self) -> String {
        let sizes: String = self
            .role_sizes
            .iter()
            .map(|size| format!("<RoleSize>{}</RoleSize>", size))
            .collect();
        format!(
            "<Location><Name>{name}</Name><DisplayName>{name}</DisplayName>\
             <VirtualMachineRoleSizes>{sizes}</VirtualMachineRoleSizes></Location>",
            name = self.name,
            sizes = sizes
        )
    }
}

/// Builds `<StorageService>` elements
pub struct StorageServiceFixture {
    name: String,
    location: Option<String>,
    endpoints: Vec<String>,
}

impl StorageServiceFixture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
            endpoints: Vec::new(),
        }
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Adds the standard blob/queue/table endpoint triple for the account
    pub fn standard_endpoints(mut self) -> Self {
        for service in ["blob", "queue", "table"] {
            self.endpoints.push(format!(
                "https://{}.{}.core.windows.net/",
                self.name, service
            ));
        }
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.push(endpoint.into());
        self
    }

    pub fn build(self) -> String {
        let location = self
            .location
            .map(|location| format!("<Location>{}</Location>", location))
            .unwrap_or_default();
        let endpoints: String = self
            .endpoints
            .iter()
            .map(|endpoint| format!("<Endpoint>{}</Endpoint>", endpoint))
            .collect();
        format!(
            "<StorageService><ServiceName>{}</ServiceName><StorageServiceProperties>\
             {}<Status>Created</Status><Endpoints>{}</Endpoints>\
             </StorageServiceProperties></StorageService>",
            self.name, location, endpoints
        )
    }
}

/// Builds `<OSImage>` elements
pub struct OsImageFixture {
    name: String,
    label: Option<String>,
    os: String,
}

impl OsImageFixture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            os: "Linux".to_string(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn os(mut self, os: impl Into<String>) -> Self {
        self.os = os.into();
        self
    }

    pub fn build(self) -> String {
        let label = self
            .label
            .map(|label| format!("<Label>{}</Label>", label))
            .unwrap_or_default();
        format!(
            "<OSImage>{}<Name>{}</Name><OS>{}</OS></OSImage>",
            label, self.name, self.os
        )
    }
}

/// Builds `<RoleSize>` elements for the role size catalog
pub struct RoleSizeFixture {
    name: String,
    cores: u32,
    memory_in_mb: u32,
}

impl RoleSizeFixture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cores: 1,
            memory_in_mb: 1792,
        }
    }

    pub fn cores(mut self, cores: u32) -> Self {
        self.cores = cores;
        self
    }

    pub fn memory_in_mb(mut self, memory_in_mb: u32) -> Self {
        self.memory_in_mb = memory_in_mb;
        self
    }

    pub fn build(self) -> String {
        format!(
            "<RoleSize><Name>{}</Name><Cores>{}</Cores><MemoryInMb>{}</MemoryInMb>\
             <SupportedByVirtualMachines>true</SupportedByVirtualMachines></RoleSize>",
            self.name, self.cores, self.memory_in_mb
        )
    }
}

/// Builds the ASM `<Error>` document returned on failed requests
pub struct ErrorFixture {
    code: String,
    message: String,
}

impl ErrorFixture {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn build(self) -> String {
        format!(
            "<Error xmlns=\"{}\"><Code>{}</Code><Message>{}</Message></Error>",
            crate::AZURE_XMLNS,
            self.code,
            self.message
        )
    }
}
