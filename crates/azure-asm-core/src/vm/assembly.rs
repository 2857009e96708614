//! Role assembly and validation
//!
//! Builds the deployment document for a virtual machine from discrete
//! inputs. Everything that can be rejected locally is rejected here, before
//! a single remote call is wasted: DNS name and password bounds, certificate
//! format, instance size availability in the target location, and the
//! one-provisioning-config/at-most-one-network-config shape of the role.

use crate::error::{CoreError, Result};
use crate::progress::wait_for_operation;
use crate::vm::params::CreateVmParams;
use crate::vm::workflows::DEFAULT_INTERVAL;
use azure_asm::AsmClient;
use azure_asm::deployments::{
    CONFIG_SET_LINUX_PROVISIONING, CONFIG_SET_NETWORK, ConfigurationSet, ConfigurationSets,
    InputEndpoint, InputEndpoints, OsVirtualHardDisk, PublicKey, PublicKeys,
    ROLE_TYPE_PERSISTENT_VM, ResourceExtensionParameterValue, ResourceExtensionParameterValues,
    ResourceExtensionReference, ResourceExtensionReferences, Role, Ssh,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Placeholder written into the document when password auth is disabled;
/// the remote schema rejects an empty password field even when unused
const PLACEHOLDER_PASSWORD: &str = "P@ssword1";

const DOCKER_EXTENSION_NAME: &str = "DockerExtension";
const DOCKER_EXTENSION_PUBLISHER: &str = "MSOpenTech.Extensions";
const DOCKER_EXTENSION_DEFAULT_VERSION: &str = "0.3";
const DOCKER_PUBLIC_CONFIG_VERSION: u32 = 2;

/// Validate a DNS name (3-25 characters)
pub fn verify_dns_name(dns_name: &str) -> Result<()> {
    if dns_name.len() < 3 || dns_name.len() > 25 {
        return Err(CoreError::Validation(
            "DNS name must be between 3 and 25 characters".to_string(),
        ));
    }
    Ok(())
}

/// Validate a provisioning password: 4-30 characters with at least one
/// upper-case, lower-case and numeric character
pub fn verify_password(password: &str) -> Result<()> {
    if password.len() < 4 || password.len() > 30 {
        return Err(CoreError::Validation(
            "password must be between 4 and 30 characters".to_string(),
        ));
    }
    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(char::is_numeric);
    if !(has_upper && has_lower && has_digit) {
        return Err(CoreError::Validation(
            "password must have at least one upper case, lower case and numeric character"
                .to_string(),
        ));
    }
    Ok(())
}

/// SHA-1 fingerprint of a PEM certificate: the digest of the DER payload,
/// hex-encoded uppercase with no separators
pub fn certificate_fingerprint(pem: &str) -> Result<String> {
    let der = decode_pem(pem).ok_or_else(|| {
        CoreError::Validation("certificate is not a PEM-encoded document".to_string())
    })?;
    Ok(hex::encode_upper(Sha1::digest(&der)))
}

/// Extract the base64 payload of the first PEM block
fn decode_pem(pem: &str) -> Option<Vec<u8>> {
    let mut payload = String::new();
    let mut in_block = false;
    for line in pem.lines() {
        let line = line.trim();
        if line.starts_with("-----BEGIN") {
            in_block = true;
            continue;
        }
        if line.starts_with("-----END") {
            break;
        }
        if in_block {
            payload.push_str(line);
        }
    }
    if !in_block {
        return None;
    }
    BASE64.decode(payload.as_bytes()).ok()
}

fn check_certificate_extension(path: &Path) -> Result<()> {
    if path.extension().and_then(|extension| extension.to_str()) != Some("pem") {
        return Err(CoreError::Validation(format!(
            "certificate {} is invalid, a .pem certificate is required",
            path.display()
        )));
    }
    Ok(())
}

fn ssh_config(certificate_path: &Path, user_name: &str) -> Result<Ssh> {
    check_certificate_extension(certificate_path)?;
    let pem = std::fs::read_to_string(certificate_path).map_err(|e| {
        CoreError::Validation(format!(
            "failed to read certificate {}: {}",
            certificate_path.display(),
            e
        ))
    })?;
    let fingerprint = certificate_fingerprint(&pem)?;
    Ok(Ssh {
        public_keys: PublicKeys {
            keys: vec![PublicKey {
                fingerprint,
                path: format!("/home/{}/.ssh/authorized_keys", user_name),
            }],
        },
    })
}

/// Build a Linux provisioning configuration set.
///
/// An absent (or empty) password disables SSH password authentication and
/// writes [`PLACEHOLDER_PASSWORD`] into the document instead; a certificate
/// path additionally installs the certificate's fingerprint as an authorized
/// SSH key for the user.
pub fn linux_provisioning_config(
    host_name: &str,
    user_name: &str,
    password: Option<&str>,
    certificate_path: Option<&Path>,
) -> Result<ConfigurationSet> {
    let password = password.filter(|password| !password.is_empty());
    let (user_password, disable_password_auth) = match password {
        Some(password) => {
            verify_password(password)?;
            (password.to_string(), false)
        }
        None => (PLACEHOLDER_PASSWORD.to_string(), true),
    };

    let ssh = certificate_path
        .map(|path| ssh_config(path, user_name))
        .transpose()?;

    Ok(ConfigurationSet {
        configuration_set_type: CONFIG_SET_LINUX_PROVISIONING.to_string(),
        host_name: Some(host_name.to_string()),
        user_name: Some(user_name.to_string()),
        user_password: Some(user_password),
        disable_ssh_password_authentication: Some(disable_password_auth),
        ssh,
        input_endpoints: None,
    })
}

/// Build a network configuration set exposing SSH on the given external port
#[must_use]
pub fn network_config(ssh_port: u16) -> ConfigurationSet {
    ConfigurationSet {
        configuration_set_type: CONFIG_SET_NETWORK.to_string(),
        input_endpoints: Some(InputEndpoints {
            items: vec![InputEndpoint {
                local_port: 22,
                name: "ssh".to_string(),
                port: ssh_port,
                protocol: "tcp".to_string(),
            }],
        }),
        ..Default::default()
    }
}

/// Parameters for a guest agent extension reference
///
/// Public and private configuration values are base64-encoded into the
/// document with the fixed key `ignored`, as the extension schema requires.
#[derive(Debug, Clone)]
pub struct ExtensionParams {
    pub name: String,
    pub publisher: String,
    pub version: String,
    pub reference_name: String,
    pub state: String,
    pub public_configuration: Option<String>,
    pub private_configuration: Option<String>,
}

impl ExtensionParams {
    /// Create extension params with the default `enable` state
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        publisher: impl Into<String>,
        version: impl Into<String>,
        reference_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            publisher: publisher.into(),
            version: version.into(),
            reference_name: reference_name.into(),
            state: "enable".to_string(),
            public_configuration: None,
            private_configuration: None,
        }
    }

    /// Override the extension state
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Set the public configuration value
    #[must_use]
    pub fn with_public_configuration(mut self, value: impl Into<String>) -> Self {
        self.public_configuration = Some(value.into());
        self
    }

    /// Set the private configuration value
    #[must_use]
    pub fn with_private_configuration(mut self, value: impl Into<String>) -> Self {
        self.private_configuration = Some(value.into());
        self
    }

    fn into_reference(self) -> ResourceExtensionReference {
        let mut values = Vec::new();
        if let Some(value) = self.private_configuration {
            values.push(ResourceExtensionParameterValue {
                key: "ignored".to_string(),
                value: BASE64.encode(value),
                parameter_type: "Private".to_string(),
            });
        }
        if let Some(value) = self.public_configuration {
            values.push(ResourceExtensionParameterValue {
                key: "ignored".to_string(),
                value: BASE64.encode(value),
                parameter_type: "Public".to_string(),
            });
        }
        ResourceExtensionReference {
            reference_name: self.reference_name,
            publisher: self.publisher,
            name: self.name,
            version: self.version,
            parameter_values: if values.is_empty() {
                None
            } else {
                Some(ResourceExtensionParameterValues { items: values })
            },
            state: self.state,
        }
    }
}

/// A fully assembled virtual machine definition, ready for submission
///
/// Produced only by [`RoleBuilder::build`], so a role in a
/// `VirtualMachine` always satisfies the configuration-set invariants.
#[derive(Debug, Clone)]
pub struct VirtualMachine {
    /// The role document submitted inside the deployment
    pub role: Role,
    /// Service certificate uploaded before the deployment, when SSH key
    /// authentication was configured
    pub certificate: Option<PathBuf>,
}

/// Builder for a virtual machine role
///
/// Accumulates configuration fragments and validates them in
/// [`build`](Self::build): exactly one provisioning configuration, at most
/// one network configuration, and an OS disk. A partially configured role
/// cannot be serialized.
#[derive(Debug, Clone)]
pub struct RoleBuilder {
    role_name: String,
    role_size: String,
    os_disk: Option<OsVirtualHardDisk>,
    provisioning: Vec<ConfigurationSet>,
    network: Vec<ConfigurationSet>,
    extensions: Vec<ResourceExtensionReference>,
    certificate: Option<PathBuf>,
}

impl RoleBuilder {
    /// Start building a role with the given name and size
    #[must_use]
    pub fn new(role_name: impl Into<String>, role_size: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
            role_size: role_size.into(),
            os_disk: None,
            provisioning: Vec::new(),
            network: Vec::new(),
            extensions: Vec::new(),
            certificate: None,
        }
    }

    /// Set the OS virtual hard disk (media link and source image)
    #[must_use]
    pub fn os_disk(
        mut self,
        media_link: impl Into<String>,
        source_image_name: impl Into<String>,
    ) -> Self {
        self.os_disk = Some(OsVirtualHardDisk {
            media_link: media_link.into(),
            source_image_name: source_image_name.into(),
        });
        self
    }

    /// Append a provisioning configuration set
    #[must_use]
    pub fn provisioning(mut self, config: ConfigurationSet) -> Self {
        self.provisioning.push(config);
        self
    }

    /// Append a network configuration set
    #[must_use]
    pub fn network(mut self, config: ConfigurationSet) -> Self {
        self.network.push(config);
        self
    }

    /// Set the service certificate uploaded before the deployment
    #[must_use]
    pub fn certificate(mut self, path: impl Into<PathBuf>) -> Self {
        self.certificate = Some(path.into());
        self
    }

    /// Append a guest agent extension reference
    #[must_use]
    pub fn extension(mut self, params: ExtensionParams) -> Self {
        self.extensions.push(params.into_reference());
        self
    }

    /// Append the Docker extension and open its port.
    ///
    /// Requires the provisioning and network configuration to be set
    /// already: the Docker endpoint is added to the existing network
    /// configuration set.
    pub fn docker_extension(mut self, docker_port: u16, version: Option<&str>) -> Result<Self> {
        let network = self.network.last_mut().ok_or_else(|| {
            CoreError::Validation(
                "the provisioning and network configuration must be set before adding the \
                 docker extension"
                    .to_string(),
            )
        })?;
        network
            .input_endpoints
            .get_or_insert_with(Default::default)
            .items
            .push(InputEndpoint {
                local_port: docker_port,
                name: "docker".to_string(),
                port: docker_port,
                protocol: "tcp".to_string(),
            });

        let public_configuration = serde_json::json!({
            "dockerport": docker_port,
            "version": DOCKER_PUBLIC_CONFIG_VERSION,
        })
        .to_string();

        Ok(self.extension(
            ExtensionParams::new(
                DOCKER_EXTENSION_NAME,
                DOCKER_EXTENSION_PUBLISHER,
                version.unwrap_or(DOCKER_EXTENSION_DEFAULT_VERSION),
                DOCKER_EXTENSION_NAME,
            )
            .with_public_configuration(public_configuration)
            .with_private_configuration("{}"),
        ))
    }

    /// Validate and assemble the virtual machine definition
    pub fn build(self) -> Result<VirtualMachine> {
        if self.provisioning.is_empty() {
            return Err(CoreError::Validation(
                "exactly one provisioning configuration is required".to_string(),
            ));
        }
        if self.provisioning.len() > 1 {
            return Err(CoreError::Validation(
                "only one provisioning configuration may be set".to_string(),
            ));
        }
        if self.network.len() > 1 {
            return Err(CoreError::Validation(
                "at most one network configuration may be set".to_string(),
            ));
        }
        let os_disk = self.os_disk.ok_or_else(|| {
            CoreError::Validation("an OS virtual hard disk is required".to_string())
        })?;

        let mut items = self.provisioning;
        items.extend(self.network);

        Ok(VirtualMachine {
            role: Role {
                role_name: self.role_name,
                role_type: ROLE_TYPE_PERSISTENT_VM.to_string(),
                configuration_sets: Some(ConfigurationSets { items }),
                resource_extension_references: if self.extensions.is_empty() {
                    None
                } else {
                    Some(ResourceExtensionReferences {
                        items: self.extensions,
                    })
                },
                os_virtual_hard_disk: Some(os_disk),
                role_size: self.role_size,
                provision_guest_agent: true,
            },
            certificate: self.certificate,
        })
    }
}

/// Derive the VHD media link for a new OS disk in the given location.
///
/// Uses the first storage account in the location; when none exists, one is
/// created under a synthesized `portalvhds` name and its creation is awaited
/// before the URL can be formed - a nested two-step async workflow.
pub async fn vhd_media_link(
    client: &AsmClient,
    dns_name: &str,
    location: &str,
    timeout: Duration,
) -> Result<String> {
    let storage = client.storage_services();
    let service = match storage.find_by_location(location).await? {
        Some(service) => service,
        None => {
            // account names are capped at 24 chars: 10 + 12 hex fits
            let token = uuid::Uuid::new_v4().simple().to_string();
            let service_name = format!("portalvhds{}", &token[..12]);
            info!(service_name, location, "creating storage account for VHDs");
            let request_id = storage.create(&service_name, location).await?;
            wait_for_operation(client, &request_id, timeout, DEFAULT_INTERVAL, None).await?;
            storage.get(&service_name).await?
        }
    };

    let blob_endpoint = service.blob_endpoint().ok_or_else(|| {
        CoreError::Validation(format!(
            "storage account '{}' reports no blob endpoint",
            service.service_name
        ))
    })?;
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    Ok(format!("{}vhds/{}-{}.vhd", blob_endpoint, dns_name, stamp))
}

/// Cross-validate creation parameters and assemble the role.
///
/// Checks, in order: the DNS name bound, that the instance size is offered
/// in the target location, and that the OS image exists - all before any
/// resource is created. Returns a [`RoleBuilder`] carrying the OS disk,
/// provisioning and network configuration; callers may add extensions
/// before [`build`](RoleBuilder::build).
pub async fn prepare_role(
    client: &AsmClient,
    params: &CreateVmParams,
    timeout: Duration,
) -> Result<RoleBuilder> {
    verify_dns_name(&params.dns_name)?;

    let location = client.locations().get(&params.location).await?;
    if !location.supports_role_size(&params.instance_size) {
        return Err(CoreError::Validation(format!(
            "instance size '{}' is not available in location '{}'",
            params.instance_size, params.location
        )));
    }

    let image = client.os_images().resolve(&params.image_name).await?;
    debug!(image = %image.name, "resolved OS image");

    let media_link = vhd_media_link(client, &params.dns_name, &params.location, timeout).await?;

    let provisioning = linux_provisioning_config(
        &params.dns_name,
        &params.user_name,
        params.password.as_deref(),
        params.certificate_path.as_deref(),
    )?;

    let mut builder = RoleBuilder::new(&params.dns_name, &params.instance_size)
        .os_disk(media_link, image.name)
        .provisioning(provisioning)
        .network(network_config(params.ssh_port));
    if let Some(path) = &params.certificate_path {
        builder = builder.certificate(path);
    }
    Ok(builder)
}
