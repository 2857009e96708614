//! Deployments, roles and role operations
//!
//! The XML document types here mirror the Service Management schema, so
//! element order inside each struct matters: the serializer writes fields in
//! declaration order and the API validates it.

use crate::client::AsmClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Role type of an IaaS virtual machine
pub const ROLE_TYPE_PERSISTENT_VM: &str = "PersistentVMRole";
/// Configuration set carrying Linux provisioning settings
pub const CONFIG_SET_LINUX_PROVISIONING: &str = "LinuxProvisioningConfiguration";
/// Configuration set carrying network endpoints
pub const CONFIG_SET_NETWORK: &str = "NetworkConfiguration";
/// The deployment slot virtual machines are created in
pub const DEPLOYMENT_SLOT_PRODUCTION: &str = "Production";

fn azure_xmlns() -> String {
    crate::AZURE_XMLNS.to_string()
}

/// A deployment inside a hosted service
///
/// Serves as both the creation document and the response shape; the
/// response-only fields are skipped when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    #[serde(rename = "@xmlns", default = "azure_xmlns")]
    xmlns: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "DeploymentSlot")]
    pub deployment_slot: String,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "Label")]
    pub label: String,
    #[serde(rename = "Url", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "RoleList", default)]
    pub role_list: RoleList,
}

impl Deployment {
    /// Deployment document for a single new role.
    ///
    /// The deployment is named after the role and lands in the production
    /// slot, matching how the portal creates standalone virtual machines.
    pub fn from_role(role: Role) -> Self {
        Self {
            xmlns: azure_xmlns(),
            name: role.role_name.clone(),
            deployment_slot: DEPLOYMENT_SLOT_PRODUCTION.to_string(),
            status: None,
            label: role.role_name.clone(),
            url: None,
            role_list: RoleList { roles: vec![role] },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleList {
    #[serde(rename = "Role", default)]
    pub roles: Vec<Role>,
}

/// A virtual machine role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "RoleName")]
    pub role_name: String,
    #[serde(rename = "RoleType")]
    pub role_type: String,
    #[serde(
        rename = "ConfigurationSets",
        skip_serializing_if = "Option::is_none"
    )]
    pub configuration_sets: Option<ConfigurationSets>,
    #[serde(
        rename = "ResourceExtensionReferences",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_extension_references: Option<ResourceExtensionReferences>,
    #[serde(
        rename = "OSVirtualHardDisk",
        skip_serializing_if = "Option::is_none"
    )]
    pub os_virtual_hard_disk: Option<OsVirtualHardDisk>,
    #[serde(rename = "RoleSize")]
    pub role_size: String,
    #[serde(rename = "ProvisionGuestAgent", default)]
    pub provision_guest_agent: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigurationSets {
    #[serde(rename = "ConfigurationSet", default)]
    pub items: Vec<ConfigurationSet>,
}

/// One configuration set of a role.
///
/// The schema reuses a single element for provisioning and network settings,
/// discriminated by `ConfigurationSetType`; unused fields stay `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigurationSet {
    #[serde(rename = "ConfigurationSetType")]
    pub configuration_set_type: String,
    #[serde(rename = "HostName", skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(rename = "UserName", skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(rename = "UserPassword", skip_serializing_if = "Option::is_none")]
    pub user_password: Option<String>,
    #[serde(
        rename = "DisableSshPasswordAuthentication",
        skip_serializing_if = "Option::is_none"
    )]
    pub disable_ssh_password_authentication: Option<bool>,
    #[serde(rename = "SSH", skip_serializing_if = "Option::is_none")]
    pub ssh: Option<Ssh>,
    #[serde(rename = "InputEndpoints", skip_serializing_if = "Option::is_none")]
    pub input_endpoints: Option<InputEndpoints>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ssh {
    #[serde(rename = "PublicKeys")]
    pub public_keys: PublicKeys,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicKeys {
    #[serde(rename = "PublicKey", default)]
    pub keys: Vec<PublicKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(rename = "Fingerprint")]
    pub fingerprint: String,
    #[serde(rename = "Path")]
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputEndpoints {
    #[serde(rename = "InputEndpoint", default)]
    pub items: Vec<InputEndpoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputEndpoint {
    #[serde(rename = "LocalPort")]
    pub local_port: u16,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Port")]
    pub port: u16,
    #[serde(rename = "Protocol")]
    pub protocol: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceExtensionReferences {
    #[serde(rename = "ResourceExtensionReference", default)]
    pub items: Vec<ResourceExtensionReference>,
}

/// Reference to a guest agent extension installed into the role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceExtensionReference {
    #[serde(rename = "ReferenceName")]
    pub reference_name: String,
    #[serde(rename = "Publisher")]
    pub publisher: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(
        rename = "ResourceExtensionParameterValues",
        skip_serializing_if = "Option::is_none"
    )]
    pub parameter_values: Option<ResourceExtensionParameterValues>,
    #[serde(rename = "State")]
    pub state: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceExtensionParameterValues {
    #[serde(rename = "ResourceExtensionParameterValue", default)]
    pub items: Vec<ResourceExtensionParameterValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceExtensionParameterValue {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Type")]
    pub parameter_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsVirtualHardDisk {
    #[serde(rename = "MediaLink")]
    pub media_link: String,
    #[serde(rename = "SourceImageName")]
    pub source_image_name: String,
}

#[derive(Debug, Serialize)]
struct RoleOperation {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "OperationType")]
    operation_type: &'static str,
}

/// Serialize a role operation document whose root element equals the
/// operation type, e.g. `<RestartRoleOperation>`.
fn role_operation_doc(operation_type: &'static str) -> Result<String> {
    let doc = RoleOperation {
        xmlns: crate::AZURE_XMLNS,
        operation_type,
    };
    let mut xml = String::new();
    let serializer = quick_xml::se::Serializer::with_root(&mut xml, Some(operation_type))?;
    doc.serialize(serializer)?;
    Ok(xml)
}

fn deployments_path(service_name: &str) -> String {
    format!(
        "services/hostedservices/{}/deployments",
        urlencoding::encode(service_name)
    )
}

fn deployment_path(service_name: &str, deployment_name: &str) -> String {
    format!(
        "services/hostedservices/{}/deployments/{}",
        urlencoding::encode(service_name),
        urlencoding::encode(deployment_name)
    )
}

fn role_path(service_name: &str, deployment_name: &str, role_name: &str) -> String {
    format!(
        "services/hostedservices/{}/deployments/{}/roles/{}",
        urlencoding::encode(service_name),
        urlencoding::encode(deployment_name),
        urlencoding::encode(role_name)
    )
}

fn role_operations_path(service_name: &str, deployment_name: &str, role_name: &str) -> String {
    format!(
        "services/hostedservices/{}/deployments/{}/roleinstances/{}/Operations",
        urlencoding::encode(service_name),
        urlencoding::encode(deployment_name),
        urlencoding::encode(role_name)
    )
}

/// Handler for deployment and role operations
pub struct DeploymentHandler {
    client: AsmClient,
}

impl DeploymentHandler {
    pub fn new(client: AsmClient) -> Self {
        Self { client }
    }

    /// Create a deployment in the hosted service. Returns the request id.
    pub async fn create(&self, service_name: &str, deployment: &Deployment) -> Result<String> {
        self.client
            .post(
                &deployments_path(service_name),
                quick_xml::se::to_string(deployment)?,
            )
            .await
    }

    /// Fetch a deployment by name
    pub async fn get(&self, service_name: &str, deployment_name: &str) -> Result<Deployment> {
        self.client
            .get_xml(&deployment_path(service_name, deployment_name))
            .await
    }

    /// Delete a deployment together with its disk blobs. Returns the
    /// request id.
    pub async fn delete(&self, service_name: &str, deployment_name: &str) -> Result<String> {
        self.client
            .delete(&format!(
                "{}?comp=media",
                deployment_path(service_name, deployment_name)
            ))
            .await
    }

    /// Fetch a single role of a deployment
    pub async fn get_role(
        &self,
        service_name: &str,
        deployment_name: &str,
        role_name: &str,
    ) -> Result<Role> {
        self.client
            .get_xml(&role_path(service_name, deployment_name, role_name))
            .await
    }

    /// Delete a role from a deployment. Returns the request id.
    pub async fn delete_role(
        &self,
        service_name: &str,
        deployment_name: &str,
        role_name: &str,
    ) -> Result<String> {
        self.client
            .delete(&role_path(service_name, deployment_name, role_name))
            .await
    }

    /// Start a stopped role. Returns the request id.
    pub async fn start_role(
        &self,
        service_name: &str,
        deployment_name: &str,
        role_name: &str,
    ) -> Result<String> {
        self.post_role_operation(service_name, deployment_name, role_name, "StartRoleOperation")
            .await
    }

    /// Shut a role down. Returns the request id.
    pub async fn shutdown_role(
        &self,
        service_name: &str,
        deployment_name: &str,
        role_name: &str,
    ) -> Result<String> {
        self.post_role_operation(
            service_name,
            deployment_name,
            role_name,
            "ShutdownRoleOperation",
        )
        .await
    }

    /// Restart a running role. Returns the request id.
    pub async fn restart_role(
        &self,
        service_name: &str,
        deployment_name: &str,
        role_name: &str,
    ) -> Result<String> {
        self.post_role_operation(
            service_name,
            deployment_name,
            role_name,
            "RestartRoleOperation",
        )
        .await
    }

    async fn post_role_operation(
        &self,
        service_name: &str,
        deployment_name: &str,
        role_name: &str,
        operation_type: &'static str,
    ) -> Result<String> {
        self.client
            .post(
                &role_operations_path(service_name, deployment_name, role_name),
                role_operation_doc(operation_type)?,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_role() -> Role {
        Role {
            role_name: "web-01".to_string(),
            role_type: ROLE_TYPE_PERSISTENT_VM.to_string(),
            configuration_sets: Some(ConfigurationSets {
                items: vec![
                    ConfigurationSet {
                        configuration_set_type: CONFIG_SET_LINUX_PROVISIONING.to_string(),
                        host_name: Some("web-01".to_string()),
                        user_name: Some("azureuser".to_string()),
                        user_password: Some("S3cret!pw".to_string()),
                        disable_ssh_password_authentication: Some(false),
                        ..Default::default()
                    },
                    ConfigurationSet {
                        configuration_set_type: CONFIG_SET_NETWORK.to_string(),
                        input_endpoints: Some(InputEndpoints {
                            items: vec![InputEndpoint {
                                local_port: 22,
                                name: "SSH".to_string(),
                                port: 22,
                                protocol: "TCP".to_string(),
                            }],
                        }),
                        ..Default::default()
                    },
                ],
            }),
            resource_extension_references: None,
            os_virtual_hard_disk: Some(OsVirtualHardDisk {
                media_link: "https://acct.blob.core.windows.net/vhds/web-01.vhd".to_string(),
                source_image_name: "ubuntu-14_04".to_string(),
            }),
            role_size: "Small".to_string(),
            provision_guest_agent: true,
        }
    }

    #[test]
    fn test_deployment_document_shape() {
        let deployment = Deployment::from_role(sample_role());
        let xml = quick_xml::se::to_string(&deployment).unwrap();
        assert!(
            xml.starts_with("<Deployment xmlns=\"http://schemas.microsoft.com/windowsazure\">")
        );
        assert!(xml.contains("<Name>web-01</Name>"));
        assert!(xml.contains("<DeploymentSlot>Production</DeploymentSlot>"));
        assert!(xml.contains("<Label>web-01</Label>"));
        assert!(xml.contains("<RoleList><Role>"));
        assert!(xml.contains("<RoleType>PersistentVMRole</RoleType>"));
        assert!(xml.contains("<ProvisionGuestAgent>true</ProvisionGuestAgent>"));
        // response-only fields never leak into the request document
        assert!(!xml.contains("<Status>"));
        assert!(!xml.contains("<Url>"));
    }

    #[test]
    fn test_provisioning_fields_precede_ssh() {
        let mut role = sample_role();
        let sets = role.configuration_sets.as_mut().unwrap();
        sets.items[0].disable_ssh_password_authentication = Some(true);
        sets.items[0].user_password = None;
        sets.items[0].ssh = Some(Ssh {
            public_keys: PublicKeys {
                keys: vec![PublicKey {
                    fingerprint: "AB12".to_string(),
                    path: "/home/azureuser/.ssh/authorized_keys".to_string(),
                }],
            },
        });
        let xml = quick_xml::se::to_string(&Deployment::from_role(role)).unwrap();
        let disable = xml.find("<DisableSshPasswordAuthentication>").unwrap();
        let ssh = xml.find("<SSH>").unwrap();
        assert!(disable < ssh);
        assert!(xml.contains("<Fingerprint>AB12</Fingerprint>"));
    }

    #[test]
    fn test_role_operation_document() {
        let xml = role_operation_doc("RestartRoleOperation").unwrap();
        assert_eq!(
            xml,
            "<RestartRoleOperation xmlns=\"http://schemas.microsoft.com/windowsazure\">\
             <OperationType>RestartRoleOperation</OperationType></RestartRoleOperation>"
        );
    }

    #[test]
    fn test_parse_deployment_response() {
        let xml = r#"<Deployment xmlns="http://schemas.microsoft.com/windowsazure">
            <Name>web-01</Name>
            <DeploymentSlot>Production</DeploymentSlot>
            <Status>Running</Status>
            <Label>d2ViLTAx</Label>
            <Url>http://web-01.cloudapp.net/</Url>
            <RoleList>
                <Role>
                    <RoleName>web-01</RoleName>
                    <RoleType>PersistentVMRole</RoleType>
                    <RoleSize>Small</RoleSize>
                </Role>
            </RoleList>
        </Deployment>"#;
        let deployment: Deployment = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(deployment.name, "web-01");
        assert_eq!(deployment.status.as_deref(), Some("Running"));
        assert_eq!(deployment.role_list.roles.len(), 1);
        assert_eq!(deployment.role_list.roles[0].role_size, "Small");
    }

    #[test]
    fn test_parse_persistent_vm_role_response() {
        // GetRole responses use PersistentVMRole as the root element
        let xml = r#"<PersistentVMRole xmlns="http://schemas.microsoft.com/windowsazure">
            <RoleName>web-01</RoleName>
            <RoleType>PersistentVMRole</RoleType>
            <ConfigurationSets>
                <ConfigurationSet>
                    <ConfigurationSetType>NetworkConfiguration</ConfigurationSetType>
                    <InputEndpoints>
                        <InputEndpoint>
                            <LocalPort>22</LocalPort>
                            <Name>SSH</Name>
                            <Port>22</Port>
                            <Protocol>TCP</Protocol>
                        </InputEndpoint>
                    </InputEndpoints>
                </ConfigurationSet>
            </ConfigurationSets>
            <RoleSize>Small</RoleSize>
        </PersistentVMRole>"#;
        let role: Role = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(role.role_name, "web-01");
        let sets = role.configuration_sets.unwrap();
        assert_eq!(sets.items.len(), 1);
        let endpoints = sets.items[0].input_endpoints.as_ref().unwrap();
        assert_eq!(endpoints.items[0].port, 22);
        assert!(!role.provision_guest_agent);
    }
}
