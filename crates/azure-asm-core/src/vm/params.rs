//! Convenience parameter struct for VM creation
//!
//! Collects the discrete inputs of a virtual machine in one place before
//! [`prepare_role`](crate::vm::prepare_role) cross-validates them and
//! assembles the role.

use std::path::PathBuf;

/// Parameters for creating a virtual machine
///
/// The DNS name doubles as hosted service name, deployment name, role name
/// and host name, matching how the portal creates standalone machines.
///
/// # Example
///
/// ```rust
/// use azure_asm_core::vm::CreateVmParams;
///
/// let params = CreateVmParams::new("my-vm", "Small", "ubuntu-14_04", "West US", "azureuser")
///     .with_password("S3cret1pw")
///     .with_ssh_port(2222);
/// ```
#[derive(Debug, Clone)]
pub struct CreateVmParams {
    /// DNS name of the machine; becomes `<dns_name>.cloudapp.net` (required)
    pub dns_name: String,
    /// Role size, e.g. `Small` (required)
    pub instance_size: String,
    /// OS image name or label (required)
    pub image_name: String,
    /// Target datacenter location (required)
    pub location: String,
    /// Provisioned user account name (required)
    pub user_name: String,
    /// Account password; when absent, certificate auth must be configured
    pub password: Option<String>,
    /// PEM certificate whose key becomes the SSH identity
    pub certificate_path: Option<PathBuf>,
    /// External SSH port (default: 22)
    pub ssh_port: u16,
}

impl CreateVmParams {
    /// Create new params with required fields
    #[must_use]
    pub fn new(
        dns_name: impl Into<String>,
        instance_size: impl Into<String>,
        image_name: impl Into<String>,
        location: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            dns_name: dns_name.into(),
            instance_size: instance_size.into(),
            image_name: image_name.into(),
            location: location.into(),
            user_name: user_name.into(),
            password: None,
            certificate_path: None,
            ssh_port: 22,
        }
    }

    /// Set the account password
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the PEM certificate used for SSH key authentication
    #[must_use]
    pub fn with_certificate(mut self, path: impl Into<PathBuf>) -> Self {
        self.certificate_path = Some(path.into());
        self
    }

    /// Set the external SSH port
    #[must_use]
    pub fn with_ssh_port(mut self, port: u16) -> Self {
        self.ssh_port = port;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = CreateVmParams::new("vm", "Small", "img", "West US", "azureuser");
        assert_eq!(params.ssh_port, 22);
        assert!(params.password.is_none());
        assert!(params.certificate_path.is_none());
    }

    #[test]
    fn test_with_options() {
        let params = CreateVmParams::new("vm", "Small", "img", "West US", "azureuser")
            .with_password("S3cret1pw")
            .with_certificate("/tmp/identity.pem")
            .with_ssh_port(2222);
        assert_eq!(params.password.as_deref(), Some("S3cret1pw"));
        assert_eq!(
            params.certificate_path.as_deref(),
            Some(std::path::Path::new("/tmp/identity.pem"))
        );
        assert_eq!(params.ssh_port, 2222);
    }
}
