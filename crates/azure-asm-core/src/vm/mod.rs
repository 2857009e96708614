//! Virtual machine lifecycle workflows
//!
//! Role assembly ([`RoleBuilder`], [`prepare_role`]) builds the validated
//! deployment document; [`workflows`] submits it and tracks the resulting
//! operations, compensating on partial failure.

pub mod assembly;
pub mod params;
pub mod workflows;

pub use assembly::{
    ExtensionParams, RoleBuilder, VirtualMachine, certificate_fingerprint,
    linux_provisioning_config, network_config, prepare_role, verify_dns_name, verify_password,
};
pub use params::CreateVmParams;
pub use workflows::{
    DEFAULT_INTERVAL, DEFAULT_TIMEOUT, create_virtual_machine_and_wait, delete_deployment_and_wait,
    delete_role_and_wait, restart_role_and_wait, shutdown_role_and_wait, start_role_and_wait,
};
