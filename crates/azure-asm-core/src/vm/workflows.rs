//! Multi-step VM workflows with operation tracking
//!
//! Each workflow submits one or more management calls and waits for the
//! resulting operations to complete. The creation workflow compensates on
//! partial failure: once the hosted service exists, any later failure
//! deletes it again so a failed creation leaves nothing behind.

use crate::error::{CoreError, Result};
use crate::progress::{ProgressCallback, wait_for_operation};
use crate::vm::assembly::{VirtualMachine, verify_dns_name};
use azure_asm::AsmClient;
use azure_asm::deployments::Deployment;
use std::time::Duration;
use tracing::{info, warn};

/// Default timeout for waiting on an operation (10 minutes)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Default interval between polling attempts (5 seconds)
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

const CERTIFICATE_FORMAT: &str = "pfx";

/// Create a standalone virtual machine and wait until it is deployed.
///
/// The workflow runs three remote steps in order, waiting for each
/// operation to reach a terminal state before the next:
///
/// 1. create the hosted service named after `dns_name`
/// 2. upload the service certificate, when the machine carries one
/// 3. create the production deployment holding the role
///
/// If step 2 or 3 fails, the hosted service created in step 1 is deleted
/// again before the error is returned. When that rollback itself fails,
/// the returned [`CoreError::CompensationFailed`] carries both causes.
pub async fn create_virtual_machine_and_wait(
    client: &AsmClient,
    vm: &VirtualMachine,
    dns_name: &str,
    location: &str,
    timeout: Duration,
    on_progress: Option<ProgressCallback>,
) -> Result<()> {
    verify_dns_name(dns_name)?;
    let on_progress = on_progress.as_ref();

    info!(dns_name, location, "creating hosted service");
    let request_id = client
        .hosted_services()
        .create(dns_name, location, None)
        .await?;
    wait_for_operation(client, &request_id, timeout, DEFAULT_INTERVAL, on_progress).await?;

    if let Some(path) = &vm.certificate {
        info!(dns_name, certificate = %path.display(), "uploading service certificate");
        let result = upload_certificate(client, dns_name, path, timeout, on_progress).await;
        if let Err(e) = result {
            return Err(compensate(client, dns_name, timeout, e).await);
        }
    }

    info!(dns_name, role = %vm.role.role_name, "creating deployment");
    let deployment = Deployment::from_role(vm.role.clone());
    let result = async {
        let request_id = client.deployments().create(dns_name, &deployment).await?;
        wait_for_operation(client, &request_id, timeout, DEFAULT_INTERVAL, on_progress).await?;
        Ok(())
    }
    .await;
    if let Err(e) = result {
        return Err(compensate(client, dns_name, timeout, e).await);
    }

    info!(dns_name, "virtual machine created");
    Ok(())
}

async fn upload_certificate(
    client: &AsmClient,
    service_name: &str,
    path: &std::path::Path,
    timeout: Duration,
    on_progress: Option<&ProgressCallback>,
) -> Result<()> {
    let data = std::fs::read(path).map_err(|e| {
        CoreError::Validation(format!(
            "failed to read certificate {}: {}",
            path.display(),
            e
        ))
    })?;
    let request_id = client
        .hosted_services()
        .add_certificate(service_name, &data, CERTIFICATE_FORMAT)
        .await?;
    wait_for_operation(client, &request_id, timeout, DEFAULT_INTERVAL, on_progress).await?;
    Ok(())
}

/// Roll the hosted service back after a failed creation step.
///
/// Returns the error to surface: the original cause when the rollback
/// succeeds, or [`CoreError::CompensationFailed`] carrying both when it
/// does not. The rollback is awaited so the caller never races a
/// half-deleted service.
async fn compensate(
    client: &AsmClient,
    service_name: &str,
    timeout: Duration,
    original: CoreError,
) -> CoreError {
    warn!(service_name, error = %original, "creation failed, deleting hosted service");
    let rollback = async {
        let request_id = client.hosted_services().delete(service_name).await?;
        wait_for_operation(client, &request_id, timeout, DEFAULT_INTERVAL, None).await?;
        Ok::<_, CoreError>(())
    }
    .await;
    match rollback {
        Ok(()) => original,
        Err(rollback) => {
            warn!(service_name, error = %rollback, "rollback failed, hosted service left behind");
            CoreError::CompensationFailed {
                original: Box::new(original),
                rollback: Box::new(rollback),
            }
        }
    }
}

/// Start a stopped role and wait for the operation to complete
pub async fn start_role_and_wait(
    client: &AsmClient,
    service_name: &str,
    deployment_name: &str,
    role_name: &str,
    timeout: Duration,
    on_progress: Option<ProgressCallback>,
) -> Result<()> {
    let request_id = client
        .deployments()
        .start_role(service_name, deployment_name, role_name)
        .await?;
    wait_for_operation(
        client,
        &request_id,
        timeout,
        DEFAULT_INTERVAL,
        on_progress.as_ref(),
    )
    .await?;
    Ok(())
}

/// Shut a role down and wait for the operation to complete
pub async fn shutdown_role_and_wait(
    client: &AsmClient,
    service_name: &str,
    deployment_name: &str,
    role_name: &str,
    timeout: Duration,
    on_progress: Option<ProgressCallback>,
) -> Result<()> {
    let request_id = client
        .deployments()
        .shutdown_role(service_name, deployment_name, role_name)
        .await?;
    wait_for_operation(
        client,
        &request_id,
        timeout,
        DEFAULT_INTERVAL,
        on_progress.as_ref(),
    )
    .await?;
    Ok(())
}

/// Restart a running role and wait for the operation to complete
pub async fn restart_role_and_wait(
    client: &AsmClient,
    service_name: &str,
    deployment_name: &str,
    role_name: &str,
    timeout: Duration,
    on_progress: Option<ProgressCallback>,
) -> Result<()> {
    let request_id = client
        .deployments()
        .restart_role(service_name, deployment_name, role_name)
        .await?;
    wait_for_operation(
        client,
        &request_id,
        timeout,
        DEFAULT_INTERVAL,
        on_progress.as_ref(),
    )
    .await?;
    Ok(())
}

/// Delete a role from its deployment and wait for the operation to complete
pub async fn delete_role_and_wait(
    client: &AsmClient,
    service_name: &str,
    deployment_name: &str,
    role_name: &str,
    timeout: Duration,
    on_progress: Option<ProgressCallback>,
) -> Result<()> {
    let request_id = client
        .deployments()
        .delete_role(service_name, deployment_name, role_name)
        .await?;
    wait_for_operation(
        client,
        &request_id,
        timeout,
        DEFAULT_INTERVAL,
        on_progress.as_ref(),
    )
    .await?;
    Ok(())
}

/// Delete a deployment together with its disk blobs and wait for the
/// operation to complete
pub async fn delete_deployment_and_wait(
    client: &AsmClient,
    service_name: &str,
    deployment_name: &str,
    timeout: Duration,
    on_progress: Option<ProgressCallback>,
) -> Result<()> {
    let request_id = client
        .deployments()
        .delete(service_name, deployment_name)
        .await?;
    wait_for_operation(
        client,
        &request_id,
        timeout,
        DEFAULT_INTERVAL,
        on_progress.as_ref(),
    )
    .await?;
    Ok(())
}
