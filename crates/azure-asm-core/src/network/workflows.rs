//! Network configuration replacement with operation tracking

use crate::error::Result;
use crate::progress::{ProgressCallback, wait_for_operation};
use crate::vm::workflows::DEFAULT_INTERVAL;
use azure_asm::AsmClient;
use azure_asm::virtual_networks::NetworkConfiguration;
use std::time::Duration;
use tracing::info;

/// Replace the subscription's network configuration and wait for the
/// operation to complete.
///
/// The configuration document covers the whole subscription, so the usual
/// pattern is fetch, modify, submit. The replacement is last-writer-wins:
/// callers must not run concurrent network configuration updates against
/// the same subscription, or one update silently overwrites the other.
pub async fn set_network_configuration_and_wait(
    client: &AsmClient,
    configuration: &NetworkConfiguration,
    timeout: Duration,
    on_progress: Option<ProgressCallback>,
) -> Result<()> {
    info!("replacing network configuration");
    let request_id = client
        .virtual_networks()
        .set_configuration(configuration)
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
