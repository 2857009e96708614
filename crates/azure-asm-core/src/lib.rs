//! # azure-asm-core - workflows over the Service Management client
//!
//! The `azure-asm` client returns a request id for every mutating call; this
//! crate turns those fire-and-forget submissions into synchronous-looking
//! operations with defined completion, failure and timeout semantics:
//!
//! - [`progress`] - polls an operation's status until it leaves `InProgress`,
//!   within a bounded wait budget and with optional progress callbacks
//! - [`vm`] - virtual machine lifecycle workflows: validated role assembly,
//!   create-with-compensation, role state transitions, deletion
//! - [`network`] - subscription-wide virtual network configuration updates
//! - [`config`] - TOML profiles (subscription id, management certificate,
//!   endpoint) with environment variable overrides
//!
//! Workflows for different subscriptions or services can run concurrently;
//! workflows touching the same hosted service, deployment or the
//! subscription's network configuration must not, because the control plane
//! serializes them server-side. That constraint is the caller's to honor.
//!
//! # Example
//!
//! ```rust,ignore
//! use azure_asm_core::vm::{CreateVmParams, prepare_role, create_virtual_machine_and_wait};
//! use azure_asm_core::vm::DEFAULT_TIMEOUT;
//!
//! let params = CreateVmParams::new("my-vm", "Small", "ubuntu-image", "West US", "azureuser")
//!     .with_password("S3cret1pw");
//! let vm = prepare_role(&client, &params, DEFAULT_TIMEOUT).await?.build()?;
//! create_virtual_machine_and_wait(&client, &vm, "my-vm", "West US", DEFAULT_TIMEOUT, None).await?;
//! ```

pub mod config;
pub mod error;
pub mod network;
pub mod progress;
pub mod vm;

pub use error::{CoreError, Result};
pub use progress::{ProgressCallback, ProgressEvent, wait_for_operation};
