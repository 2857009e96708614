//! # azure-asm - Azure Service Management API Client
//!
//! Rust client for the Azure Service Management ("classic") control plane:
//! hosted services, virtual machine deployments and roles, storage accounts,
//! OS images, datacenter locations, role sizes and the subscription-wide
//! virtual network configuration.
//!
//! The API is asynchronous by design: mutating calls are accepted immediately
//! and return a request id in the `x-ms-request-id` header, while the actual
//! work completes server-side. Handlers here return that request id; polling
//! it to completion is the job of the `azure-asm-core` crate, which layers
//! workflows (create-and-wait, compensation on partial failure) on top of
//! this client.
//!
//! # Example
//!
//! ```rust,no_run
//! use azure_asm::AsmClient;
//!
//! # async fn example() -> azure_asm::Result<()> {
//! let client = AsmClient::builder()
//!     .subscription_id("a1b2c3d4-...")
//!     .management_certificate("~/.azure/management.pem")
//!     .build()?;
//!
//! let request_id = client
//!     .hosted_services()
//!     .create("my-service", "West US", None)
//!     .await?;
//! let operation = client.operations().get(&request_id).await?;
//! println!("status: {}", operation.status);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod deployments;
pub mod error;
pub mod hosted_services;
pub mod locations;
pub mod operations;
pub mod os_images;
pub mod role_sizes;
pub mod storage_services;
pub mod virtual_networks;

#[cfg(feature = "test-support")]
pub mod testing;

pub use client::{AsmClient, AsmClientBuilder, DEFAULT_MANAGEMENT_URL};
pub use error::{AsmError, Result};

/// XML namespace of the Service Management schema
pub const AZURE_XMLNS: &str = "http://schemas.microsoft.com/windowsazure";
