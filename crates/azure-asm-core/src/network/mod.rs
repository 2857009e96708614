//! Virtual network configuration workflows
//!
//! The network configuration is a single subscription-wide XML document;
//! there is no per-site update call. [`workflows`] wraps the replace call
//! with operation tracking.

pub mod workflows;

pub use workflows::set_network_configuration_and_wait;
