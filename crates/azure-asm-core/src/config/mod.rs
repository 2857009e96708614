//! Configuration and profile management
//!
// Allow nested config module - this is intentional for the config subsystem

#![allow(clippy::module_inception)]
//!
//! A reusable configuration system for managing subscription credentials.
//! Profiles are stored in TOML with environment variable expansion, so a
//! config file can reference `${AZURE_SUBSCRIPTION_ID}` instead of
//! embedding the value.

pub mod config;
pub mod error;

pub use config::{Config, Profile};
pub use error::{ConfigError, Result};
