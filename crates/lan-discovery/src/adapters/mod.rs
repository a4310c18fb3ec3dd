//! # Adapters
//!
//! Concrete implementations of the driven ports:
//!
//! - `config`: static and TOML configuration providers, env overrides
//! - `mdns`: multicast DNS protocol backend (feature `mdns`)

pub mod config;

#[cfg(feature = "mdns")]
pub mod mdns;

pub use config::{apply_env_overrides, apply_overrides, StaticConfigProvider};

#[cfg(feature = "toml-config")]
pub use config::TomlConfigProvider;

#[cfg(feature = "mdns")]
pub use mdns::MdnsSdProtocol;
