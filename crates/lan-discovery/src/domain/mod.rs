//! Domain Layer - Pure types with no I/O
//!
//! - Discovered-peer events and the advertised service identity
//! - Session configuration and its validation
//! - Error taxonomy

pub mod config;
pub mod entities;
pub mod errors;

pub use config::*;
pub use entities::*;
pub use errors::*;
