//! # Core Runtime Module
//!
//! Foundational infrastructure shared by the remote control service:
//! - Logging and tracing setup
//! - Configuration management with fail-fast validation

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
