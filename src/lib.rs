//! Workspace placeholder crate.
//!
//! Host applications can depend on `playback-control-workspace` and enable the
//! `rpc-server` feature (on by default) instead of wiring `core-service`,
//! `core-runtime` and `bridge-traits` individually.

#[cfg(feature = "rpc-server")]
pub use core_service::*;
