//! Core service façade and bootstrap helpers.
//!
//! This crate republishes a host-provided
//! [`PlaybackControl`](bridge_traits::PlaybackControl) engine to remote
//! callers:
//!
//! - [`ControlFacade`] forwards each call to the engine and converts results
//!   to wire types (milliseconds, status strings).
//! - [`RemotePlaybackControl`] is the surface any transport registers.
//! - [`server::RpcServer`] and [`client::PlaybackControlClient`] provide a
//!   ready-made line-delimited JSON transport over TCP.
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_service::CoreService;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = CoreConfig::builder().delegate(engine).build()?;
//! let service = CoreService::new(config);
//! let server = service.bind().await?;
//! server.serve(CancellationToken::new()).await?;
//! ```

pub mod client;
pub mod error;
pub mod facade;
pub mod remote;
pub mod rpc;
pub mod server;

pub use client::PlaybackControlClient;
pub use error::{CoreError, Result};
pub use facade::{duration_to_millis, ControlFacade};
pub use remote::RemotePlaybackControl;
pub use server::RpcServer;

use core_runtime::config::{CoreConfig, TransportConfig};
use std::sync::Arc;
use tracing::info;

/// Primary façade exposed to host applications.
#[derive(Clone, Debug)]
pub struct CoreService {
    facade: ControlFacade,
    transport: TransportConfig,
}

impl CoreService {
    /// Create a new service from a validated configuration.
    pub fn new(config: CoreConfig) -> Self {
        let CoreConfig {
            delegate,
            transport,
        } = config;

        Self {
            facade: ControlFacade::new(delegate),
            transport,
        }
    }

    /// The facade, for hosts that register it with their own transport.
    pub fn facade(&self) -> ControlFacade {
        self.facade.clone()
    }

    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// Bind the bundled TCP transport with the configured settings.
    pub async fn bind(&self) -> Result<RpcServer> {
        info!(address = %self.transport.bind_address, "Starting playback control server");
        RpcServer::bind(self.transport.clone(), Arc::new(self.facade.clone())).await
    }
}
