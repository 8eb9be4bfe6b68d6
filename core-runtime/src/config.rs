//! # Core Configuration Module
//!
//! Configuration for the remote playback control service.
//!
//! ## Overview
//!
//! A builder assembles a [`CoreConfig`] holding the host's playback engine and
//! the transport settings used by the RPC server. The builder fails fast when
//! the playback engine is missing, since the service has nothing to expose
//! without it.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, TransportConfig};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .delegate(Arc::new(MyPlaybackEngine::new()))
//!     .transport(TransportConfig::default().with_max_connections(4))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // Panics: no PlaybackControl was supplied
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing playback control");
//! ```

use crate::error::{Error, Result};
use bridge_traits::PlaybackControl;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

/// Default port the RPC server listens on.
pub const DEFAULT_PORT: u16 = 7455;

/// Default cap on a single request or response line, in bytes.
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 64 * 1024;

/// Default number of connections served at the same time.
pub const DEFAULT_MAX_CONNECTIONS: usize = 32;

/// Settings for the line-delimited JSON transport.
///
/// Serializable so hosts can keep it in their own settings files:
///
/// ```
/// use core_runtime::config::TransportConfig;
///
/// let config: TransportConfig = serde_json::from_str(
///     r#"{"bind_address": "0.0.0.0:9000", "max_connections": 4}"#,
/// ).unwrap();
///
/// assert_eq!(config.bind_address.port(), 9000);
/// assert_eq!(config.max_connections, 4);
/// assert_eq!(config.max_frame_length, 64 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Address the server binds to. Port 0 picks an ephemeral port.
    pub bind_address: SocketAddr,

    /// Longest accepted line, excluding the terminating newline
    pub max_frame_length: usize,

    /// Connections beyond this limit wait until a slot frees up
    pub max_connections: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl TransportConfig {
    pub fn with_bind_address(mut self, address: SocketAddr) -> Self {
        self.bind_address = address;
        self
    }

    pub fn with_max_frame_length(mut self, length: usize) -> Self {
        self.max_frame_length = length;
        self
    }

    pub fn with_max_connections(mut self, connections: usize) -> Self {
        self.max_connections = connections;
        self
    }

    /// Validates the transport limits.
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_length == 0 {
            return Err(Error::Config(
                "Max frame length must be greater than 0 bytes".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(Error::Config(
                "Max connections must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration for the remote playback control service.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Host playback engine every remote call is forwarded to (required)
    pub delegate: Arc<dyn PlaybackControl>,

    /// RPC transport settings
    pub transport: TransportConfig,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("delegate", &"PlaybackControl { ... }")
            .field("transport", &self.transport)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        self.transport.validate()
    }
}

fn playback_control_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "PlaybackControl".to_string(),
        message: "A PlaybackControl implementation is required; it is the engine every \
                 remote call is forwarded to. Inject the host's playback service with \
                 .delegate() before building."
            .to_string(),
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    delegate: Option<Arc<dyn PlaybackControl>>,
    transport: Option<TransportConfig>,
}

impl CoreConfigBuilder {
    /// Sets the playback engine (required).
    ///
    /// The handle is shared: the host keeps its own clone and the engine
    /// outlives every service built from this config.
    pub fn delegate(mut self, delegate: Arc<dyn PlaybackControl>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Sets the transport settings.
    ///
    /// Default: `127.0.0.1:7455`, 64 KiB frames, 32 connections.
    pub fn transport(mut self, transport: TransportConfig) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the final `CoreConfig`.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when no playback engine was supplied
    /// - [`Error::Config`] when transport limits are invalid
    pub fn build(self) -> Result<CoreConfig> {
        let delegate = self.delegate.ok_or_else(playback_control_missing_error)?;

        let config = CoreConfig {
            delegate,
            transport: self.transport.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{ItemReference, PlaybackItem, PlaybackStatus};
    use std::time::Duration;

    struct IdlePlayback;

    #[async_trait]
    impl PlaybackControl for IdlePlayback {
        async fn current_item(&self) -> BridgeResult<Option<PlaybackItem>> {
            Ok(None)
        }

        async fn playback_position(&self) -> BridgeResult<Duration> {
            Ok(Duration::ZERO)
        }

        async fn status(&self) -> BridgeResult<PlaybackStatus> {
            Ok(PlaybackStatus::Stopped)
        }

        async fn play_item(&self, _item: ItemReference) -> BridgeResult<()> {
            Ok(())
        }

        async fn play(&self) -> BridgeResult<()> {
            Ok(())
        }

        async fn pause(&self) -> BridgeResult<()> {
            Ok(())
        }

        async fn stop(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_builder_requires_delegate() {
        let result = CoreConfig::builder().build();

        match result {
            Err(Error::CapabilityMissing { capability, message }) => {
                assert_eq!(capability, "PlaybackControl");
                assert!(message.contains(".delegate()"));
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_uses_default_transport() {
        let config = CoreConfig::builder()
            .delegate(Arc::new(IdlePlayback))
            .build()
            .unwrap();

        assert_eq!(config.transport, TransportConfig::default());
        assert_eq!(config.transport.bind_address.port(), DEFAULT_PORT);
        assert!(config.transport.bind_address.ip().is_loopback());
    }

    #[test]
    fn test_builder_with_custom_transport() {
        let transport = TransportConfig::default()
            .with_bind_address("0.0.0.0:0".parse().unwrap())
            .with_max_frame_length(1024)
            .with_max_connections(2);

        let config = CoreConfig::builder()
            .delegate(Arc::new(IdlePlayback))
            .transport(transport.clone())
            .build()
            .unwrap();

        assert_eq!(config.transport, transport);
    }

    #[test]
    fn test_validate_rejects_zero_frame_length() {
        let result = CoreConfig::builder()
            .delegate(Arc::new(IdlePlayback))
            .transport(TransportConfig::default().with_max_frame_length(0))
            .build();

        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("frame length")));
    }

    #[test]
    fn test_validate_rejects_zero_connections() {
        let result = CoreConfig::builder()
            .delegate(Arc::new(IdlePlayback))
            .transport(TransportConfig::default().with_max_connections(0))
            .build();

        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("connections")));
    }

    #[test]
    fn test_transport_config_roundtrips_through_json() {
        let transport = TransportConfig::default().with_max_connections(8);
        let json = serde_json::to_string(&transport).unwrap();
        let parsed: TransportConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, transport);
    }

    #[test]
    fn test_debug_hides_delegate() {
        let config = CoreConfig::builder()
            .delegate(Arc::new(IdlePlayback))
            .build()
            .unwrap();

        let debug = format!("{:?}", config);
        assert!(debug.contains("PlaybackControl { ... }"));
        assert!(debug.contains("max_frame_length"));
    }
}
