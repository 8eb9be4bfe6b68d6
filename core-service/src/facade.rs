//! # Control Facade
//!
//! Republishes the host's [`PlaybackControl`] as a [`RemotePlaybackControl`].
//!
//! The facade holds nothing but a shared handle to the engine. Each call is
//! forwarded as-is; the only work done here is turning values into their wire
//! representation:
//!
//! | Engine value | Wire value |
//! |---|---|
//! | `Option<PlaybackItem>` | unchanged structural copy (duration as `duration_ms`) |
//! | `Duration` position | `u64` milliseconds, floor, saturating |
//! | `PlaybackStatus` | `"STOPPED"` / `"PLAYING"` / `"PAUSED"` |
//!
//! Engine errors come back as [`CoreError::Delegate`] holding the engine's own
//! [`BridgeError`](bridge_traits::BridgeError) value.

use crate::error::{CoreError, Result};
use crate::remote::RemotePlaybackControl;
use async_trait::async_trait;
use bridge_traits::{ItemReference, PlaybackControl, PlaybackItem};
use core_runtime::logging::strip_path;
use std::sync::Arc;
use tracing::{debug, warn};

pub use bridge_traits::duration_to_millis;

/// Forwards remote calls to a shared playback engine.
#[derive(Clone)]
pub struct ControlFacade {
    delegate: Arc<dyn PlaybackControl>,
}

impl ControlFacade {
    /// Wrap a shared engine handle. The host keeps its own clone.
    pub fn new(delegate: Arc<dyn PlaybackControl>) -> Self {
        Self { delegate }
    }
}

impl std::fmt::Debug for ControlFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlFacade")
            .field("delegate", &"PlaybackControl { ... }")
            .finish()
    }
}

fn forwarded<T>(operation: &'static str, result: bridge_traits::error::Result<T>) -> Result<T> {
    result.map_err(|err| {
        warn!(operation, error = %err, "Playback engine rejected call");
        CoreError::Delegate(err)
    })
}

#[async_trait]
impl RemotePlaybackControl for ControlFacade {
    async fn item(&self) -> Result<Option<PlaybackItem>> {
        debug!(operation = "get_item", "Forwarding call");
        forwarded("get_item", self.delegate.current_item().await)
    }

    async fn playback_position(&self) -> Result<u64> {
        debug!(operation = "get_playback_position", "Forwarding call");
        let position = forwarded(
            "get_playback_position",
            self.delegate.playback_position().await,
        )?;
        Ok(duration_to_millis(position))
    }

    async fn status(&self) -> Result<String> {
        debug!(operation = "get_status", "Forwarding call");
        let status = forwarded("get_status", self.delegate.status().await)?;
        Ok(status.as_str().to_string())
    }

    async fn play_item(&self, item: ItemReference) -> Result<()> {
        debug!(
            operation = "play_item",
            item = %strip_path(item.as_str()),
            "Forwarding call"
        );
        forwarded("play_item", self.delegate.play_item(item).await)
    }

    async fn play(&self) -> Result<()> {
        debug!(operation = "play", "Forwarding call");
        forwarded("play", self.delegate.play().await)
    }

    async fn pause(&self) -> Result<()> {
        debug!(operation = "pause", "Forwarding call");
        forwarded("pause", self.delegate.pause().await)
    }

    async fn stop(&self) -> Result<()> {
        debug!(operation = "stop", "Forwarding call");
        forwarded("stop", self.delegate.stop().await)
    }
}
