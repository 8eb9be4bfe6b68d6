//! Remote-callable playback control surface.
//!
//! Every value crossing this trait is wire safe: integers, strings and the
//! serde-serializable [`PlaybackItem`]. Transports register an
//! `Arc<dyn RemotePlaybackControl>` and never see the host's engine directly.

use crate::error::Result;
use async_trait::async_trait;
use bridge_traits::{ItemReference, PlaybackItem};

#[async_trait]
pub trait RemotePlaybackControl: Send + Sync {
    /// Item currently loaded, `None` when nothing is loaded.
    async fn item(&self) -> Result<Option<PlaybackItem>>;

    /// Position within the current item in whole milliseconds.
    async fn playback_position(&self) -> Result<u64>;

    /// Canonical status string (`"STOPPED"`, `"PLAYING"` or `"PAUSED"`).
    async fn status(&self) -> Result<String>;

    async fn play_item(&self, item: ItemReference) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn stop(&self) -> Result<()>;
}
