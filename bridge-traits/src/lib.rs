//! # Host Bridge Traits
//!
//! Contracts the host application implements so the core can republish its
//! playback engine to remote callers.
//!
//! ## Traits
//!
//! - [`PlaybackControl`](playback::PlaybackControl) - The host's playback engine
//!   (current item, position, status, play/pause/stop)
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). The core never
//! rewrites these errors: whatever variant the host returns is the variant a
//! remote caller observes.
//!
//! ## Thread Safety
//!
//! Bridge traits require `Send + Sync` on native targets because the RPC
//! server dispatches calls from many connections concurrently.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::playback::{ItemReference, PlaybackControl, PlaybackItem, PlaybackStatus};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//! use std::time::Duration;
//!
//! pub struct EnginePlayback {
//!     engine: MyEngine,
//! }
//!
//! #[async_trait]
//! impl PlaybackControl for EnginePlayback {
//!     async fn current_item(&self) -> Result<Option<PlaybackItem>> {
//!         Ok(self.engine.loaded())
//!     }
//!     async fn playback_position(&self) -> Result<Duration> {
//!         Ok(self.engine.position())
//!     }
//!     // ...
//! }
//! ```

pub mod error;
pub mod logging;
pub mod platform;
pub mod playback;

pub use error::BridgeError;

pub use logging::{LogEntry, LogLevel, LoggerSink};
pub use playback::{
    duration_to_millis, ItemReference, ParseStatusError, PlaybackControl, PlaybackItem,
    PlaybackStatus,
};
