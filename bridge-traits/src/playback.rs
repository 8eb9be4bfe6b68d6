//! Playback control bridge trait and the values it exchanges.
//!
//! The host application owns the actual playback engine. It hands the core a
//! [`PlaybackControl`] implementation, and the core republishes it to remote
//! callers without adding any playback logic of its own.

use crate::{error::Result, platform::PlatformSendSync};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Opaque, URI-like locator naming a media item.
///
/// The value is never normalized or validated; it travels exactly as the
/// caller supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemReference(String);

impl ItemReference {
    /// Wrap an existing locator string.
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Borrow the locator.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the reference and return the locator.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ItemReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ItemReference {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ItemReference {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Descriptor of the item currently loaded by the playback engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackItem {
    /// Reference the item was requested with.
    pub id: ItemReference,
    /// Reference of the underlying data (e.g. archive member or file).
    pub data_id: ItemReference,
    /// Display title, empty when unknown.
    pub title: String,
    /// Display author, empty when unknown.
    pub author: String,
    /// Total item duration. Serialized as whole milliseconds.
    #[serde(rename = "duration_ms", with = "duration_millis")]
    pub duration: Duration,
}

/// Converts a duration to whole milliseconds.
///
/// Sub-millisecond remainders are dropped (floor). Durations longer than
/// `u64::MAX` milliseconds saturate, so the result never decreases as the
/// input grows.
pub fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

mod duration_millis {
    use super::*;

    pub fn serialize<S: Serializer>(
        duration: &Duration,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration_to_millis(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

impl PlaybackItem {
    /// Create an item whose id and data id are the same reference.
    pub fn new(id: impl Into<ItemReference>) -> Self {
        let id = id.into();
        Self {
            data_id: id.clone(),
            id,
            title: String::new(),
            author: String::new(),
            duration: Duration::ZERO,
        }
    }

    /// Attach a separate data reference.
    pub fn with_data_id(mut self, data_id: impl Into<ItemReference>) -> Self {
        self.data_id = data_id.into();
        self
    }

    /// Attach a display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Attach a display author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Attach the total duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Playback lifecycle state reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaybackStatus {
    Stopped,
    Playing,
    Paused,
}

impl PlaybackStatus {
    /// Every variant, in declaration order.
    pub const ALL: [PlaybackStatus; 3] = [
        PlaybackStatus::Stopped,
        PlaybackStatus::Playing,
        PlaybackStatus::Paused,
    ];

    /// Canonical wire string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackStatus::Stopped => "STOPPED",
            PlaybackStatus::Playing => "PLAYING",
            PlaybackStatus::Paused => "PAUSED",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the canonical status strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown playback status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for PlaybackStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PlaybackStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// Trait implemented by the host's playback engine.
///
/// Implementations are shared between the core and the host, so they must be
/// safe to call concurrently from several tasks on native targets.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait PlaybackControl: PlatformSendSync {
    /// Item currently loaded, if any.
    async fn current_item(&self) -> Result<Option<PlaybackItem>>;

    /// Position within the current item.
    async fn playback_position(&self) -> Result<Duration>;

    /// Current lifecycle state.
    async fn status(&self) -> Result<PlaybackStatus>;

    /// Load the referenced item and start playing it.
    async fn play_item(&self, item: ItemReference) -> Result<()>;

    /// Start or resume playback of the current item.
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping the position.
    async fn pause(&self) -> Result<()>;

    /// Stop playback and reset the position to the start.
    async fn stop(&self) -> Result<()>;
}
