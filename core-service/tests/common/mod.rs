//! In-memory playback engine shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::{
    BridgeError, ItemReference, PlaybackControl, PlaybackItem, PlaybackStatus,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct EngineState {
    current: Option<PlaybackItem>,
    status: Option<PlaybackStatus>,
    position: Duration,
    unavailable: bool,
}

/// Engine that "plays" items from a fixed catalog without producing sound.
///
/// Position only moves when a test calls [`InMemoryEngine::advance`].
pub struct InMemoryEngine {
    catalog: HashMap<String, PlaybackItem>,
    state: Mutex<EngineState>,
    status_delay: Mutex<Option<Duration>>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self {
            catalog: HashMap::new(),
            state: Mutex::new(EngineState::default()),
            status_delay: Mutex::new(None),
        }
    }

    pub fn with_item(mut self, item: PlaybackItem) -> Self {
        self.catalog.insert(item.id.as_str().to_string(), item);
        self
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap();
        state.position += by;
    }

    /// Make the next `status` call wait before answering.
    pub fn delay_next_status(&self, delay: Duration) {
        *self.status_delay.lock().unwrap() = Some(delay);
    }

    /// Make every subsequent call fail with `NotAvailable`.
    pub fn go_offline(&self) {
        self.state.lock().unwrap().unavailable = true;
    }

    fn check_online(state: &EngineState) -> bridge_traits::error::Result<()> {
        if state.unavailable {
            return Err(BridgeError::NotAvailable("audio device".to_string()));
        }
        Ok(())
    }
}

pub fn sample_item(id: &str, duration_ms: u64) -> PlaybackItem {
    PlaybackItem::new(id)
        .with_title(format!("Title of {}", id))
        .with_author("Unknown Artist")
        .with_duration(Duration::from_millis(duration_ms))
}

#[async_trait]
impl PlaybackControl for InMemoryEngine {
    async fn current_item(&self) -> bridge_traits::error::Result<Option<PlaybackItem>> {
        let state = self.state.lock().unwrap();
        Self::check_online(&state)?;
        Ok(state.current.clone())
    }

    async fn playback_position(&self) -> bridge_traits::error::Result<Duration> {
        let state = self.state.lock().unwrap();
        Self::check_online(&state)?;
        if state.current.is_none() {
            return Err(BridgeError::NoItemLoaded);
        }
        Ok(state.position)
    }

    async fn status(&self) -> bridge_traits::error::Result<PlaybackStatus> {
        let delay = self.status_delay.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        Self::check_online(&state)?;
        Ok(state.status.unwrap_or(PlaybackStatus::Stopped))
    }

    async fn play_item(&self, item: ItemReference) -> bridge_traits::error::Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_online(&state)?;
        let found = self
            .catalog
            .get(item.as_str())
            .cloned()
            .ok_or_else(|| BridgeError::ItemNotFound(item.to_string()))?;
        state.current = Some(found);
        state.status = Some(PlaybackStatus::Playing);
        state.position = Duration::ZERO;
        Ok(())
    }

    async fn play(&self) -> bridge_traits::error::Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_online(&state)?;
        if state.current.is_none() {
            return Err(BridgeError::NoItemLoaded);
        }
        state.status = Some(PlaybackStatus::Playing);
        Ok(())
    }

    async fn pause(&self) -> bridge_traits::error::Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_online(&state)?;
        if state.status == Some(PlaybackStatus::Playing) {
            state.status = Some(PlaybackStatus::Paused);
        }
        Ok(())
    }

    async fn stop(&self) -> bridge_traits::error::Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_online(&state)?;
        state.status = Some(PlaybackStatus::Stopped);
        state.position = Duration::ZERO;
        Ok(())
    }
}
