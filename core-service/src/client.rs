//! # RPC Client
//!
//! Proxy that implements [`RemotePlaybackControl`] by sending calls to an
//! [`RpcServer`](crate::server::RpcServer) over one TCP connection.
//!
//! Calls issued concurrently on the same client are serialized; open several
//! clients for parallel calls. A call may be cancelled (for example with
//! `tokio::time::timeout`); its late reply is skipped by the next call. Faults returned by the server are rebuilt into
//! the error the remote engine raised, so
//! `client.play_item(..)` fails with the same
//! [`BridgeError`](bridge_traits::BridgeError) variant a local call would.

use crate::error::{CoreError, Result};
use crate::remote::RemotePlaybackControl;
use crate::rpc::{decode_response, encode_request, RpcCall, RpcRequest, RpcValue};
use async_trait::async_trait;
use bridge_traits::{ItemReference, PlaybackItem};
use core_runtime::config::DEFAULT_MAX_FRAME_LENGTH;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, trace};

pub struct PlaybackControlClient {
    connection: Mutex<Framed<TcpStream, LinesCodec>>,
    next_id: AtomicU64,
}

impl PlaybackControlClient {
    /// Connect using the default frame limit.
    pub async fn connect(address: SocketAddr) -> Result<Self> {
        Self::connect_with_max_frame_length(address, DEFAULT_MAX_FRAME_LENGTH).await
    }

    pub async fn connect_with_max_frame_length(
        address: SocketAddr,
        max_frame_length: usize,
    ) -> Result<Self> {
        let stream = TcpStream::connect(address).await.map_err(|e| {
            CoreError::Transport(format!("Failed to connect to {}: {}", address, e))
        })?;

        debug!(%address, "Connected to playback control server");

        Ok(Self {
            connection: Mutex::new(Framed::new(
                stream,
                LinesCodec::new_with_max_length(max_frame_length),
            )),
            next_id: AtomicU64::new(1),
        })
    }

    async fn call(&self, call: RpcCall) -> Result<RpcValue> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let method = call.method();
        let line = encode_request(&RpcRequest { id, call })?;

        let mut connection = self.connection.lock().await;
        connection
            .send(line)
            .await
            .map_err(|e| CoreError::Transport(format!("Failed to send {}: {}", method, e)))?;

        loop {
            let reply = connection
                .next()
                .await
                .ok_or_else(|| CoreError::Transport("Connection closed by server".to_string()))?
                .map_err(|e| CoreError::Transport(format!("Failed to read reply: {}", e)))?;

            let response = decode_response(&reply)?;

            // Replies to calls whose futures were dropped before reading.
            if response.id < id {
                debug!(stale = response.id, id, "Discarding reply to abandoned call");
                continue;
            }

            if response.id != id {
                return Err(CoreError::Protocol(format!(
                    "Response id {} does not match request id {}",
                    response.id, id
                )));
            }

            trace!(id, method, "Received reply");
            return response.into_result();
        }
    }
}

fn unexpected(method: &str, value: RpcValue) -> CoreError {
    CoreError::Protocol(format!("Unexpected result for {}: {:?}", method, value))
}

#[async_trait]
impl RemotePlaybackControl for PlaybackControlClient {
    async fn item(&self) -> Result<Option<PlaybackItem>> {
        match self.call(RpcCall::GetItem).await? {
            RpcValue::Item(item) => Ok(item),
            other => Err(unexpected("get_item", other)),
        }
    }

    async fn playback_position(&self) -> Result<u64> {
        match self.call(RpcCall::GetPlaybackPosition).await? {
            RpcValue::PositionMs(position) => Ok(position),
            other => Err(unexpected("get_playback_position", other)),
        }
    }

    async fn status(&self) -> Result<String> {
        match self.call(RpcCall::GetStatus).await? {
            RpcValue::Status(status) => Ok(status),
            other => Err(unexpected("get_status", other)),
        }
    }

    async fn play_item(&self, item: ItemReference) -> Result<()> {
        expect_unit("play_item", self.call(RpcCall::PlayItem { item }).await?)
    }

    async fn play(&self) -> Result<()> {
        expect_unit("play", self.call(RpcCall::Play).await?)
    }

    async fn pause(&self) -> Result<()> {
        expect_unit("pause", self.call(RpcCall::Pause).await?)
    }

    async fn stop(&self) -> Result<()> {
        expect_unit("stop", self.call(RpcCall::Stop).await?)
    }
}

fn expect_unit(method: &str, value: RpcValue) -> Result<()> {
    match value {
        RpcValue::Unit => Ok(()),
        other => Err(unexpected(method, other)),
    }
}
