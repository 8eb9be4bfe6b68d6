//! # RPC Server
//!
//! TCP transport for [`RemotePlaybackControl`] using the line protocol from
//! [`crate::rpc`].
//!
//! ## Threading Model
//!
//! Every accepted connection runs on its own Tokio task. Calls arriving on a
//! single connection are answered in order; calls on different connections
//! reach the service concurrently, so the registered service (and the engine
//! behind it) must tolerate concurrent use.
//!
//! ## Usage
//!
//! ```ignore
//! use core_service::server::RpcServer;
//! use tokio_util::sync::CancellationToken;
//!
//! let server = RpcServer::bind(transport, service).await?;
//! let shutdown = CancellationToken::new();
//! tokio::spawn(server.serve(shutdown.clone()));
//! // ...
//! shutdown.cancel();
//! ```

use crate::error::{CoreError, Result};
use crate::remote::RemotePlaybackControl;
use crate::rpc::{encode_response, handle_line};
use core_runtime::config::TransportConfig;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio_util::codec::{Framed, LinesCodec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

/// Delay before retrying a failed `accept` (e.g. EMFILE).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct RpcServer {
    listener: TcpListener,
    service: Arc<dyn RemotePlaybackControl>,
    config: TransportConfig,
}

impl RpcServer {
    /// Bind the listening socket.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Runtime`] if the transport limits are invalid
    /// - [`CoreError::Transport`] if the address cannot be bound
    pub async fn bind(
        config: TransportConfig,
        service: Arc<dyn RemotePlaybackControl>,
    ) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(config.bind_address)
            .await
            .map_err(|e| {
                CoreError::Transport(format!("Failed to bind {}: {}", config.bind_address, e))
            })?;

        info!(
            address = %config.bind_address,
            max_connections = config.max_connections,
            "RPC server bound"
        );

        Ok(Self {
            listener,
            service,
            config,
        })
    }

    /// Address actually bound, useful when the configured port was 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| CoreError::Transport(format!("Failed to read local address: {}", e)))
    }

    /// Accept connections until `shutdown` is cancelled.
    ///
    /// Cancelling also ends the loops of connections already being served.
    /// Calls already forwarded to the service are left to finish.
    #[instrument(skip(self, shutdown), fields(address = ?self.listener.local_addr().ok()))]
    pub async fn serve(self, shutdown: CancellationToken) -> Result<()> {
        let slots = Arc::new(Semaphore::new(self.config.max_connections));

        loop {
            let permit = tokio::select! {
                _ = shutdown.cancelled() => break,
                permit = Arc::clone(&slots).acquire_owned() => permit
                    .map_err(|e| CoreError::Internal(format!("Connection limiter closed: {}", e)))?,
            };

            let (stream, peer) = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        warn!(error = %err, "Failed to accept connection");
                        tokio::select! {
                            biased;
                            _ = shutdown.cancelled() => break,
                            _ = tokio::time::sleep(ACCEPT_BACKOFF) => continue,
                        }
                    }
                },
            };

            debug!(%peer, "Accepted connection");

            let service = Arc::clone(&self.service);
            let max_frame_length = self.config.max_frame_length;
            let connection_shutdown = shutdown.child_token();

            tokio::spawn(
                async move {
                    let _permit = permit;
                    match serve_connection(stream, service, max_frame_length, connection_shutdown)
                        .await
                    {
                        Ok(()) => debug!("Connection closed"),
                        Err(err) => debug!(error = %err, "Connection closed with error"),
                    }
                }
                .instrument(info_span!("rpc_connection", %peer)),
            );
        }

        info!("RPC server stopped");
        Ok(())
    }
}

async fn serve_connection(
    stream: TcpStream,
    service: Arc<dyn RemotePlaybackControl>,
    max_frame_length: usize,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(max_frame_length));

    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Ok(()),
            next = framed.next() => next,
        };

        let line = match next {
            None => return Ok(()),
            Some(Ok(line)) => line,
            Some(Err(err)) => return Err(CoreError::Transport(err.to_string())),
        };

        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(service.as_ref(), &line).await;
        let encoded = encode_response(&response)?;

        framed
            .send(encoded)
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))?;
    }
}
