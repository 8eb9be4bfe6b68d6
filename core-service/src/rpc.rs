//! # RPC Wire Protocol
//!
//! One JSON object per line. Requests name a method and carry an id that the
//! response echoes:
//!
//! ```text
//! -> {"id":7,"call":{"method":"play_item","params":{"item":"file:///tune.pt3"}}}
//! <- {"id":7,"outcome":{"ok":{"type":"unit"}}}
//! -> {"id":8,"call":{"method":"get_status"}}
//! <- {"id":8,"outcome":{"ok":{"type":"status","value":"PLAYING"}}}
//! -> {"id":9,"call":{"method":"get_playback_position"}}
//! <- {"id":9,"outcome":{"fault":{"kind":"no_item_loaded","message":"No item loaded"}}}
//! ```
//!
//! Faults carry a [`FaultKind`] that maps one to one onto the engine's error
//! variants, so a client can rebuild the exact error the engine raised.
//!
//! [`dispatch`] and [`handle_line`] know nothing about sockets; the server in
//! [`crate::server`] is only one possible transport.

use crate::error::{CoreError, Result};
use crate::remote::RemotePlaybackControl;
use bridge_traits::{BridgeError, ItemReference, PlaybackItem};
use serde::{Deserialize, Serialize};
use std::io;
use tracing::warn;

/// Remote method together with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum RpcCall {
    GetItem,
    GetPlaybackPosition,
    GetStatus,
    PlayItem { item: ItemReference },
    Play,
    Pause,
    Stop,
}

impl RpcCall {
    /// Method name as it appears on the wire.
    pub fn method(&self) -> &'static str {
        match self {
            RpcCall::GetItem => "get_item",
            RpcCall::GetPlaybackPosition => "get_playback_position",
            RpcCall::GetStatus => "get_status",
            RpcCall::PlayItem { .. } => "play_item",
            RpcCall::Play => "play",
            RpcCall::Pause => "pause",
            RpcCall::Stop => "stop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub id: u64,
    pub call: RpcCall,
}

/// Successful result of a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RpcValue {
    Unit,
    Item(Option<PlaybackItem>),
    PositionMs(u64),
    Status(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    NotAvailable,
    OperationFailed,
    NoItemLoaded,
    ItemNotFound,
    Io,
    Transport,
    Protocol,
    Internal,
}

/// Error reported in place of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Rebuild the error this fault was created from.
    ///
    /// Engine faults come back as [`CoreError::Delegate`] with the same
    /// [`BridgeError`] variant and message. I/O errors keep their variant but
    /// not their original `io::ErrorKind`.
    pub fn into_error(self) -> CoreError {
        let Fault { kind, message } = self;
        match kind {
            FaultKind::NotAvailable => BridgeError::NotAvailable(message).into(),
            FaultKind::OperationFailed => BridgeError::OperationFailed(message).into(),
            FaultKind::NoItemLoaded => BridgeError::NoItemLoaded.into(),
            FaultKind::ItemNotFound => BridgeError::ItemNotFound(message).into(),
            FaultKind::Io => BridgeError::Io(io::Error::other(message)).into(),
            FaultKind::Transport => CoreError::Transport(message),
            FaultKind::Protocol => CoreError::Protocol(message),
            FaultKind::Internal => CoreError::Internal(message),
        }
    }
}

impl From<&BridgeError> for Fault {
    fn from(err: &BridgeError) -> Self {
        match err {
            BridgeError::NotAvailable(msg) => Fault::new(FaultKind::NotAvailable, msg.as_str()),
            BridgeError::OperationFailed(msg) => {
                Fault::new(FaultKind::OperationFailed, msg.as_str())
            }
            BridgeError::NoItemLoaded => Fault::new(FaultKind::NoItemLoaded, err.to_string()),
            BridgeError::ItemNotFound(msg) => Fault::new(FaultKind::ItemNotFound, msg.as_str()),
            BridgeError::Io(io_err) => Fault::new(FaultKind::Io, io_err.to_string()),
        }
    }
}

impl From<&CoreError> for Fault {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::Delegate(bridge_err) => Fault::from(bridge_err),
            CoreError::Transport(msg) => Fault::new(FaultKind::Transport, msg.as_str()),
            CoreError::Protocol(msg) => Fault::new(FaultKind::Protocol, msg.as_str()),
            CoreError::Internal(msg) => Fault::new(FaultKind::Internal, msg.as_str()),
            CoreError::Runtime(_) => {
                Fault::new(FaultKind::Internal, err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcOutcome {
    Ok(RpcValue),
    Fault(Fault),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub id: u64,
    pub outcome: RpcOutcome,
}

impl RpcResponse {
    pub fn ok(id: u64, value: RpcValue) -> Self {
        Self {
            id,
            outcome: RpcOutcome::Ok(value),
        }
    }

    pub fn fault(id: u64, fault: Fault) -> Self {
        Self {
            id,
            outcome: RpcOutcome::Fault(fault),
        }
    }

    /// Turn the outcome into a `Result`, rebuilding errors from faults.
    pub fn into_result(self) -> Result<RpcValue> {
        match self.outcome {
            RpcOutcome::Ok(value) => Ok(value),
            RpcOutcome::Fault(fault) => Err(fault.into_error()),
        }
    }
}

/// Run one call against the service and wrap the result for the wire.
pub async fn dispatch(service: &dyn RemotePlaybackControl, request: RpcRequest) -> RpcResponse {
    let RpcRequest { id, call } = request;
    match execute(service, call).await {
        Ok(value) => RpcResponse::ok(id, value),
        Err(err) => RpcResponse::fault(id, Fault::from(&err)),
    }
}

async fn execute(service: &dyn RemotePlaybackControl, call: RpcCall) -> Result<RpcValue> {
    match call {
        RpcCall::GetItem => service.item().await.map(RpcValue::Item),
        RpcCall::GetPlaybackPosition => service.playback_position().await.map(RpcValue::PositionMs),
        RpcCall::GetStatus => service.status().await.map(RpcValue::Status),
        RpcCall::PlayItem { item } => service.play_item(item).await.map(|_| RpcValue::Unit),
        RpcCall::Play => service.play().await.map(|_| RpcValue::Unit),
        RpcCall::Pause => service.pause().await.map(|_| RpcValue::Unit),
        RpcCall::Stop => service.stop().await.map(|_| RpcValue::Unit),
    }
}

/// Decode a request line, dispatch it, and return the response.
///
/// A line that is not a valid request produces a `protocol` fault. Its id is
/// recovered from the line when present, otherwise `0`.
pub async fn handle_line(service: &dyn RemotePlaybackControl, line: &str) -> RpcResponse {
    match decode_request(line) {
        Ok(request) => dispatch(service, request).await,
        Err(err) => {
            let id = recover_request_id(line).unwrap_or(0);
            warn!(id, error = %err, "Rejected malformed request");
            RpcResponse::fault(id, Fault::from(&err))
        }
    }
}

fn recover_request_id(line: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()?
        .get("id")?
        .as_u64()
}

pub fn decode_request(line: &str) -> Result<RpcRequest> {
    serde_json::from_str(line).map_err(|e| CoreError::Protocol(format!("Invalid request: {}", e)))
}

pub fn encode_request(request: &RpcRequest) -> Result<String> {
    serde_json::to_string(request)
        .map_err(|e| CoreError::Protocol(format!("Failed to encode request: {}", e)))
}

pub fn decode_response(line: &str) -> Result<RpcResponse> {
    serde_json::from_str(line)
        .map_err(|e| CoreError::Protocol(format!("Invalid response: {}", e)))
}

pub fn encode_response(response: &RpcResponse) -> Result<String> {
    serde_json::to_string(response)
        .map_err(|e| CoreError::Protocol(format!("Failed to encode response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_request_wire_shape() {
        let request = RpcRequest {
            id: 7,
            call: RpcCall::PlayItem {
                item: ItemReference::new("file:///tune.pt3"),
            },
        };
        let value: serde_json::Value = serde_json::from_str(&encode_request(&request).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"id": 7, "call": {"method": "play_item", "params": {"item": "file:///tune.pt3"}}})
        );
    }

    #[test]
    fn test_unit_methods_need_no_params() {
        for (method, expected) in [
            ("get_item", RpcCall::GetItem),
            ("get_playback_position", RpcCall::GetPlaybackPosition),
            ("get_status", RpcCall::GetStatus),
            ("play", RpcCall::Play),
            ("pause", RpcCall::Pause),
            ("stop", RpcCall::Stop),
        ] {
            let line = format!(r#"{{"id":1,"call":{{"method":"{}"}}}}"#, method);
            let request = decode_request(&line).unwrap();
            assert_eq!(request.call, expected);
            assert_eq!(request.call.method(), method);
        }
    }

    #[test]
    fn test_response_wire_shape() {
        let response = RpcResponse::ok(3, RpcValue::Status("PAUSED".into()));
        let value: serde_json::Value =
            serde_json::from_str(&encode_response(&response).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"id": 3, "outcome": {"ok": {"type": "status", "value": "PAUSED"}}})
        );

        let response = RpcResponse::ok(4, RpcValue::Item(None));
        let value: serde_json::Value =
            serde_json::from_str(&encode_response(&response).unwrap()).unwrap();
        assert_eq!(value, json!({"id": 4, "outcome": {"ok": {"type": "item", "value": null}}}));

        let response = RpcResponse::fault(5, Fault::from(&BridgeError::NoItemLoaded));
        let value: serde_json::Value =
            serde_json::from_str(&encode_response(&response).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"id": 5, "outcome": {"fault": {"kind": "no_item_loaded", "message": "No item loaded"}}})
        );
    }

    #[test]
    fn test_item_survives_encoding() {
        let item = PlaybackItem::new("file:///a.vtx")
            .with_title("Title")
            .with_duration(Duration::new(61, 250_000_001));
        let response = RpcResponse::ok(1, RpcValue::Item(Some(item.clone())));

        let decoded = decode_response(&encode_response(&response).unwrap()).unwrap();
        let expected = item.with_duration(Duration::from_millis(61_250));
        assert_eq!(decoded.into_result().unwrap(), RpcValue::Item(Some(expected)));
    }

    #[test]
    fn test_faults_rebuild_the_same_bridge_error() {
        let cases = vec![
            BridgeError::NotAvailable("no audio device".into()),
            BridgeError::OperationFailed("decoder crashed".into()),
            BridgeError::NoItemLoaded,
            BridgeError::ItemNotFound("file:///gone.psg".into()),
            BridgeError::Io(io::Error::new(io::ErrorKind::NotFound, "missing file")),
        ];

        for original in cases {
            let rebuilt = Fault::from(&original).into_error();
            let CoreError::Delegate(rebuilt) = rebuilt else {
                panic!("expected delegate error for {:?}", original);
            };
            assert_eq!(
                std::mem::discriminant(&rebuilt),
                std::mem::discriminant(&original)
            );
            assert_eq!(rebuilt.to_string(), original.to_string());
        }
    }

    #[test]
    fn test_non_delegate_faults() {
        assert!(matches!(
            Fault::new(FaultKind::Protocol, "bad frame").into_error(),
            CoreError::Protocol(msg) if msg == "bad frame"
        ));
        assert!(matches!(
            Fault::new(FaultKind::Transport, "reset").into_error(),
            CoreError::Transport(msg) if msg == "reset"
        ));
        let fault = Fault::from(&CoreError::Internal("boom".into()));
        assert_eq!(fault.kind, FaultKind::Internal);
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let err = decode_request(r#"{"id":1,"call":{"method":"rewind"}}"#).unwrap_err();
        assert!(matches!(err, CoreError::Protocol(_)));
    }

    #[test]
    fn test_recover_request_id() {
        assert_eq!(recover_request_id(r#"{"id":42,"call":{"method":"nope"}}"#), Some(42));
        assert_eq!(recover_request_id(r#"{"call":{}}"#), None);
        assert_eq!(recover_request_id("not json"), None);
    }
}
