//! JSON-RPC 2.0 protocol types.
//!
//! The host runtime connects to the coordinator daemon, registers, and then
//! sends every lifecycle, push, click, sync and message event as a
//! `dispatch_event` request. While an event is being handled the daemon sends
//! requests the other way (`show_notification`, `match_clients`, ...) that the
//! host must answer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use dietmate_types::{OutboundMessage, WorkerEvent};

pub const JSONRPC_VERSION: &str = "2.0";
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;
pub const NOT_REGISTERED: i32 = -32000;
pub const ALREADY_REGISTERED: i32 = -32001;
/// A host primitive failed while an event was being handled
pub const HOST_FAILURE: i32 = -32010;

/// Method names used on the wire
pub mod methods {
    // host -> daemon
    pub const REGISTER: &str = "register";
    pub const DISPATCH_EVENT: &str = "dispatch_event";
    pub const STATUS: &str = "status";

    // daemon -> host
    pub const SKIP_WAITING: &str = "skip_waiting";
    pub const CLAIM_CLIENTS: &str = "claim_clients";
    pub const SHOW_NOTIFICATION: &str = "show_notification";
    pub const CLOSE_NOTIFICATION: &str = "close_notification";
    pub const MATCH_CLIENTS: &str = "match_clients";
    pub const FOCUS_CLIENT: &str = "focus_client";
    pub const OPEN_WINDOW: &str = "open_window";
    pub const POST_MESSAGE: &str = "post_message";
}

/// JSON-RPC 2.0 Request ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(u64),
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<u64> for RequestId {
    fn from(n: u64) -> Self {
        RequestId::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl Request {
    #[must_use]
    pub fn new(method: impl Into<String>, params: Option<Value>, id: RequestId) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: Some(id),
        }
    }
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: RequestId,
}

impl Response {
    #[must_use]
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    #[must_use]
    pub fn error(id: RequestId, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// JSON-RPC 2.0 Notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Notification {
    #[must_use]
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 Error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    #[must_use]
    pub fn method_not_found() -> Self {
        Self::new(METHOD_NOT_FOUND, "Method not found")
    }

    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }

    #[must_use]
    pub fn not_registered() -> Self {
        Self::new(NOT_REGISTERED, "Not registered")
    }

    #[must_use]
    pub fn already_registered() -> Self {
        Self::new(ALREADY_REGISTERED, "Already registered")
    }

    #[must_use]
    pub fn host_failure(message: impl Into<String>) -> Self {
        Self::new(HOST_FAILURE, message)
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

/// Incoming message that could be a request, response, or notification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Request(Request),
    Response(Response),
    Notification(Notification),
}

impl Message {
    #[must_use]
    pub fn is_request(&self) -> bool {
        matches!(self, Message::Request(r) if r.id.is_some())
    }

    #[must_use]
    pub fn is_response(&self) -> bool {
        matches!(self, Message::Response(_))
    }
}

/// What the host runtime can do beyond the mandatory primitives
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HostCapabilities {
    #[serde(default)]
    pub open_window: bool,
}

/// Registration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterParams {
    pub name: String,
    #[serde(default)]
    pub capabilities: HostCapabilities,
}

/// Registration result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResult {
    pub session_id: String,
}

/// `dispatch_event` params
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchParams {
    pub event: WorkerEvent,
}

/// `dispatch_event` result, sent once the handler has finished
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    pub handled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

/// `status` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResult {
    pub session_id: String,
    pub armed_timers: usize,
}

/// Params carrying a single id (`close_notification`, `focus_client`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdParams {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWindowParams {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMessageParams {
    pub client_id: String,
    pub message: OutboundMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let req = Request::new(methods::STATUS, None, 7.into());
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"method\":\"status\""));
        assert!(json.contains("\"id\":7"));
        assert!(
            !json.contains("\"params\""),
            "params should be omitted when None"
        );
    }

    #[test]
    fn test_response_is_not_parsed_as_request() {
        let raw = r#"{"jsonrpc":"2.0","result":[],"id":3}"#;
        let msg: Message = serde_json::from_str(raw).unwrap();
        assert!(msg.is_response());
        assert!(!msg.is_request());
    }

    #[test]
    fn test_response_error_carries_code() {
        let resp = Response::error(1.into(), RpcError::host_failure("display failed"));
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("\"result\""));
        assert!(json.contains("-32010"));
        assert!(json.contains("display failed"));
    }

    #[test]
    fn test_request_id_serialization() {
        assert_eq!(serde_json::to_string(&RequestId::Number(12)).unwrap(), "12");
        assert_eq!(
            serde_json::to_string(&RequestId::from("abc")).unwrap(),
            "\"abc\""
        );
    }

    #[test]
    fn test_register_params_default_capabilities() {
        let params: RegisterParams = serde_json::from_value(json!({"name": "browser"})).unwrap();
        assert_eq!(params.name, "browser");
        assert!(!params.capabilities.open_window);
    }

    #[test]
    fn test_dispatch_params_wire_format() {
        let params = DispatchParams {
            event: WorkerEvent::Sync {
                tag: "fasting-check".to_string(),
            },
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            json!({"event": {"type": "sync", "tag": "fasting-check"}})
        );
    }

    #[test]
    fn test_post_message_params_wire_format() {
        let params = PostMessageParams {
            client_id: "c1".to_string(),
            message: OutboundMessage::CheckFasting,
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            json!({"client_id": "c1", "message": {"type": "CHECK_FASTING"}})
        );
    }

    #[test]
    fn test_rpc_error_display() {
        let err = RpcError::not_registered();
        assert_eq!(err.to_string(), "RPC error -32000: Not registered");
    }
}
