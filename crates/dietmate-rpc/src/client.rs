//! Host-side RPC connection to the coordinator daemon.
//!
//! The host registers once, dispatches events as requests and answers the
//! primitive requests (`show_notification`, `match_clients`, ...) that the
//! daemon issues while handling them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dietmate_types::WorkerEvent;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::UnixStream;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_util::codec::Framed;

use crate::protocol::{
    DispatchParams, DispatchResult, HostCapabilities, Message, RegisterParams, RegisterResult,
    Request, RequestId, Response, RpcError, methods,
};
use crate::transport::{CodecError, JsonRpcCodec};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn runtime_dir() -> PathBuf {
    std::env::var("XDG_RUNTIME_DIR").map_or_else(|_| std::env::temp_dir(), PathBuf::from)
}

/// Default socket path of the coordinator daemon.
///
/// Prefers `$XDG_RUNTIME_DIR`, falling back to the system temp directory.
#[must_use]
pub fn socket_path() -> PathBuf {
    runtime_dir().join("dietmate.sock")
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC error: {code} - {message}")]
    Rpc { code: i32, message: String },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Request timeout")]
    Timeout,

    #[error("Unexpected response type")]
    UnexpectedResponse,
}

impl From<RpcError> for ClientError {
    fn from(e: RpcError) -> Self {
        ClientError::Rpc {
            code: e.code,
            message: e.message,
        }
    }
}

type PendingRequest = oneshot::Sender<Result<Response, ClientError>>;
type FramedSink = futures_util::stream::SplitSink<Framed<UnixStream, JsonRpcCodec>, Message>;

/// Host connection to the daemon
pub struct RpcClient {
    sender: Arc<Mutex<FramedSink>>,
    incoming_rx: mpsc::Receiver<Request>,
    pending: Arc<Mutex<HashMap<RequestId, PendingRequest>>>,
    next_id: AtomicU64,
    session_id: Option<String>,
}

impl RpcClient {
    /// Connect to the daemon at the default socket path.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Io` if the socket connection fails.
    pub async fn connect() -> Result<Self, ClientError> {
        Self::connect_to(socket_path()).await
    }

    /// Connect to the daemon at a custom socket path.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Io` if the socket connection fails.
    pub async fn connect_to(path: PathBuf) -> Result<Self, ClientError> {
        let stream = UnixStream::connect(&path).await?;
        let (sink, mut stream) = Framed::new(stream, JsonRpcCodec::new()).split();

        let pending: Arc<Mutex<HashMap<RequestId, PendingRequest>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let pending_clone = pending.clone();

        let (incoming_tx, incoming_rx) = mpsc::channel(64);

        tokio::spawn(async move {
            while let Some(result) = stream.next().await {
                match result {
                    Ok(Message::Response(resp)) => {
                        if let Some(tx) = pending_clone.lock().await.remove(&resp.id) {
                            let _ = tx.send(Ok(resp));
                        }
                    }
                    Ok(Message::Request(req)) => {
                        if incoming_tx.send(req).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Notification(n)) => {
                        tracing::debug!("Ignoring notification from daemon: {}", n.method);
                    }
                    Err(e) => {
                        for (_, tx) in pending_clone.lock().await.drain() {
                            let _ = tx.send(Err(ClientError::Codec(CodecError::Io(
                                std::io::Error::other(e.to_string()),
                            ))));
                        }
                        break;
                    }
                }
            }
        });

        Ok(Self {
            sender: Arc::new(Mutex::new(sink)),
            incoming_rx,
            pending,
            next_id: AtomicU64::new(1),
            session_id: None,
        })
    }

    /// Register this host with the daemon.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the daemon rejects registration.
    pub async fn register(
        &mut self,
        name: &str,
        capabilities: HostCapabilities,
    ) -> Result<String, ClientError> {
        let params = RegisterParams {
            name: name.to_string(),
            capabilities,
        };
        let result: RegisterResult = self
            .request(methods::REGISTER, Some(serde_json::to_value(params)?))
            .await?;

        self.session_id = Some(result.session_id.clone());
        Ok(result.session_id)
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Start dispatching an event. The returned receiver resolves once the
    /// daemon has finished handling it, so the caller can keep answering
    /// host requests in the meantime.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn begin_dispatch(
        &self,
        event: &WorkerEvent,
    ) -> Result<oneshot::Receiver<Result<Response, ClientError>>, ClientError> {
        let params = serde_json::to_value(DispatchParams {
            event: event.clone(),
        })?;
        self.send_request(methods::DISPATCH_EVENT, Some(params))
            .await
    }

    /// Send a request and wait for its result.
    ///
    /// Do not use this for `dispatch_event` while the daemon may need answers
    /// from this host; use [`RpcClient::begin_dispatch`] instead.
    ///
    /// # Errors
    ///
    /// Returns an error if sending fails, the connection closes, or deserialization fails.
    pub async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<T, ClientError> {
        let rx = self.send_request(method, params).await?;
        let response = tokio::time::timeout(REQUEST_TIMEOUT, rx)
            .await
            .map_err(|_| ClientError::Timeout)?
            .map_err(|_| ClientError::ConnectionClosed)??;
        parse_result(response)
    }

    async fn send_request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<oneshot::Receiver<Result<Response, ClientError>>, ClientError> {
        let id = RequestId::Number(self.next_id.fetch_add(1, Ordering::SeqCst));
        let request = Request::new(method, params, id.clone());

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        self.sender
            .lock()
            .await
            .send(Message::Request(request))
            .await?;
        Ok(rx)
    }

    /// Answer a request issued by the daemon.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Codec` if sending fails.
    pub async fn respond(&self, response: Response) -> Result<(), ClientError> {
        self.sender
            .lock()
            .await
            .send(Message::Response(response))
            .await?;
        Ok(())
    }

    /// Next request issued by the daemon.
    pub async fn recv(&mut self) -> Option<Request> {
        self.incoming_rx.recv().await
    }
}

/// Turn a response into its typed result.
///
/// # Errors
///
/// Returns the RPC error carried by the response, or a JSON error if the
/// result does not match `T`.
pub fn parse_result<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if let Some(error) = response.error {
        return Err(error.into());
    }
    let result = response.result.ok_or(ClientError::UnexpectedResponse)?;
    Ok(serde_json::from_value(result)?)
}

/// Typed view of a finished `dispatch_event`.
///
/// # Errors
///
/// See [`parse_result`].
pub fn parse_dispatch(response: Response) -> Result<DispatchResult, ClientError> {
    parse_result(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::NOT_REGISTERED;
    use serde_json::json;

    #[test]
    fn test_socket_path() {
        assert!(socket_path().ends_with("dietmate.sock"));
    }

    #[test]
    fn test_client_error_from_rpc_error() {
        let client_err: ClientError = RpcError::not_registered().into();
        match client_err {
            ClientError::Rpc { code, message } => {
                assert_eq!(code, NOT_REGISTERED);
                assert!(message.contains("Not registered"));
            }
            _ => panic!("Expected Rpc error"),
        }
    }

    #[test]
    fn test_client_error_display() {
        assert_eq!(ClientError::ConnectionClosed.to_string(), "Connection closed");
        assert_eq!(ClientError::Timeout.to_string(), "Request timeout");
    }

    #[test]
    fn test_parse_result_success() {
        let resp = Response::success(1.into(), json!({"handled": true, "outcome": "focused"}));
        let result = parse_dispatch(resp).unwrap();
        assert!(result.handled);
        assert_eq!(result.outcome.as_deref(), Some("focused"));
    }

    #[test]
    fn test_parse_result_error() {
        let resp = Response::error(1.into(), RpcError::host_failure("boom"));
        let err = parse_dispatch(resp).unwrap_err();
        assert!(matches!(err, ClientError::Rpc { code: crate::protocol::HOST_FAILURE, .. }));
    }

    #[test]
    fn test_parse_result_missing_result() {
        let resp = Response {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: None,
            id: 1.into(),
        };
        assert!(matches!(
            parse_result::<Value>(resp).unwrap_err(),
            ClientError::UnexpectedResponse
        ));
    }
}
