//! Socket server implementation for the Diet Mate daemon.
//!
//! Every accepted connection is one host runtime with its own coordinator.
//! The read loop never blocks on event handling: each `dispatch_event` runs
//! in its own task so the host's answers to primitive requests keep flowing
//! while a handler is suspended.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dietmate_core::Coordinator;
use dietmate_core::config::Config;
use dietmate_rpc::client::socket_path;
use dietmate_rpc::protocol::{
    DispatchParams, DispatchResult, Message, RegisterParams, RegisterResult, Request, RequestId,
    Response, RpcError, StatusResult, methods,
};
use dietmate_rpc::transport::JsonRpcCodec;
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, trace, warn};

use crate::error::{DaemonError, Result};
use crate::host::RpcHost;
use crate::session::{Session, SessionId};

/// Bind the socket and serve hosts until interrupted.
///
/// # Errors
///
/// Returns an error if another daemon owns the socket or binding fails.
pub async fn run(custom_socket_path: Option<PathBuf>, config: Config) -> Result<()> {
    let path = custom_socket_path.unwrap_or_else(socket_path);

    cleanup_stale_socket(&path).await?;

    let listener = UnixListener::bind(&path)?;
    info!("Daemon listening on {:?}", path);

    tokio::select! {
        () = serve(listener, config) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown requested, stopping server");
        }
    }

    if path.exists()
        && let Err(e) = std::fs::remove_file(&path)
    {
        warn!("Failed to remove socket file {:?}: {}", path, e);
    }

    Ok(())
}

/// Accept connections on an already bound listener.
pub async fn serve(listener: UnixListener, config: Config) {
    let config = Arc::new(config);

    info!("Ready to accept connections");
    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                debug!("Accepted connection");
                let config = config.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, config).await {
                        error!("Connection error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Accept error: {}", e);
            }
        }
    }
}

async fn cleanup_stale_socket(path: &Path) -> Result<()> {
    if path.exists() {
        if UnixStream::connect(path).await.is_ok() {
            return Err(DaemonError::Io(std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                "Another daemon is already running",
            )));
        }
        info!("Removing stale socket at {}", path.display());
        std::fs::remove_file(path)?;
    }
    Ok(())
}

/// Coordinator bound to a registered host
struct Binding {
    host: Arc<RpcHost>,
    coordinator: Arc<Coordinator<RpcHost>>,
}

/// Per-connection state owned by the read loop
struct Connection {
    session: Session,
    binding: Option<Binding>,
    tx: mpsc::UnboundedSender<Message>,
    config: Arc<Config>,
}

async fn handle_connection(stream: UnixStream, config: Arc<Config>) -> Result<()> {
    let framed = Framed::new(stream, JsonRpcCodec::new());
    let (mut sink, mut stream) = framed.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let mut conn = Connection {
        session: Session::new(),
        binding: None,
        tx,
        config,
    };
    let session_id = conn.session.id().clone();
    debug!("New connection: {}", session_id);

    let session_id_clone = session_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sink.send(msg).await {
                warn!("Failed to send to {}: {}", session_id_clone, e);
                break;
            }
        }
        trace!("[{}] send_task ended", session_id_clone);
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(msg) => {
                if let Some(resp) = process_message(&mut conn, msg)
                    && conn.tx.send(resp).is_err()
                {
                    break;
                }
            }
            Err(e) => {
                warn!("Read error from {}: {}", session_id, e);
                break;
            }
        }
    }

    debug!("Connection closed: {}", session_id);
    if let Some(binding) = conn.binding.take() {
        binding.host.close();
        let pending = binding.coordinator.armed_timers();
        if pending > 0 {
            info!(
                "Host {} went away with {} scheduled notification(s) pending",
                session_id, pending
            );
        }
    }

    send_task.abort();

    Ok(())
}

fn process_message(conn: &mut Connection, msg: Message) -> Option<Message> {
    match msg {
        Message::Request(request) => {
            let Some(id) = request.id.clone() else {
                debug!("Ignoring notification: method={}", request.method);
                return None;
            };
            trace!(
                "Processing request: method={}, id={}",
                request.method, id
            );

            match handle_request(conn, request) {
                Ok(Some(result)) => Some(Message::Response(Response::success(id, result))),
                Ok(None) => None,
                Err(err) => Some(Message::Response(Response::error(id, err.into()))),
            }
        }

        Message::Response(resp) => {
            match &conn.binding {
                Some(binding) => {
                    binding.host.resolve(resp);
                }
                None => warn!("Response from unregistered host ignored: id={}", resp.id),
            }
            None
        }

        Message::Notification(notification) => {
            debug!("Ignoring notification: method={}", notification.method);
            None
        }
    }
}

/// Handle one host request. `Ok(None)` means the answer is sent later by a
/// spawned task.
fn handle_request(conn: &mut Connection, request: Request) -> Result<Option<Value>> {
    match request.method.as_str() {
        methods::REGISTER => register(conn, request.params).map(Some),
        methods::DISPATCH_EVENT => {
            let binding = conn.binding.as_ref().ok_or(DaemonError::NotRegistered)?;
            let params: DispatchParams = parse_params(request.params)?;
            let id = request.id.unwrap_or(RequestId::Number(0));
            spawn_dispatch(binding, conn.session.id().clone(), id, params, conn.tx.clone());
            Ok(None)
        }
        methods::STATUS => {
            let binding = conn.binding.as_ref().ok_or(DaemonError::NotRegistered)?;
            let status = StatusResult {
                session_id: conn.session.id().to_string(),
                armed_timers: binding.coordinator.armed_timers(),
            };
            Ok(Some(serde_json::to_value(status)?))
        }
        other => Err(DaemonError::MethodNotFound(other.to_string())),
    }
}

fn register(conn: &mut Connection, params: Option<Value>) -> Result<Value> {
    if conn.session.is_registered() {
        return Err(DaemonError::AlreadyRegistered);
    }
    let params: RegisterParams = parse_params(params)?;

    let info = conn.session.register(params.name, params.capabilities)?;
    info!(
        "Host registered: {} ({}), open_window={}",
        info.name, info.id, info.capabilities.open_window
    );

    let host = Arc::new(RpcHost::new(
        conn.tx.clone(),
        info.capabilities,
        conn.config.daemon.host_request_timeout(),
    ));
    let coordinator = Arc::new(Coordinator::new(host.clone(), conn.config.app.clone()));
    conn.binding = Some(Binding { host, coordinator });

    let result = RegisterResult {
        session_id: conn.session.id().to_string(),
    };
    Ok(serde_json::to_value(result)?)
}

fn spawn_dispatch(
    binding: &Binding,
    session_id: SessionId,
    id: RequestId,
    params: DispatchParams,
    tx: mpsc::UnboundedSender<Message>,
) {
    let coordinator = binding.coordinator.clone();
    let kind = params.event.kind();

    tokio::spawn(async move {
        debug!("[{}] Dispatching {} (id={})", session_id, kind, id);

        let response = match coordinator.handle(params.event).await {
            Ok(outcome) => {
                debug!("[{}] {} handled: {}", session_id, kind, outcome);
                let result = DispatchResult {
                    handled: true,
                    outcome: Some(outcome.to_string()),
                };
                match serde_json::to_value(result) {
                    Ok(value) => Response::success(id, value),
                    Err(e) => Response::error(id, RpcError::internal_error(e.to_string())),
                }
            }
            Err(e) => {
                warn!("[{}] {} failed: {}", session_id, kind, e);
                Response::error(id, DaemonError::Core(e).into())
            }
        };

        if tx.send(Message::Response(response)).is_err() {
            debug!("[{}] Host gone before {} completed", session_id, kind);
        }
    });
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T> {
    let params = params.ok_or_else(|| DaemonError::InvalidParams("missing params".to_string()))?;
    serde_json::from_value(params).map_err(|e| DaemonError::InvalidParams(e.to_string()))
}
