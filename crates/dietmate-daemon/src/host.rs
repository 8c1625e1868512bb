//! [`Host`] implementation that forwards every primitive to the connected
//! host runtime as a JSON-RPC request.
//!
//! Requests go out through the connection's send queue. Their responses are
//! read by the connection loop and handed back with [`RpcHost::resolve`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use dietmate_core::{Error, Host, Result};
use dietmate_rpc::protocol::{
    HostCapabilities, IdParams, Message, OpenWindowParams, PostMessageParams, Request, RequestId,
    Response, methods,
};
use dietmate_types::{ClientHandle, ClientQuery, DisplayNotification, OutboundMessage};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{trace, warn};

type PendingRequest = oneshot::Sender<Response>;

pub struct RpcHost {
    sender: mpsc::UnboundedSender<Message>,
    pending: Mutex<HashMap<RequestId, PendingRequest>>,
    next_id: AtomicU64,
    capabilities: HostCapabilities,
    timeout: Duration,
    closed: AtomicBool,
}

impl RpcHost {
    #[must_use]
    pub fn new(
        sender: mpsc::UnboundedSender<Message>,
        capabilities: HostCapabilities,
        timeout: Duration,
    ) -> Self {
        Self {
            sender,
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            capabilities,
            timeout,
            closed: AtomicBool::new(false),
        }
    }

    /// Route a response from the host to the request waiting on it.
    ///
    /// Returns `false` when no request with that id is outstanding (late
    /// answer after a timeout, or a bogus id).
    pub fn resolve(&self, response: Response) -> bool {
        let waiter = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&response.id);

        match waiter {
            Some(tx) => tx.send(response).is_ok(),
            None => {
                warn!("Response for unknown request {}", response.id);
                false
            }
        }
    }

    /// Fail every outstanding request and refuse new ones.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Requests still waiting for the host.
    #[cfg(test)]
    fn outstanding(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn call(&self, method: &str, params: Option<Value>) -> Result<Option<Value>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::host(format!("{method}: host connection closed")));
        }

        let id = RequestId::Number(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), tx);

        trace!("-> host {} (id={})", method, id);
        let request = Request::new(method, params, id.clone());
        if self.sender.send(Message::Request(request)).is_err() {
            self.forget(&id);
            return Err(Error::host(format!("{method}: host connection closed")));
        }

        let response = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(Error::host(format!("{method}: host connection closed"))),
            Err(_) => {
                self.forget(&id);
                return Err(Error::host(format!(
                    "{method}: no answer from host within {}ms",
                    self.timeout.as_millis()
                )));
            }
        };

        if let Some(error) = response.error {
            return Err(Error::host(format!("{method}: {}", error.message)));
        }
        Ok(response.result)
    }

    async fn call_with<P: Serialize>(&self, method: &str, params: &P) -> Result<Option<Value>> {
        let params = serde_json::to_value(params)?;
        self.call(method, Some(params)).await
    }

    fn forget(&self, id: &RequestId) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }
}

impl Host for RpcHost {
    async fn skip_waiting(&self) -> Result<()> {
        self.call(methods::SKIP_WAITING, None).await?;
        Ok(())
    }

    async fn claim_clients(&self) -> Result<()> {
        self.call(methods::CLAIM_CLIENTS, None).await?;
        Ok(())
    }

    async fn show_notification(&self, notification: DisplayNotification) -> Result<()> {
        self.call_with(methods::SHOW_NOTIFICATION, &notification)
            .await?;
        Ok(())
    }

    async fn close_notification(&self, id: &str) -> Result<()> {
        let params = IdParams { id: id.to_string() };
        self.call_with(methods::CLOSE_NOTIFICATION, &params).await?;
        Ok(())
    }

    async fn match_clients(&self, query: ClientQuery) -> Result<Vec<ClientHandle>> {
        let result = self.call_with(methods::MATCH_CLIENTS, &query).await?;
        Ok(serde_json::from_value(result.unwrap_or(Value::Array(Vec::new())))?)
    }

    async fn focus_client(&self, id: &str) -> Result<()> {
        let params = IdParams { id: id.to_string() };
        self.call_with(methods::FOCUS_CLIENT, &params).await?;
        Ok(())
    }

    fn can_open_window(&self) -> bool {
        self.capabilities.open_window
    }

    async fn open_window(&self, url: &str) -> Result<()> {
        let params = OpenWindowParams {
            url: url.to_string(),
        };
        self.call_with(methods::OPEN_WINDOW, &params).await?;
        Ok(())
    }

    async fn post_message(&self, client_id: &str, message: OutboundMessage) -> Result<()> {
        let params = PostMessageParams {
            client_id: client_id.to_string(),
            message,
        };
        self.call_with(methods::POST_MESSAGE, &params).await?;
        Ok(())
    }
}
