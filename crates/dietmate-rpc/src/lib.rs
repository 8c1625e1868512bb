//! JSON-RPC 2.0 protocol shared by the Diet Mate coordinator daemon and the
//! host runtime that drives it.
//!
//! - [`protocol`]: message types, error codes, method names and params
//! - [`transport`]: length-prefixed codec for message framing
//! - [`client`]: host-side connection helper
//!
//! # Example
//!
//! ```no_run
//! use dietmate_rpc::{HostCapabilities, RpcClient};
//!
//! # async fn example() -> Result<(), dietmate_rpc::ClientError> {
//! let mut client = RpcClient::connect().await?;
//! let session_id = client
//!     .register("browser", HostCapabilities { open_window: true })
//!     .await?;
//! println!("Registered with session: {session_id}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod protocol;
pub mod transport;

pub use client::{ClientError, RpcClient, parse_dispatch, parse_result, socket_path};

pub use protocol::{
    ALREADY_REGISTERED, DispatchParams, DispatchResult, HOST_FAILURE, HostCapabilities,
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, IdParams, JSONRPC_VERSION, METHOD_NOT_FOUND,
    Message, NOT_REGISTERED, Notification, OpenWindowParams, PARSE_ERROR, PostMessageParams,
    RegisterParams, RegisterResult, Request, RequestId, Response, RpcError, StatusResult, methods,
};

pub use transport::{CodecError, JsonRpcCodec};

pub use dietmate_types::{
    ClickedNotification, ClientHandle, ClientKind, ClientQuery, DisplayNotification,
    NotificationOptions, OutboundMessage, WorkerEvent,
};
