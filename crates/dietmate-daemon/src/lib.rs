//! Diet Mate coordinator daemon providing the socket server and the
//! host-backed [`dietmate_core::Host`] implementation.
//!
//! Each host connection gets its own coordinator. Events arrive as
//! `dispatch_event` requests; while one is being handled the daemon calls
//! back into the host for every primitive it needs.

pub mod error;
pub mod host;
pub mod server;
pub(crate) mod session;

pub use error::{DaemonError, Result};
pub use host::RpcHost;
pub use server::{run, serve};
pub use session::{HostInfo, Session, SessionId};
