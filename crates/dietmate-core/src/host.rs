//! Primitives the host runtime provides to the coordinator.
//!
//! The coordinator never keeps a copy of host state: the set of open clients
//! and the list of displayed notifications are re-read through this trait on
//! every operation.

use std::future::Future;

use dietmate_types::{ClientHandle, ClientQuery, DisplayNotification, OutboundMessage};

use crate::Result;

/// Host runtime seen from the coordinator.
///
/// Every async primitive returns a `Send` future so work can be detached onto
/// the runtime (scheduled notifications, fire-and-forget shows).
pub trait Host: Send + Sync + 'static {
    /// Activate the newest coordinator without waiting for older instances.
    fn skip_waiting(&self) -> impl Future<Output = Result<()>> + Send;

    /// Take control of every open client immediately.
    fn claim_clients(&self) -> impl Future<Output = Result<()>> + Send;

    /// Display a notification, replacing any shown one with the same tag.
    fn show_notification(
        &self,
        notification: DisplayNotification,
    ) -> impl Future<Output = Result<()>> + Send;

    fn close_notification(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Enumerate open clients in the host's order.
    fn match_clients(
        &self,
        query: ClientQuery,
    ) -> impl Future<Output = Result<Vec<ClientHandle>>> + Send;

    fn focus_client(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Whether [`Host::open_window`] is available at all.
    fn can_open_window(&self) -> bool;

    fn open_window(&self, url: &str) -> impl Future<Output = Result<()>> + Send;

    fn post_message(
        &self,
        client_id: &str,
        message: OutboundMessage,
    ) -> impl Future<Output = Result<()>> + Send;
}
