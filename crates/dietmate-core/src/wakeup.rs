//! Background sync wake-ups.
//!
//! Both the one-shot and the periodic trigger end in the same check-in: every
//! controlled window is asked to evaluate its own state. Whether anything is
//! shown is decided by the page, which answers through a client message.

use dietmate_types::{ClientQuery, OutboundMessage, PERIODIC_SYNC_TAG, SYNC_TAG};
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::Result;
use crate::host::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// `sync` event
    OneShot,
    /// `periodicsync` event
    Periodic,
}

impl SyncTrigger {
    /// The only tag this trigger acts on.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            SyncTrigger::OneShot => SYNC_TAG,
            SyncTrigger::Periodic => PERIODIC_SYNC_TAG,
        }
    }
}

/// Run a check-in if `tag` belongs to `trigger`.
///
/// Returns the number of clients messaged, or `None` for a foreign tag.
///
/// # Errors
///
/// See [`check_in`].
pub async fn handle_sync<H: Host>(
    host: &H,
    trigger: SyncTrigger,
    tag: &str,
) -> Result<Option<usize>> {
    if tag != trigger.tag() {
        debug!("Ignoring {:?} sync with tag '{}'", trigger, tag);
        return Ok(None);
    }
    check_in(host).await.map(Some)
}

/// Post `CHECK_FASTING` to every controlled window.
///
/// Posts are independent: one failure does not stop the others. No reply is
/// awaited and nothing is displayed from here.
///
/// # Errors
///
/// Returns the enumeration error, or the first post error after every post
/// has been attempted.
pub async fn check_in<H: Host>(host: &H) -> Result<usize> {
    let clients = host.match_clients(ClientQuery::controlled_windows()).await?;
    if clients.is_empty() {
        debug!("Check-in: no open clients");
        return Ok(0);
    }

    let results = join_all(
        clients
            .iter()
            .map(|client| host.post_message(&client.id, OutboundMessage::CheckFasting)),
    )
    .await;

    let mut first_error = None;
    for (client, result) in clients.iter().zip(results) {
        if let Err(e) = result {
            warn!("Check-in post to {} failed: {}", client.id, e);
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            debug!("Check-in sent to {} client(s)", clients.len());
            Ok(clients.len())
        }
    }
}
