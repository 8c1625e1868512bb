//! Notification click routing.

use std::fmt;

use dietmate_types::{ClickedNotification, ClientQuery};
use tracing::{debug, info, warn};

use crate::Result;
use crate::config::AppConfig;
use crate::host::Host;

/// What a click ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// An existing main-page window was brought to the foreground
    Focused(String),
    /// A new window was opened at this URL
    Opened(String),
    /// No matching window and the host cannot open one
    Ignored,
}

impl fmt::Display for ClickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClickOutcome::Focused(id) => write!(f, "focused {id}"),
            ClickOutcome::Opened(url) => write!(f, "opened {url}"),
            ClickOutcome::Ignored => write!(f, "ignored"),
        }
    }
}

/// Close the clicked notification, then focus the first open main-page
/// window or open a new one at the app root.
///
/// The scan follows the host's enumeration order and stops at the first
/// match. The selected action id is only logged. A failed close is logged
/// and routing continues.
///
/// # Errors
///
/// Returns the host's error if enumerating, focusing or opening fails.
pub async fn route_click<H: Host>(
    host: &H,
    app: &AppConfig,
    notification: &ClickedNotification,
    action: Option<&str>,
) -> Result<ClickOutcome> {
    info!(
        "Notification clicked: id={}, tag={:?}, action={:?}",
        notification.id,
        notification.tag(),
        action
    );

    if let Err(e) = host.close_notification(&notification.id).await {
        warn!("Failed to close notification {}: {}", notification.id, e);
    }

    let clients = host.match_clients(ClientQuery::all_windows()).await?;
    debug!("{} open window(s)", clients.len());

    if let Some(client) = clients
        .iter()
        .find(|c| c.focusable && c.url.contains(&app.main_page_marker))
    {
        host.focus_client(&client.id).await?;
        return Ok(ClickOutcome::Focused(client.id.clone()));
    }

    if host.can_open_window() {
        host.open_window(&app.root_url).await?;
        return Ok(ClickOutcome::Opened(app.root_url.clone()));
    }

    debug!("No window to focus and host cannot open one, dropping click");
    Ok(ClickOutcome::Ignored)
}
