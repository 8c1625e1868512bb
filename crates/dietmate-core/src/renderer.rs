//! Notification rendering.

use dietmate_types::NotificationDescriptor;
use tracing::{debug, info};

use crate::Result;
use crate::host::Host;

/// Normalize `descriptor` and display it, resolving once the host has
/// acknowledged the display call.
///
/// Returns the tag the notification was shown under.
///
/// # Errors
///
/// Returns the host's error if the display primitive fails. There is no retry.
pub async fn render<H: Host>(
    host: &H,
    descriptor: NotificationDescriptor,
    default_tag: &str,
) -> Result<String> {
    let notification = descriptor.normalize(default_tag);
    let tag = notification.options.tag.clone();

    debug!(
        "Displaying '{}' (tag={}, actions={})",
        notification.title,
        tag,
        notification.options.actions.len()
    );
    host.show_notification(notification).await?;
    info!("Notification shown: tag={}", tag);

    Ok(tag)
}
