//! Install and activate transitions.

use tracing::info;

use crate::Result;
use crate::host::Host;

/// Become active without waiting for older instances to finish.
///
/// # Errors
///
/// Returns the host's error if `skip_waiting` fails.
pub async fn on_install<H: Host>(host: &H) -> Result<()> {
    info!("Coordinator installed");
    host.skip_waiting().await
}

/// Take control of every open client now rather than on their next reload.
/// Activation is complete only once the claim has settled.
///
/// # Errors
///
/// Returns the host's error if `claim_clients` fails.
pub async fn on_activate<H: Host>(host: &H) -> Result<()> {
    info!("Coordinator activated");
    host.claim_clients().await
}
