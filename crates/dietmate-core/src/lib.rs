//! Event-to-notification dispatch core of the Diet Mate coordinator.
//!
//! The coordinator runs without any visible page. It turns push messages into
//! notifications, routes notification clicks to a window, relays background
//! sync wake-ups to open pages and shows or schedules notifications on their
//! request. Everything it needs from the outside world goes through [`Host`].

pub mod click;
pub mod config;
pub mod decoder;
pub mod host;
pub mod lifecycle;
pub mod renderer;
pub mod router;
pub mod scheduler;
pub mod wakeup;

mod coordinator;
mod error;

#[cfg(test)]
mod tests;

pub use coordinator::{Coordinator, EventOutcome};
pub use error::{Error, Result};
pub use host::Host;

pub use dietmate_types::*;
