//! Test module for dietmate-core
//!
//! This module contains tests for:
//! - Push payload decoding and the text fallback
//! - Rendering defaults
//! - Click routing (focus, open, swallow)
//! - Sync / periodic sync check-ins
//! - Scheduled notifications and teardown
//! - Client message routing through the coordinator
//! - Configuration loading and defaults

mod click_tests;
mod config_tests;
