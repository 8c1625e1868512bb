//! Composition root: one handler per host event kind.

use std::fmt;
use std::sync::Arc;

use dietmate_types::{MESSAGE_TAG, PUSH_TAG, WorkerEvent};
use serde_json::Value;
use tracing::{error, info};

use crate::Result;
use crate::click::{self, ClickOutcome};
use crate::config::AppConfig;
use crate::decoder;
use crate::host::Host;
use crate::lifecycle;
use crate::renderer;
use crate::router::{self, MessageAction};
use crate::scheduler::Scheduler;
use crate::wakeup::{self, SyncTrigger};

/// Result of handling one event, reported back to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Installed,
    Activated,
    Displayed { tag: String },
    Click(ClickOutcome),
    CheckedIn { clients: usize },
    /// A message asked for an immediate notification; displayed detached
    ShowRequested,
    Scheduled { delay_ms: u64 },
    Ignored,
}

impl fmt::Display for EventOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventOutcome::Installed => write!(f, "installed"),
            EventOutcome::Activated => write!(f, "activated"),
            EventOutcome::Displayed { tag } => write!(f, "displayed {tag}"),
            EventOutcome::Click(outcome) => write!(f, "click {outcome}"),
            EventOutcome::CheckedIn { clients } => write!(f, "checked in with {clients} client(s)"),
            EventOutcome::ShowRequested => write!(f, "show requested"),
            EventOutcome::Scheduled { delay_ms } => write!(f, "scheduled in {delay_ms}ms"),
            EventOutcome::Ignored => write!(f, "ignored"),
        }
    }
}

/// Notification coordinator bound to one host.
///
/// Owns the timers it arms: dropping the coordinator discards them.
pub struct Coordinator<H: Host> {
    host: Arc<H>,
    app: AppConfig,
    scheduler: Scheduler<H>,
}

impl<H: Host> Coordinator<H> {
    #[must_use]
    pub fn new(host: Arc<H>, app: AppConfig) -> Self {
        Self {
            scheduler: Scheduler::new(host.clone()),
            host,
            app,
        }
    }

    #[must_use]
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Scheduled notifications still waiting on their timer.
    #[must_use]
    pub fn armed_timers(&self) -> usize {
        self.scheduler.armed()
    }

    /// Handle one event. Resolves once every awaited host primitive has
    /// settled; detached work (message shows, timers) may still be running.
    ///
    /// # Errors
    ///
    /// Only host primitive failures are returned. Decoding problems and
    /// unrecognized input are absorbed.
    pub async fn handle(&self, event: WorkerEvent) -> Result<EventOutcome> {
        match event {
            WorkerEvent::Install => {
                lifecycle::on_install(&*self.host).await?;
                Ok(EventOutcome::Installed)
            }
            WorkerEvent::Activate => {
                lifecycle::on_activate(&*self.host).await?;
                Ok(EventOutcome::Activated)
            }
            WorkerEvent::Push { data } => self.on_push(data.as_deref()).await,
            WorkerEvent::NotificationClick {
                notification,
                action,
            } => click::route_click(&*self.host, &self.app, &notification, action.as_deref())
                .await
                .map(EventOutcome::Click),
            WorkerEvent::Sync { tag } => self.on_sync(SyncTrigger::OneShot, &tag).await,
            WorkerEvent::PeriodicSync { tag } => self.on_sync(SyncTrigger::Periodic, &tag).await,
            WorkerEvent::Message { data, source } => Ok(self.on_message(&data, source.as_deref())),
        }
    }

    async fn on_push(&self, data: Option<&[u8]>) -> Result<EventOutcome> {
        info!("Push received ({} bytes)", data.map_or(0, <[u8]>::len));
        let descriptor = decoder::decode_push(data);
        let tag = renderer::render(&*self.host, descriptor, PUSH_TAG).await?;
        Ok(EventOutcome::Displayed { tag })
    }

    async fn on_sync(&self, trigger: SyncTrigger, tag: &str) -> Result<EventOutcome> {
        Ok(match wakeup::handle_sync(&*self.host, trigger, tag).await? {
            Some(clients) => EventOutcome::CheckedIn { clients },
            None => EventOutcome::Ignored,
        })
    }

    fn on_message(&self, data: &Value, source: Option<&str>) -> EventOutcome {
        info!("Message received from {:?}: {}", source, data);

        match router::route_message(data) {
            MessageAction::Show(descriptor) => {
                let host = self.host.clone();
                tokio::spawn(async move {
                    if let Err(e) = renderer::render(&*host, descriptor, MESSAGE_TAG).await {
                        error!("Requested notification failed: {}", e);
                    }
                });
                EventOutcome::ShowRequested
            }
            MessageAction::Schedule(request) => {
                let delay_ms = request.delay_ms;
                self.scheduler.schedule(request);
                EventOutcome::Scheduled { delay_ms }
            }
            MessageAction::Ignore => EventOutcome::Ignored,
        }
    }
}
