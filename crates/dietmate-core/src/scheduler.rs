//! Delayed local notifications.
//!
//! Timers live only as long as the [`Scheduler`] that armed them. Dropping the
//! scheduler (host disconnect, process exit) aborts every pending timer; the
//! notifications are lost, nothing is persisted.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dietmate_types::{SCHEDULED_TAG, ScheduleRequest};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::host::Host;
use crate::renderer;

pub struct Scheduler<H: Host> {
    host: Arc<H>,
    timers: Mutex<Vec<JoinHandle<()>>>,
}

impl<H: Host> Scheduler<H> {
    #[must_use]
    pub fn new(host: Arc<H>) -> Self {
        Self {
            host,
            timers: Mutex::new(Vec::new()),
        }
    }

    /// Arm a single-fire timer. Returns immediately.
    ///
    /// Requests never cancel each other, even with identical contents.
    pub fn schedule(&self, request: ScheduleRequest) {
        let host = self.host.clone();
        let delay = Duration::from_millis(request.delay_ms);
        debug!("Arming timer: {}ms, tag={:?}", request.delay_ms, request.tag);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = renderer::render(&*host, request.descriptor(), SCHEDULED_TAG).await {
                error!("Scheduled notification failed: {}", e);
            }
        });

        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        timers.retain(|t| !t.is_finished());
        timers.push(handle);
    }

    /// Timers armed in this instance that have not completed yet.
    #[must_use]
    pub fn armed(&self) -> usize {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|t| !t.is_finished())
            .count()
    }
}

impl<H: Host> Drop for Scheduler<H> {
    fn drop(&mut self) {
        let timers = self.timers.get_mut().unwrap_or_else(PoisonError::into_inner);
        let pending = timers.iter().filter(|t| !t.is_finished()).count();
        if pending > 0 {
            debug!("Discarding {} pending timer(s)", pending);
        }
        for timer in timers.drain(..) {
            timer.abort();
        }
    }
}
