use std::time::{Duration, Instant};

use crate::transport::TransportStatus;

/// Time allowed for a transport to become writable, otherwise the call fails.
pub const CALL_SETUP_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Single-shot call setup timer.
///
/// At most one deadline is pending. Arming again replaces it.
#[derive(Debug, Default)]
pub(crate) struct Watchdog {
    deadline: Option<Instant>,
}

impl Watchdog {
    /// React to a transport starting to connect or changing writable state.
    ///
    /// Any pending deadline is cancelled. A new one is set if the transport has
    /// channels that are not yet writable.
    pub fn supervise(&mut self, now: Instant, status: &TransportStatus) {
        if self.disarm() {
            trace!("Cancel pending call setup timeout");
        }

        if status.awaits_writable() {
            let deadline = now + CALL_SETUP_TIMEOUT;
            debug!(
                "Transport {} not writable, call setup timeout in {:?}",
                status.content, CALL_SETUP_TIMEOUT
            );
            self.deadline = Some(deadline);
        }
    }

    /// Cancel the pending deadline. Returns `true` if there was one.
    pub fn disarm(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn poll_timeout(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` once when the deadline is reached.
    pub fn handle_timeout(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
