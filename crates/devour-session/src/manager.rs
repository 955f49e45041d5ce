//! The reconnection manager: one grace timer per disconnected client.
//!
//! Each timer is a small Tokio task that sleeps for the grace period and
//! then reports a [`GraceExpired`] on the owning room's channel. Every
//! timer carries a generation number. Only the generation currently on
//! record is honoured by [`ReconnectionManager::confirm_expiry`], so an
//! expiry that was already in flight when the client reconnected (or
//! disconnected again) is rejected as stale.
//!
//! # Concurrency note
//!
//! `ReconnectionManager` is owned by a single room actor and is not
//! shared. The timer tasks hold only a channel sender.

use std::collections::HashMap;
use std::time::Duration;

use devour_protocol::ClientId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::SessionError;

/// Sent by a timer task when a client's grace period runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraceExpired {
    pub client_id: ClientId,
    pub generation: u64,
}

/// Describes a grace period that was just started.
#[derive(Debug, Clone)]
pub struct GraceTicket {
    pub client_id: ClientId,
    pub generation: u64,
    pub deadline: Instant,
}

struct GraceTimer {
    generation: u64,
    deadline: Instant,
    task: JoinHandle<()>,
}

/// Tracks pending reconnection grace periods for one room.
pub struct ReconnectionManager {
    timers: HashMap<ClientId, GraceTimer>,
    expiry_tx: mpsc::UnboundedSender<GraceExpired>,
    next_generation: u64,
}

impl ReconnectionManager {
    /// Creates a manager that reports expiries on `expiry_tx`.
    pub fn new(expiry_tx: mpsc::UnboundedSender<GraceExpired>) -> Self {
        Self {
            timers: HashMap::new(),
            expiry_tx,
            next_generation: 0,
        }
    }

    /// Starts a grace period for `client_id`.
    ///
    /// A grace period already running for the same client is cancelled
    /// and replaced. Must be called from inside a Tokio runtime.
    pub fn start_grace_period(&mut self, client_id: ClientId, duration: Duration) -> GraceTicket {
        self.next_generation += 1;
        let generation = self.next_generation;
        let deadline = Instant::now() + duration;

        let tx = self.expiry_tx.clone();
        let expired = GraceExpired {
            client_id: client_id.clone(),
            generation,
        };
        let task = tokio::spawn(async move {
            time::sleep_until(deadline).await;
            // The room may already be gone.
            let _ = tx.send(expired);
        });

        let timer = GraceTimer {
            generation,
            deadline,
            task,
        };
        if let Some(previous) = self.timers.insert(client_id.clone(), timer) {
            previous.task.abort();
            debug!(client_id = %client_id, superseded = previous.generation, "grace period restarted");
        }

        info!(
            client_id = %client_id,
            generation,
            grace_secs = duration.as_secs_f64(),
            "grace period started"
        );

        GraceTicket {
            client_id,
            generation,
            deadline,
        }
    }

    /// Cancels the grace period for `client_id`, typically because the
    /// client reconnected. Returns the time that was left on it.
    ///
    /// # Errors
    /// Returns [`SessionError::NoGracePeriod`] if nothing was pending.
    pub fn cancel(&mut self, client_id: &ClientId) -> Result<Duration, SessionError> {
        let timer = self
            .timers
            .remove(client_id)
            .ok_or_else(|| SessionError::NoGracePeriod(client_id.clone()))?;
        timer.task.abort();

        let remaining = timer.deadline.saturating_duration_since(Instant::now());
        info!(
            client_id = %client_id,
            remaining_secs = remaining.as_secs_f64(),
            "grace period cancelled"
        );
        Ok(remaining)
    }

    /// Accepts an expiry delivered on the channel, clearing the record.
    ///
    /// On `Ok` the caller should remove the player.
    ///
    /// # Errors
    /// Returns [`SessionError::StaleExpiry`] if the timer was cancelled or
    /// superseded after the expiry was sent.
    pub fn confirm_expiry(&mut self, expired: &GraceExpired) -> Result<(), SessionError> {
        match self.timers.get(&expired.client_id) {
            Some(timer) if timer.generation == expired.generation => {
                self.timers.remove(&expired.client_id);
                info!(client_id = %expired.client_id, "grace period expired");
                Ok(())
            }
            _ => {
                debug!(
                    client_id = %expired.client_id,
                    generation = expired.generation,
                    "ignoring stale grace expiry"
                );
                Err(SessionError::StaleExpiry(expired.client_id.clone()))
            }
        }
    }

    /// Whether a grace period is running for `client_id`.
    pub fn is_pending(&self, client_id: &ClientId) -> bool {
        self.timers.contains_key(client_id)
    }

    /// When the pending grace period for `client_id` runs out.
    pub fn deadline(&self, client_id: &ClientId) -> Option<Instant> {
        self.timers.get(client_id).map(|timer| timer.deadline)
    }

    /// Cancels every pending grace period. Returns how many were running.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.timers.len();
        for (_, timer) in self.timers.drain() {
            timer.task.abort();
        }
        if count > 0 {
            debug!(count, "all grace periods cancelled");
        }
        count
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl Drop for ReconnectionManager {
    fn drop(&mut self) {
        for timer in self.timers.values() {
            timer.task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
