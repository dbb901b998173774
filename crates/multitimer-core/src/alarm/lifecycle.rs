//! The alarm lifecycle state machine.
//!
//! Per alarm id:
//!
//! ```text
//!                deadline arrives         grace period elapses
//!  Scheduled ─────────────────► Fired ─────────────────────► Silenced
//!      │                          │                              │
//!      └────────── cancel ────────┴─────────── cancel ──────────┘
//!                                 │
//!                                 ▼
//!                             Cancelled
//! ```
//!
//! Firing presents the alert loudly and arms the auto-silence deadline;
//! silencing re-presents the same alert quietly without dismissing it.
//! Cancellation disarms both deadlines and dismisses the alert from any
//! state, and leaves a tombstone so a delivery that raced the cancel is
//! dropped instead of resurrecting the alert.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Duration as TimeDelta, Utc};

use super::record::{AlarmId, AlarmRecord, Firing, FiringPayload};
use crate::config::Config;
use crate::deadline::{alarm_key, silence_key, DeadlineScheduler};
use crate::error::Result;
use crate::events::AlarmEvent;
use crate::presenter::{AlertMode, AlertPresenter};
use crate::wake::{WakeGuard, WakeRetention};

/// Where one alarm is in its firing protocol.
///
/// Transient: held only while the alarm is outstanding in this process. An
/// id this process has never seen carries no entry, and a delivery for it is
/// taken at face value -- after a restart the payload is the only state
/// there is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiringState {
    /// Deadline armed, nothing visible yet.
    Scheduled,
    /// Loud alert showing, auto-silence deadline armed.
    Fired,
    /// Quiet alert showing. Terminal until cancelled.
    Silenced,
    /// Tombstone. A delivery that raced the cancel is recognized as stale;
    /// only a new `schedule` clears it.
    Cancelled,
}

/// Launch context handed in by the host UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchSignal {
    /// Set when the user opened the app to acknowledge everything showing.
    pub clear_alerts: bool,
}

/// Orchestrates the deadline scheduler, alert presenter, and wake guard to
/// run each alarm through its firing protocol.
///
/// All operations take `&self`; deliveries for distinct ids may be handled
/// concurrently. Collaborator calls happen before the state commit, so a
/// failed operation leaves the previous state intact and can be retried.
pub struct AlarmLifecycle {
    scheduler: Arc<dyn DeadlineScheduler>,
    presenter: Arc<dyn AlertPresenter>,
    wake: WakeGuard,
    config: Config,
    states: Mutex<HashMap<AlarmId, FiringState>>,
}

impl AlarmLifecycle {
    pub fn new(
        scheduler: Arc<dyn DeadlineScheduler>,
        presenter: Arc<dyn AlertPresenter>,
        wake_source: Arc<dyn WakeRetention>,
        config: Config,
    ) -> Self {
        Self {
            scheduler,
            presenter,
            wake: WakeGuard::new(wake_source),
            config,
            states: Mutex::new(HashMap::new()),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current firing state, if this process has seen the id.
    pub fn state(&self, id: AlarmId) -> Option<FiringState> {
        self.lock_states().get(&id).copied()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm the alarm's deadline.
    ///
    /// Re-scheduling an id supersedes its previous arming; there is never
    /// more than one pending deadline per alarm.
    pub fn schedule(&self, record: &AlarmRecord) -> Result<AlarmEvent> {
        self.scheduler.arm(
            alarm_key(record.id),
            record.deadline_utc(),
            FiringPayload::arrival(record),
        )?;
        self.commit(record.id, FiringState::Scheduled);
        tracing::info!(id = record.id, deadline = record.deadline, "alarm scheduled");
        Ok(AlarmEvent::AlarmScheduled {
            id: record.id,
            deadline: record.deadline,
            at: Utc::now(),
        })
    }

    /// Disarm both deadlines and dismiss the alert.
    ///
    /// Idempotent: cancelling an id that was never scheduled, or cancelling
    /// twice, changes nothing visible.
    pub fn cancel(&self, record: &AlarmRecord) -> Result<AlarmEvent> {
        self.scheduler.disarm(alarm_key(record.id))?;
        self.scheduler.disarm(silence_key(record.id))?;
        self.presenter.dismiss(record.id)?;
        self.commit(record.id, FiringState::Cancelled);
        tracing::info!(id = record.id, "alarm cancelled");
        Ok(AlarmEvent::AlarmCancelled {
            id: record.id,
            at: Utc::now(),
        })
    }

    /// Dismiss every visible alert.
    ///
    /// Pending deadlines are left armed: an alarm that has not fired yet
    /// still fires and presents later.
    pub fn clear_all(&self) -> Result<AlarmEvent> {
        self.presenter.dismiss_all()?;
        tracing::info!("all visible alerts cleared");
        Ok(AlarmEvent::AlertsCleared { at: Utc::now() })
    }

    /// Entry point for the host's launch context.
    ///
    /// The UI signals "acknowledge everything currently showing" with a
    /// boolean flag; an unset flag is a no-op, never an error.
    pub fn handle_launch(&self, signal: &LaunchSignal) -> Result<Option<AlarmEvent>> {
        if signal.clear_alerts {
            return Ok(Some(self.clear_all()?));
        }
        Ok(None)
    }

    /// Entry point for deadline deliveries.
    ///
    /// Returns `Ok(None)` for a stale delivery, i.e. the id was cancelled
    /// while the callback was already in flight.
    pub fn handle_firing(&self, payload: FiringPayload) -> Result<Option<AlarmEvent>> {
        match Firing::from(payload) {
            Firing::Arrive(record) => self.fire(record),
            Firing::Silence(record) => self.silence(record),
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Scheduled -> Fired. Wake the device, present loudly, arm the
    /// auto-silence deadline.
    ///
    /// The silence deadline is relative to delivery time, not the original
    /// deadline: late delivery of the arrival shifts the quiet downgrade by
    /// the same amount.
    fn fire(&self, record: AlarmRecord) -> Result<Option<AlarmEvent>> {
        if self.is_cancelled(record.id) {
            tracing::debug!(id = record.id, "dropping arrival for cancelled alarm");
            return Ok(None);
        }

        self.wake.acquire(self.config.wake_timeout())?;
        self.presenter.present(
            record.id,
            &self.config.alert_title,
            &record.name,
            record.deadline_utc(),
            AlertMode::Loud,
        )?;
        // The arrival slot is spent; nothing may stay armed under it.
        self.scheduler.disarm(alarm_key(record.id))?;
        let silence_at =
            Utc::now() + TimeDelta::milliseconds(self.config.silence_timeout_ms as i64);
        self.scheduler.arm(
            silence_key(record.id),
            silence_at,
            FiringPayload::silence(&record),
        )?;
        self.commit(record.id, FiringState::Fired);
        tracing::info!(id = record.id, "alarm fired");
        Ok(Some(AlarmEvent::AlarmFired {
            id: record.id,
            at: Utc::now(),
        }))
    }

    /// Fired -> Silenced. Downgrade the existing alert in place: no sound,
    /// no vibration, no new deadline.
    fn silence(&self, record: AlarmRecord) -> Result<Option<AlarmEvent>> {
        if self.is_cancelled(record.id) {
            tracing::debug!(id = record.id, "dropping silence for cancelled alarm");
            return Ok(None);
        }

        self.presenter.present(
            record.id,
            &self.config.alert_title,
            &record.name,
            record.deadline_utc(),
            AlertMode::Quiet,
        )?;
        self.commit(record.id, FiringState::Silenced);
        tracing::info!(id = record.id, "alarm silenced");
        Ok(Some(AlarmEvent::AlarmSilenced {
            id: record.id,
            at: Utc::now(),
        }))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn is_cancelled(&self, id: AlarmId) -> bool {
        matches!(self.lock_states().get(&id), Some(FiringState::Cancelled))
    }

    /// The single point where a per-id state may move. `Cancelled` is sticky
    /// against racing fire/silence commits; only `schedule` replaces it.
    fn commit(&self, id: AlarmId, next: FiringState) {
        let mut states = self.lock_states();
        let blocked = matches!(states.get(&id), Some(FiringState::Cancelled))
            && !matches!(next, FiringState::Scheduled | FiringState::Cancelled);
        if !blocked {
            states.insert(id, next);
        }
    }

    fn lock_states(&self) -> MutexGuard<'_, HashMap<AlarmId, FiringState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
