//! In-process deadline delivery on the tokio runtime.
//!
//! One sleep task per armed key; deliveries cross to the host on an
//! unbounded channel, which it drains into
//! [`AlarmLifecycle::handle_firing`](crate::alarm::AlarmLifecycle::handle_firing).
//! The channel is the receiver boundary: a payload crosses it with no shared
//! state, exactly what it would carry across a process restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::{DeadlineKey, DeadlineScheduler};
use crate::alarm::FiringPayload;
use crate::error::SchedulerError;

type ArmedMap = HashMap<DeadlineKey, JoinHandle<()>>;

/// [`DeadlineScheduler`] backed by tokio timers.
///
/// Arming requires a running runtime; without one, `arm` fails with
/// [`SchedulerError::RuntimeUnavailable`] and nothing is recorded.
pub struct TokioDeadlineScheduler {
    deliveries: UnboundedSender<FiringPayload>,
    armed: Mutex<ArmedMap>,
}

impl TokioDeadlineScheduler {
    /// Returns the scheduler and the receiving end the host drains.
    pub fn new() -> (Arc<Self>, UnboundedReceiver<FiringPayload>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Arc::new(Self {
            deliveries: tx,
            armed: Mutex::new(HashMap::new()),
        });
        (scheduler, rx)
    }

    fn lock_armed(&self) -> MutexGuard<'_, ArmedMap> {
        self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeadlineScheduler for TokioDeadlineScheduler {
    fn arm(
        &self,
        key: DeadlineKey,
        when: DateTime<Utc>,
        payload: FiringPayload,
    ) -> Result<(), SchedulerError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| SchedulerError::RuntimeUnavailable)?;

        // "At or after": a deadline already in the past delivers immediately.
        let delay = (when - Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);

        let sender = self.deliveries.clone();
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if sender.send(payload).is_err() {
                tracing::debug!("deadline delivery dropped: receiver closed");
            }
        });

        let mut armed = self.lock_armed();
        armed.retain(|_, pending| !pending.is_finished());
        if let Some(superseded) = armed.insert(key, task) {
            superseded.abort();
        }
        tracing::debug!(?key, %when, "armed deadline");
        Ok(())
    }

    fn disarm(&self, key: DeadlineKey) -> Result<(), SchedulerError> {
        if let Some(pending) = self.lock_armed().remove(&key) {
            pending.abort();
            tracing::debug!(?key, "disarmed deadline");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Duration as TimeDelta;
    use tokio::time;

    use super::*;
    use crate::alarm::AlarmRecord;
    use crate::deadline::alarm_key;

    fn payload(id: i64, name: &str) -> FiringPayload {
        FiringPayload::arrival(&AlarmRecord::new(id, name, Utc::now().timestamp()))
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_at_the_deadline() {
        let (scheduler, mut deliveries) = TokioDeadlineScheduler::new();
        scheduler
            .arm(
                alarm_key(1),
                Utc::now() + TimeDelta::seconds(2),
                payload(1, "Tea"),
            )
            .unwrap();

        time::advance(Duration::from_secs(2)).await;
        let delivered = deliveries.recv().await.unwrap();
        assert_eq!(delivered.id, 1);
        assert_eq!(delivered.name, "Tea");
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_a_key_supersedes_the_previous_arming() {
        let (scheduler, mut deliveries) = TokioDeadlineScheduler::new();
        let when = Utc::now() + TimeDelta::seconds(5);
        scheduler.arm(alarm_key(1), when, payload(1, "old")).unwrap();
        scheduler.arm(alarm_key(1), when, payload(1, "new")).unwrap();

        time::advance(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;

        let delivered = deliveries.recv().await.unwrap();
        assert_eq!(delivered.name, "new");
        assert!(deliveries.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_prevents_delivery() {
        let (scheduler, mut deliveries) = TokioDeadlineScheduler::new();
        scheduler
            .arm(
                alarm_key(1),
                Utc::now() + TimeDelta::seconds(2),
                payload(1, "Tea"),
            )
            .unwrap();
        scheduler.disarm(alarm_key(1)).unwrap();

        time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert!(deliveries.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn disarming_an_idle_key_is_a_noop() {
        let (scheduler, _deliveries) = TokioDeadlineScheduler::new();
        scheduler.disarm(alarm_key(42)).unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn past_deadline_delivers_immediately() {
        let (scheduler, mut deliveries) = TokioDeadlineScheduler::new();
        scheduler
            .arm(
                alarm_key(1),
                Utc::now() - TimeDelta::seconds(10),
                payload(1, "late"),
            )
            .unwrap();

        let delivered = deliveries.recv().await.unwrap();
        assert_eq!(delivered.name, "late");
    }
}
