//! Deadline-triggered callback scheduling.
//!
//! Facade over a platform primitive that invokes a handler at or after an
//! absolute timestamp, even while the host process is otherwise idle. Each
//! alarm owns two logical arming slots, addressed by [`DeadlineKey`]s derived
//! from the alarm id alone.

mod runtime;

pub use runtime::TokioDeadlineScheduler;

use chrono::{DateTime, Utc};

use crate::alarm::{AlarmId, FiringPayload};
use crate::error::SchedulerError;

/// Which of the two per-alarm arming slots a key addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeadlineSlot {
    /// The alarm's own deadline.
    Arrival,
    /// The auto-silence deadline armed when the alarm fires.
    Silence,
}

/// Stable identity of one logical arming.
///
/// Both slots are deterministic functions of the alarm id, so re-scheduling
/// an alarm always supersedes its previous arming instead of accumulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeadlineKey {
    pub id: AlarmId,
    pub slot: DeadlineSlot,
}

/// Key for an alarm's own deadline.
pub fn alarm_key(id: AlarmId) -> DeadlineKey {
    DeadlineKey {
        id,
        slot: DeadlineSlot::Arrival,
    }
}

/// Key for an alarm's auto-silence deadline.
pub fn silence_key(id: AlarmId) -> DeadlineKey {
    DeadlineKey {
        id,
        slot: DeadlineSlot::Silence,
    }
}

/// The deadline callback primitive.
///
/// `arm` requests exactly one future delivery of `payload` at or after
/// `when`, replacing any pending arming under the same key. `disarm` cancels
/// a pending arming and is a no-op when none is pending. Sub-second precision
/// is not guaranteed; delivery is never early.
pub trait DeadlineScheduler: Send + Sync {
    fn arm(
        &self,
        key: DeadlineKey,
        when: DateTime<Utc>,
        payload: FiringPayload,
    ) -> Result<(), SchedulerError>;

    fn disarm(&self, key: DeadlineKey) -> Result<(), SchedulerError>;
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn slots_never_collide(id in any::<i64>()) {
            prop_assert_ne!(alarm_key(id), silence_key(id));
        }

        #[test]
        fn keys_are_stable_per_id(a in any::<i64>(), b in any::<i64>()) {
            prop_assert_eq!(alarm_key(a) == alarm_key(b), a == b);
            prop_assert_eq!(silence_key(a) == silence_key(b), a == b);
        }
    }
}
