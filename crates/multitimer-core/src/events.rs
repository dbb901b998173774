use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alarm::AlarmId;

/// Every observable state change produces an Event.
/// The host consumes these for its list UI and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AlarmEvent {
    /// Deadline armed; nothing visible yet.
    AlarmScheduled {
        id: AlarmId,
        deadline: i64,
        at: DateTime<Utc>,
    },
    /// Deadline arrived; loud alert showing, silence deadline armed.
    AlarmFired {
        id: AlarmId,
        at: DateTime<Utc>,
    },
    /// Grace period elapsed; the alert was downgraded in place.
    AlarmSilenced {
        id: AlarmId,
        at: DateTime<Utc>,
    },
    /// Deadlines disarmed and the alert dismissed.
    AlarmCancelled {
        id: AlarmId,
        at: DateTime<Utc>,
    },
    /// Every visible alert dismissed; pending deadlines untouched.
    AlertsCleared {
        at: DateTime<Utc>,
    },
}
