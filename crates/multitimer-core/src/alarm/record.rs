//! Alarm identity and the payload that crosses the delivery boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alarm identifier, assigned by the owning caller and stable for the
/// alarm's lifetime. Shared with the alert key space: the alert for an alarm
/// is keyed by the same id.
pub type AlarmId = i64;

/// A user-defined deadline alarm.
///
/// Constructed by the owner when a timer is created; this core keeps no
/// persistent copy beyond what is embedded in deadline payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRecord {
    pub id: AlarmId,
    /// Display text shown on the alert.
    pub name: String,
    /// Absolute due time, epoch seconds.
    pub deadline: i64,
}

impl AlarmRecord {
    pub fn new(id: AlarmId, name: impl Into<String>, deadline: i64) -> Self {
        Self {
            id,
            name: name.into(),
            deadline,
        }
    }

    /// The deadline as a UTC timestamp. Second resolution is all this layer
    /// has; an out-of-range value clamps to the distant past.
    pub fn deadline_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.deadline, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// The flat record delivered with a deadline callback.
///
/// The handler may run in a fresh process with no memory of the call that
/// armed the deadline, so everything needed to act travels here. A payload
/// without the `silence` flag predates the two-phase alert and reads as an
/// arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiringPayload {
    pub id: AlarmId,
    pub name: String,
    pub deadline: i64,
    #[serde(default)]
    pub silence: bool,
}

impl FiringPayload {
    /// Payload for an alarm's own deadline.
    pub fn arrival(record: &AlarmRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            deadline: record.deadline,
            silence: false,
        }
    }

    /// Payload for an alarm's auto-silence deadline.
    pub fn silence(record: &AlarmRecord) -> Self {
        Self {
            silence: true,
            ..Self::arrival(record)
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn record(&self) -> AlarmRecord {
        AlarmRecord {
            id: self.id,
            name: self.name.clone(),
            deadline: self.deadline,
        }
    }
}

/// Typed view of one delivery. Handlers dispatch by matching on this, never
/// by reading the wire flag at use sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Firing {
    /// The alarm's deadline arrived.
    Arrive(AlarmRecord),
    /// The grace period after firing elapsed.
    Silence(AlarmRecord),
}

impl From<FiringPayload> for Firing {
    fn from(payload: FiringPayload) -> Self {
        let record = payload.record();
        if payload.silence {
            Firing::Silence(record)
        } else {
            Firing::Arrive(record)
        }
    }
}
