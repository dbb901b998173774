//! Alert presentation facade.
//!
//! Alerts share the numeric key space with alarm ids: presenting under an id
//! that is already showing replaces that alert in place, never duplicates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alarm::AlarmId;
use crate::error::PresenterError;

/// Whether a (re)presentation carries an audible/vibration cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertMode {
    /// Audible cue and vibration pattern on presentation.
    Loud,
    /// Visual only. Replacing a loud alert quietly must not re-trigger
    /// the cue.
    Quiet,
}

/// The user-facing alert service.
///
/// Implementations are stateless facades over whatever the platform shows
/// alerts with; the only memory of an alert lives in that service.
/// `dismiss` on an id with nothing showing is a no-op, not an error.
pub trait AlertPresenter: Send + Sync {
    /// Create or replace the alert keyed by `id`.
    fn present(
        &self,
        id: AlarmId,
        title: &str,
        body: &str,
        timestamp: DateTime<Utc>,
        mode: AlertMode,
    ) -> Result<(), PresenterError>;

    /// Remove the alert for `id`, if any.
    fn dismiss(&self, id: AlarmId) -> Result<(), PresenterError>;

    /// Remove every alert this application is showing.
    fn dismiss_all(&self) -> Result<(), PresenterError>;
}
