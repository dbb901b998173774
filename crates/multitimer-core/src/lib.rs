//! # Multitimer Core Library
//!
//! Core alarm-handling logic for Multitimer. Each alarm fires a loud alert at
//! its deadline, stays loud for a bounded grace period, then automatically
//! downgrades to a quiet presentation until the user cancels it. The host
//! application (alarm list UI, platform glue, storage) invokes this crate;
//! the crate owns the firing protocol and nothing else.
//!
//! ## Architecture
//!
//! - **Alarm Lifecycle**: a per-id state machine (Scheduled -> Fired ->
//!   Silenced, Cancelled from anywhere) orchestrating the three collaborator
//!   seams below
//! - **Deadline Scheduler**: arms one callback per logical key at an absolute
//!   time; re-arming a key supersedes the previous arming
//! - **Alert Presenter**: creates, replaces, and dismisses visible alerts
//!   keyed by alarm id
//! - **Wake Guard**: keeps the processor awake across alarm handling, with a
//!   hard release timeout
//!
//! ## Key Components
//!
//! - [`AlarmLifecycle`]: the state machine
//! - [`TokioDeadlineScheduler`]: in-process deadline delivery
//! - [`FiringPayload`]: the flat record that crosses the delivery boundary
//! - [`Config`]: timeouts and alert text

pub mod alarm;
pub mod config;
pub mod deadline;
pub mod error;
pub mod events;
pub mod presenter;
pub mod wake;

pub use alarm::{
    AlarmId, AlarmLifecycle, AlarmRecord, Firing, FiringPayload, FiringState, LaunchSignal,
};
pub use config::Config;
pub use deadline::{
    alarm_key, silence_key, DeadlineKey, DeadlineScheduler, DeadlineSlot, TokioDeadlineScheduler,
};
pub use error::{ConfigError, CoreError, PresenterError, Result, SchedulerError, WakeError};
pub use events::AlarmEvent;
pub use presenter::{AlertMode, AlertPresenter};
pub use wake::{WakeGuard, WakeRetention};
