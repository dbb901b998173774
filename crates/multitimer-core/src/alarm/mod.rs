mod lifecycle;
mod record;

pub use lifecycle::{AlarmLifecycle, FiringState, LaunchSignal};
pub use record::{AlarmId, AlarmRecord, Firing, FiringPayload};
