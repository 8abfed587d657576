//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — log to serial, mirror to the
//! companion, update a BLE characteristic, etc.

use crate::patterns::PatternMode;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The application service has started.
    Started,

    /// A schedule record was armed.
    ScheduleArmed { wait_secs: i32, queued: usize },

    /// The operator entered / left the manual-drive loop.
    ManualEntered,
    ManualExited,

    /// An autonomous play session began (`resumed` when re-entered after
    /// a vibration wake-up).
    AutoplayStarted { resumed: bool },

    /// One motion pattern ran to completion.
    PatternExecuted { code: u8, mode: PatternMode },

    /// A snack was dispensed mid-session.
    SnackGiven,

    /// The session was abandoned: no cat found and no vibration response.
    AutoplayCancelled,

    /// The session finished and the robot parked.
    AutoplayFinished,
}
