//! The shared blackboard threaded through every kernel callback.
//!
//! Tick-context handlers (pending ops, 1-second housekeeping) receive
//! `&mut RobotCtx` and nothing else.  They update countdowns and flags and
//! queue deferred actuator requests; the foreground applies those requests
//! the next time it pumps the kernel.  Hardware is never touched from tick
//! context.

use crate::config::RobotConfig;
use crate::kernel::Opcode;
use crate::schedule::{PatternQueue, ScheduleState};

/// Actuator work queued by tick-context handlers for the foreground.
#[derive(Debug, Default)]
pub struct ActuatorRequests {
    /// Swing the snack servo back to its ready angle.
    pub snack_servo_ready: bool,
    /// Drop the find-request line to the companion.
    pub release_find_signal: bool,
}

/// Live state of an autonomous play session.
#[derive(Debug, Default)]
pub struct AutoplayState {
    /// A session was abandoned mid-search; resume on vibration.
    pub cancelled: bool,
    /// True from session begin to session end.
    pub running: bool,

    /// Seconds left in the cat-search rotation, 0 = inactive.
    pub search_countdown: i32,
    pub search_timed_out: bool,

    /// Seconds left in the call-and-wait phase, 0 = inactive.
    pub vibration_countdown: i32,
    pub vibration_timed_out: bool,

    /// Toggled every second to gate the repeating call tone.
    pub call_blink: bool,
}

impl AutoplayState {
    pub fn arm_search(&mut self, secs: i32) {
        self.search_countdown = secs.max(1);
        self.search_timed_out = false;
    }

    pub fn arm_vibration_wait(&mut self, secs: i32) {
        self.vibration_countdown = secs.max(1);
        self.vibration_timed_out = false;
    }

    /// 1-second housekeeping for the session countdowns.
    pub fn second_tick(&mut self) {
        if self.search_countdown > 0 {
            self.search_countdown -= 1;
            if self.search_countdown == 0 {
                self.search_timed_out = true;
            }
        }
        if self.vibration_countdown > 0 {
            self.vibration_countdown -= 1;
            if self.vibration_countdown == 0 {
                self.vibration_timed_out = true;
            }
        }
        self.call_blink = !self.call_blink;
    }
}

/// The blackboard.
pub struct RobotCtx {
    pub config: RobotConfig,
    pub schedule: ScheduleState,
    pub patterns: PatternQueue,
    pub autoplay: AutoplayState,
    pub requests: ActuatorRequests,

    /// Pending op: snack servo return-to-ready.
    pub op_snack_return: Opcode,
    /// Pending op: find-request pulse release.
    pub op_find_release: Opcode,
}

impl RobotCtx {
    pub fn new(config: RobotConfig) -> Self {
        Self {
            config,
            schedule: ScheduleState::new(),
            patterns: PatternQueue::new(),
            autoplay: AutoplayState::default(),
            requests: ActuatorRequests::default(),
            op_snack_return: Opcode::NONE,
            op_find_release: Opcode::NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_countdown_latches_timeout_once() {
        let mut ap = AutoplayState::default();
        ap.arm_search(3);
        for _ in 0..2 {
            ap.second_tick();
        }
        assert!(!ap.search_timed_out);
        ap.second_tick();
        assert!(ap.search_timed_out);

        // Further ticks leave the countdown at rest.
        ap.second_tick();
        assert_eq!(ap.search_countdown, 0);
    }

    #[test]
    fn countdowns_are_independent() {
        let mut ap = AutoplayState::default();
        ap.arm_search(2);
        ap.arm_vibration_wait(4);
        for _ in 0..2 {
            ap.second_tick();
        }
        assert!(ap.search_timed_out);
        assert!(!ap.vibration_timed_out);
        for _ in 0..2 {
            ap.second_tick();
        }
        assert!(ap.vibration_timed_out);
    }

    #[test]
    fn call_blink_toggles_every_second() {
        let mut ap = AutoplayState::default();
        assert!(!ap.call_blink);
        ap.second_tick();
        assert!(ap.call_blink);
        ap.second_tick();
        assert!(!ap.call_blink);
    }
}
