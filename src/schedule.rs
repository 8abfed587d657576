//! Play-schedule ingestion and the pattern queue.
//!
//! Schedule fields arrive from the companion one frame at a time inside a
//! `<` … `>` bracket.  [`ScheduleState`] is the ingestion state machine:
//! field setters only take effect while a bracket is open, and closing the
//! bracket arms the countdown.  Once armed, the wait time is decremented by
//! the kernel's 1-second handler; reaching zero latches a due flag that the
//! dispatch loop consumes exactly once.
//!
//! [`PatternQueue`] holds the pattern codes for the next play session.
//! Codes survive an interrupted session, so a play cut short by a missing
//! cat resumes with the queue intact.

use crate::error::Error;
use log::info;

/// Capacity of the pattern queue.
pub const PATTERN_QUEUE_CAP: usize = 128;

// ───────────────────────────────────────────────────────────────
// Schedule ingestion state machine
// ───────────────────────────────────────────────────────────────

/// Idle → (`<`) → Receiving → (`>`) → Armed → (countdown hits 0) → Due.
#[derive(Debug, Default)]
pub struct ScheduleState {
    wait_time_secs: i32,
    duration_secs: i32,
    speed_level: u8,
    snack_interval: u8,
    receiving: bool,
    armed: bool,
    due: bool,
}

impl ScheduleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the field bracket.  Resets the duration to its floor so a
    /// record that omits `D` still plays for a nonzero time.
    pub fn begin_receive(&mut self) {
        self.receiving = true;
        self.duration_secs = 1;
        info!("schedule: record start");
    }

    /// Close the bracket and arm the countdown.  Ignored when no bracket
    /// is open.  Returns true if the schedule armed.
    pub fn end_receive(&mut self) -> bool {
        if !self.receiving {
            return false;
        }
        self.receiving = false;
        self.armed = true;
        info!(
            "schedule: armed (wait {}s, duration {}s, speed {}, snack every {})",
            self.wait_time_secs, self.duration_secs, self.speed_level, self.snack_interval
        );
        true
    }

    // Field setters — silently discarded outside a bracket, so a frame
    // that arrives out of order cannot corrupt an armed schedule.

    pub fn set_wait_time(&mut self, secs: i32) {
        if self.receiving {
            self.wait_time_secs = secs;
        }
    }

    pub fn set_duration(&mut self, secs: i32) {
        if self.receiving {
            self.duration_secs = secs;
        }
    }

    /// Speed level is clamped into the supported 0-2 range.
    pub fn set_speed(&mut self, level: u8) {
        if self.receiving {
            self.speed_level = level.min(2);
        }
    }

    pub fn set_snack_interval(&mut self, every_n: u8) {
        if self.receiving {
            self.snack_interval = every_n;
        }
    }

    /// 1-second housekeeping: decrement an armed countdown and latch the
    /// due flag when it expires.  The countdown stops until a new record
    /// is armed.
    pub fn second_tick(&mut self) {
        if !self.armed {
            return;
        }
        self.wait_time_secs -= 1;
        if self.wait_time_secs <= 0 {
            self.wait_time_secs = 0;
            self.armed = false;
            self.due = true;
            info!("schedule: countdown expired, play is due");
        }
    }

    /// Consume the due flag.  True at most once per armed schedule.
    pub fn take_due(&mut self) -> bool {
        core::mem::take(&mut self.due)
    }

    pub fn is_receiving(&self) -> bool {
        self.receiving
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn wait_time_secs(&self) -> i32 {
        self.wait_time_secs
    }

    pub fn duration_secs(&self) -> i32 {
        self.duration_secs
    }

    pub fn speed_level(&self) -> u8 {
        self.speed_level
    }

    pub fn snack_interval(&self) -> u8 {
        self.snack_interval
    }
}

// ───────────────────────────────────────────────────────────────
// Pattern queue
// ───────────────────────────────────────────────────────────────

/// FIFO of pattern codes for the next play session.
pub struct PatternQueue {
    q: heapless::Deque<u8, PATTERN_QUEUE_CAP>,
}

impl PatternQueue {
    pub fn new() -> Self {
        Self {
            q: heapless::Deque::new(),
        }
    }

    pub fn enqueue(&mut self, code: u8) -> Result<(), Error> {
        self.q
            .push_back(code)
            .map_err(|_| Error::Capacity("pattern queue full"))
    }

    pub fn dequeue(&mut self) -> Option<u8> {
        self.q.pop_front()
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    pub fn clear(&mut self) {
        self.q.clear();
    }
}
